use serde::{Deserialize, Serialize};

/// The statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
    /// `SELECT COUNT(*)` over the table, joins and filter.
    Count,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Select => write!(f, "SELECT"),
            Operation::Insert => write!(f, "INSERT"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
            Operation::Count => write!(f, "COUNT"),
        }
    }
}

/// Logical operator between conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOp {
    #[default]
    And,
    Or,
}

impl LogicalOp {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// Sort order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Placement of NULLs in an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullsOrder {
    First,
    Last,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Equal (=)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    Like,
    NotLike,
    /// Case-insensitive LIKE. Emulated with LOWER() outside PostgreSQL.
    ILike,
    NotILike,
    /// Membership in an array parameter or a subquery.
    In,
    NotIn,
    IsNull,
    IsNotNull,
    /// Subquery only.
    Exists,
    NotExists,
}

impl Operator {
    /// Returns the SQL symbol/keyword for this operator.
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::ILike => "ILIKE",
            Operator::NotILike => "NOT ILIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Exists => "EXISTS",
            Operator::NotExists => "NOT EXISTS",
        }
    }

    /// `=`, `!=`, `<`, `<=`, `>`, `>=`.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::Ne
                | Operator::Gt
                | Operator::Gte
                | Operator::Lt
                | Operator::Lte
        )
    }

    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            Operator::Like | Operator::NotLike | Operator::ILike | Operator::NotILike
        )
    }

    /// Operators that take no right-hand operand.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    pub fn is_existence(&self) -> bool {
        matches!(self, Operator::Exists | Operator::NotExists)
    }

    /// Operators that compare a left side against one parameter.
    pub fn takes_param(&self) -> bool {
        self.is_comparison() || self.is_pattern() || self.is_membership()
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_symbol())
    }
}

/// Join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
            JoinKind::Full => "FULL",
            JoinKind::Cross => "CROSS",
        }
    }

    /// Every kind but CROSS needs an ON condition.
    pub fn requires_condition(&self) -> bool {
        !matches!(self, JoinKind::Cross)
    }
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_keyword())
    }
}

/// Set operation between queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperation {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

impl std::fmt::Display for SetOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetOperation::Union => write!(f, "UNION"),
            SetOperation::UnionAll => write!(f, "UNION ALL"),
            SetOperation::Intersect => write!(f, "INTERSECT"),
            SetOperation::IntersectAll => write!(f, "INTERSECT ALL"),
            SetOperation::Except => write!(f, "EXCEPT"),
            SetOperation::ExceptAll => write!(f, "EXCEPT ALL"),
        }
    }
}

/// Row lock strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStrength {
    Update,
    Share,
}

/// What a locking read does when a row is already locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LockWait {
    #[default]
    Wait,
    NoWait,
    SkipLocked,
}

/// Row-level lock requested by a SELECT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMode {
    pub strength: LockStrength,
    #[serde(default)]
    pub wait: LockWait,
}

impl LockMode {
    pub fn for_update() -> Self {
        Self {
            strength: LockStrength::Update,
            wait: LockWait::Wait,
        }
    }

    pub fn for_share() -> Self {
        Self {
            strength: LockStrength::Share,
            wait: LockWait::Wait,
        }
    }

    pub fn nowait(mut self) -> Self {
        self.wait = LockWait::NoWait;
        self
    }

    pub fn skip_locked(mut self) -> Self {
        self.wait = LockWait::SkipLocked;
        self
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    Sum,
    Avg,
    Min,
    Max,
    /// `COUNT(field)`, or `COUNT(*)` without a field.
    Count,
    CountDistinct,
}

impl AggregateKind {
    pub fn sql_name(&self) -> &'static str {
        match self {
            AggregateKind::Sum => "SUM",
            AggregateKind::Avg => "AVG",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
            AggregateKind::Count | AggregateKind::CountDistinct => "COUNT",
        }
    }
}

impl std::fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateKind::CountDistinct => write!(f, "COUNT(DISTINCT)"),
            other => write!(f, "{}", other.sql_name()),
        }
    }
}

/// Scalar math functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathFunc {
    /// Optional precision argument.
    Round,
    Floor,
    Ceil,
    Abs,
    /// Required exponent argument.
    Power,
    Sqrt,
}

impl std::fmt::Display for MathFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathFunc::Round => write!(f, "ROUND"),
            MathFunc::Floor => write!(f, "FLOOR"),
            MathFunc::Ceil => write!(f, "CEIL"),
            MathFunc::Abs => write!(f, "ABS"),
            MathFunc::Power => write!(f, "POWER"),
            MathFunc::Sqrt => write!(f, "SQRT"),
        }
    }
}

/// Target types for CAST. Each dialect maps these to its own type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastType {
    Text,
    Integer,
    BigInt,
    Numeric,
    Double,
    Boolean,
    Date,
    Timestamp,
    Json,
    Uuid,
}

impl std::fmt::Display for CastType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CastType::Text => "text",
            CastType::Integer => "integer",
            CastType::BigInt => "bigint",
            CastType::Numeric => "numeric",
            CastType::Double => "double",
            CastType::Boolean => "boolean",
            CastType::Date => "date",
            CastType::Timestamp => "timestamp",
            CastType::Json => "json",
            CastType::Uuid => "uuid",
        };
        write!(f, "{}", name)
    }
}

/// Binary operators between a field and a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// String concatenation.
    Concat,
    /// pgvector `<->`
    L2Distance,
    /// pgvector `<=>`
    CosineDistance,
    /// pgvector `<#>`
    InnerProduct,
}

impl BinaryOp {
    pub fn is_vector(&self) -> bool {
        matches!(
            self,
            BinaryOp::L2Distance | BinaryOp::CosineDistance | BinaryOp::InnerProduct
        )
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Sub => write!(f, "-"),
            BinaryOp::Mul => write!(f, "*"),
            BinaryOp::Div => write!(f, "/"),
            BinaryOp::Mod => write!(f, "%"),
            BinaryOp::Concat => write!(f, "||"),
            BinaryOp::L2Distance => write!(f, "<->"),
            BinaryOp::CosineDistance => write!(f, "<=>"),
            BinaryOp::InnerProduct => write!(f, "<#>"),
        }
    }
}

/// Window functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFunc {
    RowNumber,
    Rank,
    DenseRank,
    /// Needs a bucket-count parameter.
    Ntile,
    Lag,
    Lead,
    FirstValue,
    LastValue,
    /// An aggregate evaluated over the window.
    Aggregate(AggregateKind),
}

impl std::fmt::Display for WindowFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowFunc::RowNumber => write!(f, "ROW_NUMBER"),
            WindowFunc::Rank => write!(f, "RANK"),
            WindowFunc::DenseRank => write!(f, "DENSE_RANK"),
            WindowFunc::Ntile => write!(f, "NTILE"),
            WindowFunc::Lag => write!(f, "LAG"),
            WindowFunc::Lead => write!(f, "LEAD"),
            WindowFunc::FirstValue => write!(f, "FIRST_VALUE"),
            WindowFunc::LastValue => write!(f, "LAST_VALUE"),
            WindowFunc::Aggregate(kind) => write!(f, "{}", kind),
        }
    }
}
