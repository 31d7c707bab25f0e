use crate::ast::{
    AggregateKind, Alias, BinaryOp, CastType, Condition, Field, MathFunc, NullsOrder, Param,
    SortOrder, WindowFunc,
};
use crate::error::{BuildError, BuildResult};
use crate::validator::ValidationError;
use serde::{Deserialize, Serialize};

/// A field or a parameter. Literals are never operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Field(Field),
    Param(Param),
}

impl From<Field> for Operand {
    fn from(field: Field) -> Self {
        Operand::Field(field)
    }
}

impl From<Param> for Operand {
    fn from(param: Param) -> Self {
        Operand::Param(param)
    }
}

/// Computed expressions usable in projections, ORDER BY and conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Field(Field),
    Aggregate(AggregateExpr),
    Case(CaseExpr),
    /// At least two operands.
    Coalesce(Vec<Operand>),
    NullIf(Operand, Operand),
    Math(MathExpr),
    Cast { field: Field, to: CastType },
    Window(WindowExpr),
    /// `field op :param`
    Binary {
        field: Field,
        op: BinaryOp,
        param: Param,
    },
}

impl Expr {
    pub fn field(field: Field) -> Self {
        Expr::Field(field)
    }

    pub fn count() -> Self {
        Expr::Aggregate(AggregateExpr::new(AggregateKind::Count, None))
    }

    pub fn count_of(field: Field) -> Self {
        Expr::Aggregate(AggregateExpr::new(AggregateKind::Count, Some(field)))
    }

    pub fn count_distinct(field: Field) -> Self {
        Expr::Aggregate(AggregateExpr::new(AggregateKind::CountDistinct, Some(field)))
    }

    pub fn sum(field: Field) -> Self {
        Expr::Aggregate(AggregateExpr::new(AggregateKind::Sum, Some(field)))
    }

    pub fn avg(field: Field) -> Self {
        Expr::Aggregate(AggregateExpr::new(AggregateKind::Avg, Some(field)))
    }

    pub fn min(field: Field) -> Self {
        Expr::Aggregate(AggregateExpr::new(AggregateKind::Min, Some(field)))
    }

    pub fn max(field: Field) -> Self {
        Expr::Aggregate(AggregateExpr::new(AggregateKind::Max, Some(field)))
    }

    pub fn coalesce(operands: Vec<Operand>) -> BuildResult<Self> {
        if operands.len() < 2 {
            return Err(BuildError::missing("COALESCE", "at least two operands"));
        }
        Ok(Expr::Coalesce(operands))
    }

    pub fn nullif(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Expr::NullIf(left.into(), right.into())
    }

    pub fn cast(field: Field, to: CastType) -> Self {
        Expr::Cast { field, to }
    }

    pub fn binary(field: Field, op: BinaryOp, param: Param) -> Self {
        Expr::Binary { field, op, param }
    }

    /// Project this expression under an output alias.
    pub fn alias(self, name: &str) -> Result<FieldExpr, ValidationError> {
        Ok(FieldExpr {
            expr: self,
            alias: Some(Alias::new(name)?),
        })
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Expr::Aggregate(_))
    }
}

impl From<Field> for Expr {
    fn from(field: Field) -> Self {
        Expr::Field(field)
    }
}

/// `SUM(field)`, `COUNT(*)`, `COUNT(DISTINCT field)` with optional FILTER.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateExpr {
    pub kind: AggregateKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Box<Condition>>,
}

impl AggregateExpr {
    pub fn new(kind: AggregateKind, field: Option<Field>) -> Self {
        Self {
            kind,
            field,
            filter: None,
        }
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(Box::new(condition));
        self
    }
}

impl From<AggregateExpr> for Expr {
    fn from(agg: AggregateExpr) -> Self {
        Expr::Aggregate(agg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhenClause {
    pub condition: Condition,
    pub then: Param,
}

/// `CASE WHEN … THEN :p … [ELSE :p] END`. First matching branch wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseExpr {
    pub whens: Vec<WhenClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otherwise: Option<Param>,
}

impl CaseExpr {
    pub fn when(mut self, condition: Condition, then: Param) -> Self {
        self.whens.push(WhenClause { condition, then });
        self
    }

    pub fn otherwise(mut self, param: Param) -> Self {
        self.otherwise = Some(param);
        self
    }

    pub fn alias(self, name: &str) -> Result<FieldExpr, ValidationError> {
        Expr::Case(self).alias(name)
    }
}

impl From<CaseExpr> for Expr {
    fn from(case: CaseExpr) -> Self {
        Expr::Case(case)
    }
}

/// `FUNC(field[, :arg])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathExpr {
    pub func: MathFunc,
    pub field: Field,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<Param>,
}

impl MathExpr {
    pub fn new(func: MathFunc, field: Field) -> Self {
        Self {
            func,
            field,
            arg: None,
        }
    }

    pub fn round(field: Field, precision: Option<Param>) -> Self {
        Self {
            func: MathFunc::Round,
            field,
            arg: precision,
        }
    }

    pub fn power(field: Field, exponent: Param) -> Self {
        Self {
            func: MathFunc::Power,
            field,
            arg: Some(exponent),
        }
    }
}

impl From<MathExpr> for Expr {
    fn from(math: MathExpr) -> Self {
        Expr::Math(math)
    }
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub expr: Expr,
    #[serde(default)]
    pub direction: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullsOrder>,
}

impl OrderBy {
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortOrder::Asc,
            nulls: None,
        }
    }

    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortOrder::Desc,
            nulls: None,
        }
    }

    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

/// ROWS vs RANGE framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameUnits {
    Rows,
    Range,
}

/// Window frame bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(u64),
    CurrentRow,
    Following(u64),
    UnboundedFollowing,
}

impl FrameBound {
    /// Position on the frame axis; a frame must not end before it starts.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            FrameBound::UnboundedPreceding => 0,
            FrameBound::Preceding(_) => 1,
            FrameBound::CurrentRow => 2,
            FrameBound::Following(_) => 3,
            FrameBound::UnboundedFollowing => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub units: FrameUnits,
    pub start: FrameBound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<FrameBound>,
}

impl Frame {
    pub fn rows(start: FrameBound, end: FrameBound) -> Self {
        Self {
            units: FrameUnits::Rows,
            start,
            end: Some(end),
        }
    }

    pub fn range(start: FrameBound, end: FrameBound) -> Self {
        Self {
            units: FrameUnits::Range,
            start,
            end: Some(end),
        }
    }
}

/// `OVER (PARTITION BY … ORDER BY … frame)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowSpec {
    #[serde(default)]
    pub partition_by: Vec<Field>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<Frame>,
}

impl WindowSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by(mut self, field: Field) -> Self {
        self.partition_by.push(field);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn frame(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }
}

/// A window function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowExpr {
    pub func: WindowFunc,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    /// NTILE bucket count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<Param>,
    /// LAG/LEAD offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Param>,
    /// LAG/LEAD default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Param>,
    #[serde(default)]
    pub over: WindowSpec,
}

impl WindowExpr {
    pub fn new(func: WindowFunc, over: WindowSpec) -> Self {
        Self {
            func,
            field: None,
            bucket: None,
            offset: None,
            default: None,
            over,
        }
    }

    pub fn row_number(over: WindowSpec) -> Self {
        Self::new(WindowFunc::RowNumber, over)
    }

    pub fn rank(over: WindowSpec) -> Self {
        Self::new(WindowFunc::Rank, over)
    }

    pub fn dense_rank(over: WindowSpec) -> Self {
        Self::new(WindowFunc::DenseRank, over)
    }

    pub fn ntile(bucket: Param, over: WindowSpec) -> Self {
        Self {
            bucket: Some(bucket),
            ..Self::new(WindowFunc::Ntile, over)
        }
    }

    pub fn lag(field: Field, over: WindowSpec) -> Self {
        Self {
            field: Some(field),
            ..Self::new(WindowFunc::Lag, over)
        }
    }

    pub fn lead(field: Field, over: WindowSpec) -> Self {
        Self {
            field: Some(field),
            ..Self::new(WindowFunc::Lead, over)
        }
    }

    pub fn aggregate(kind: AggregateKind, field: Option<Field>, over: WindowSpec) -> Self {
        Self {
            field,
            ..Self::new(WindowFunc::Aggregate(kind), over)
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_offset(mut self, offset: Param) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_default(mut self, default: Param) -> Self {
        self.default = Some(default);
        self
    }
}

impl From<WindowExpr> for Expr {
    fn from(window: WindowExpr) -> Self {
        Expr::Window(window)
    }
}

/// A projected expression with optional output alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldExpr {
    pub expr: Expr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<Alias>,
}

impl FieldExpr {
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            alias: None,
        }
    }

    pub fn aliased(expr: impl Into<Expr>, alias: Alias) -> Self {
        Self {
            expr: expr.into(),
            alias: Some(alias),
        }
    }
}

impl From<Field> for FieldExpr {
    fn from(field: Field) -> Self {
        FieldExpr::new(field)
    }
}

impl From<Expr> for FieldExpr {
    fn from(expr: Expr) -> Self {
        FieldExpr::new(expr)
    }
}
