use crate::ast::{
    Condition, Expr, Field, FieldExpr, Join, LockMode, Operation, OrderBy, Param, Table,
};
use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One INSERT row: column name to parameter, kept in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    values: BTreeMap<String, Param>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column. Columns must be plain fields and appear once.
    pub fn value(mut self, field: Field, param: Param) -> BuildResult<Self> {
        if !field.is_plain() {
            return Err(BuildError::InvalidColumn {
                field: field.name().to_string(),
                reason: "insert columns cannot be qualified or JSON paths",
            });
        }
        if self.values.contains_key(field.name()) {
            return Err(BuildError::DuplicateAssignment {
                field: field.name().to_string(),
            });
        }
        self.values.insert(field.name().to_string(), param);
        Ok(self)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn same_columns(&self, other: &Row) -> bool {
        self.values.len() == other.values.len()
            && self.values.keys().zip(other.values.keys()).all(|(a, b)| a == b)
    }
}

/// Right-hand side of an UPDATE assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignValue {
    Param(Param),
    /// e.g. `"stock" = "stock" - :qty`
    Expr(Expr),
}

impl From<Param> for AssignValue {
    fn from(param: Param) -> Self {
        AssignValue::Param(param)
    }
}

impl From<Expr> for AssignValue {
    fn from(expr: Expr) -> Self {
        AssignValue::Expr(expr)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub field: Field,
    pub value: AssignValue,
}

/// Value written by `ON CONFLICT … DO UPDATE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictValue {
    Param(Param),
    /// The value the rejected row would have inserted for this column.
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAction {
    DoNothing,
    DoUpdate(BTreeMap<String, ConflictValue>),
}

/// Upsert behaviour for INSERT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnConflict {
    #[serde(default)]
    pub target: Vec<Field>,
    pub action: ConflictAction,
}

impl OnConflict {
    pub fn do_nothing(target: Vec<Field>) -> Self {
        Self {
            target,
            action: ConflictAction::DoNothing,
        }
    }

    pub fn do_update(target: Vec<Field>) -> Self {
        Self {
            target,
            action: ConflictAction::DoUpdate(BTreeMap::new()),
        }
    }

    /// Add a column to the DO UPDATE set. Turns DO NOTHING into DO UPDATE.
    pub fn set(mut self, field: Field, value: ConflictValue) -> BuildResult<Self> {
        if !field.is_plain() {
            return Err(BuildError::InvalidColumn {
                field: field.name().to_string(),
                reason: "conflict updates cannot be qualified or JSON paths",
            });
        }
        let mut updates = match self.action {
            ConflictAction::DoUpdate(updates) => updates,
            ConflictAction::DoNothing => BTreeMap::new(),
        };
        if updates.contains_key(field.name()) {
            return Err(BuildError::DuplicateAssignment {
                field: field.name().to_string(),
            });
        }
        updates.insert(field.name().to_string(), value);
        self.action = ConflictAction::DoUpdate(updates);
        Ok(self)
    }
}

/// A single statement.
///
/// Fields are public like any plain data node; the consuming builder methods
/// below enforce the construction-time rules (join ON, duplicate writes).
/// Whatever slips past them is rejected again at render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub operation: Operation,
    pub table: Table,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub distinct_on: Vec<Field>,
    #[serde(default)]
    pub fields: Vec<FieldExpr>,
    #[serde(default)]
    pub joins: Vec<Join>,
    #[serde(default)]
    pub filter: Option<Condition>,
    #[serde(default)]
    pub group_by: Vec<Field>,
    #[serde(default)]
    pub having: Option<Condition>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub lock: Option<LockMode>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub returning: Vec<Field>,
    #[serde(default)]
    pub on_conflict: Option<OnConflict>,
}

impl Query {
    pub fn new(operation: Operation, table: Table) -> Self {
        Self {
            operation,
            table,
            distinct: false,
            distinct_on: Vec::new(),
            fields: Vec::new(),
            joins: Vec::new(),
            filter: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            lock: None,
            rows: Vec::new(),
            assignments: Vec::new(),
            returning: Vec::new(),
            on_conflict: None,
        }
    }

    pub fn select(table: Table) -> Self {
        Self::new(Operation::Select, table)
    }

    pub fn insert(table: Table) -> Self {
        Self::new(Operation::Insert, table)
    }

    pub fn update(table: Table) -> Self {
        Self::new(Operation::Update, table)
    }

    pub fn delete(table: Table) -> Self {
        Self::new(Operation::Delete, table)
    }

    pub fn count(table: Table) -> Self {
        Self::new(Operation::Count, table)
    }

    /// Add a projected column or expression.
    pub fn field(mut self, field: impl Into<FieldExpr>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn fields<I, F>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldExpr>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn distinct_on(mut self, fields: Vec<Field>) -> Self {
        self.distinct_on = fields;
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Add a WHERE condition, AND-ed with any existing one.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and_also(condition),
            None => condition,
        });
        self
    }

    pub fn group_by(mut self, fields: Vec<Field>) -> Self {
        self.group_by = fields;
        self
    }

    /// Add a HAVING condition, AND-ed with any existing one.
    pub fn having(mut self, condition: Condition) -> Self {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and_also(condition),
            None => condition,
        });
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn lock(mut self, mode: LockMode) -> Self {
        self.lock = Some(mode);
        self
    }

    pub fn row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Add an UPDATE assignment. Each field may be assigned once.
    pub fn set(mut self, field: Field, value: impl Into<AssignValue>) -> BuildResult<Self> {
        if !field.is_plain() {
            return Err(BuildError::InvalidColumn {
                field: field.name().to_string(),
                reason: "assignment targets cannot be qualified or JSON paths",
            });
        }
        if self.assignments.iter().any(|a| a.field.name() == field.name()) {
            return Err(BuildError::DuplicateAssignment {
                field: field.name().to_string(),
            });
        }
        self.assignments.push(Assignment {
            field,
            value: value.into(),
        });
        Ok(self)
    }

    pub fn returning(mut self, fields: Vec<Field>) -> Self {
        self.returning = fields;
        self
    }

    pub fn on_conflict(mut self, on_conflict: OnConflict) -> Self {
        self.on_conflict = Some(on_conflict);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;

    fn registry() -> ModelRegistry {
        let mut r = ModelRegistry::new();
        r.register_table("users", &["id", "email", "name"]);
        r
    }

    #[test]
    fn test_row_rejects_duplicate_column() {
        let r = registry();
        let row = Row::new()
            .value(Field::must(&r, "email"), Param::must("email"))
            .unwrap();
        let err = row.value(Field::must(&r, "email"), Param::must("email2"));
        assert!(matches!(err, Err(BuildError::DuplicateAssignment { .. })));
    }

    #[test]
    fn test_row_columns_sorted() {
        let r = registry();
        let row = Row::new()
            .value(Field::must(&r, "name"), Param::must("name"))
            .unwrap()
            .value(Field::must(&r, "email"), Param::must("email"))
            .unwrap();
        assert_eq!(row.columns().collect::<Vec<_>>(), vec!["email", "name"]);
    }

    #[test]
    fn test_set_rejects_duplicate_field() {
        let r = registry();
        let err = Query::update(Table::must(&r, "users"))
            .set(Field::must(&r, "name"), Param::must("a"))
            .unwrap()
            .set(Field::must(&r, "name"), Param::must("b"));
        assert_eq!(
            err.unwrap_err(),
            BuildError::DuplicateAssignment {
                field: "name".to_string()
            }
        );
    }

    #[test]
    fn test_filter_accumulates_with_and() {
        let r = registry();
        let q = Query::select(Table::must(&r, "users"))
            .filter(Condition::is_null(Field::must(&r, "email")))
            .filter(Condition::is_not_null(Field::must(&r, "name")));
        assert!(matches!(q.filter, Some(Condition::Group { ref items, .. }) if items.len() == 2));
    }
}
