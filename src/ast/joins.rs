use crate::ast::{Condition, JoinKind, Table};
use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};

/// A join definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Table,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<Condition>,
}

impl Join {
    /// CROSS joins take no ON condition; every other kind requires one.
    pub fn new(kind: JoinKind, table: Table, on: Option<Condition>) -> BuildResult<Self> {
        match (kind.requires_condition(), on.is_some()) {
            (true, false) => Err(BuildError::MissingJoinCondition { kind }),
            (false, true) => Err(BuildError::UnexpectedJoinCondition),
            _ => Ok(Self { kind, table, on }),
        }
    }

    pub fn inner(table: Table, on: Condition) -> Self {
        Self {
            kind: JoinKind::Inner,
            table,
            on: Some(on),
        }
    }

    pub fn left(table: Table, on: Condition) -> Self {
        Self {
            kind: JoinKind::Left,
            table,
            on: Some(on),
        }
    }

    pub fn right(table: Table, on: Condition) -> Self {
        Self {
            kind: JoinKind::Right,
            table,
            on: Some(on),
        }
    }

    pub fn full(table: Table, on: Condition) -> Self {
        Self {
            kind: JoinKind::Full,
            table,
            on: Some(on),
        }
    }

    pub fn cross(table: Table) -> Self {
        Self {
            kind: JoinKind::Cross,
            table,
            on: None,
        }
    }

    /// Whether the ON clause agrees with the join kind.
    pub fn is_well_formed(&self) -> bool {
        self.kind.requires_condition() == self.on.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Field, Operator};
    use crate::registry::ModelRegistry;

    #[test]
    fn test_join_condition_rules() {
        let mut r = ModelRegistry::new();
        r.register_table("orders", &["id", "user_id"]);
        let orders = Table::must(&r, "orders");
        let on = Condition::compare_fields(
            Field::must(&r, "user_id"),
            Operator::Eq,
            Field::must(&r, "id"),
        )
        .unwrap();

        assert!(matches!(
            Join::new(JoinKind::Left, orders.clone(), None),
            Err(BuildError::MissingJoinCondition { kind: JoinKind::Left })
        ));
        assert!(matches!(
            Join::new(JoinKind::Cross, orders.clone(), Some(on.clone())),
            Err(BuildError::UnexpectedJoinCondition)
        ));
        assert!(Join::new(JoinKind::Inner, orders.clone(), Some(on)).is_ok());
        assert!(Join::new(JoinKind::Cross, orders, None).is_ok());
    }
}
