use crate::ast::{AggregateKind, Expr, Field, LogicalOp, Operator, Param, Query};
use crate::error::{BuildError, BuildResult};
use serde::{Deserialize, Serialize};

/// A predicate tree node.
///
/// Groups own their children, subqueries own their nested query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// `field op :param`, or `field IS [NOT] NULL` without a parameter.
    Simple {
        field: Field,
        op: Operator,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        param: Option<Param>,
    },
    /// Conditions combined with AND/OR, in order.
    Group { op: LogicalOp, items: Vec<Condition> },
    /// `left op right` between two fields.
    FieldComparison {
        left: Field,
        op: Operator,
        right: Field,
    },
    /// `field IN (subquery)`, `EXISTS (subquery)`, `field = (subquery)`.
    Subquery {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<Field>,
        op: Operator,
        query: Box<Query>,
    },
    Between {
        field: Field,
        low: Param,
        high: Param,
        #[serde(default)]
        negated: bool,
    },
    /// `AGG(field) op :param`. Valid in HAVING only.
    Aggregate {
        kind: AggregateKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        field: Option<Field>,
        op: Operator,
        param: Param,
    },
    /// A computed expression compared against a parameter.
    Expression {
        expr: Box<Expr>,
        op: Operator,
        param: Param,
    },
}

impl Condition {
    /// `field op :param` for any operator that takes a parameter.
    pub fn simple(field: Field, op: Operator, param: Param) -> BuildResult<Self> {
        if !op.takes_param() {
            return Err(BuildError::InvalidOperator {
                op,
                construct: "a parameter comparison",
            });
        }
        Ok(Condition::Simple {
            field,
            op,
            param: Some(param),
        })
    }

    pub fn is_null(field: Field) -> Self {
        Condition::Simple {
            field,
            op: Operator::IsNull,
            param: None,
        }
    }

    pub fn is_not_null(field: Field) -> Self {
        Condition::Simple {
            field,
            op: Operator::IsNotNull,
            param: None,
        }
    }

    pub fn and(items: Vec<Condition>) -> Self {
        Condition::Group {
            op: LogicalOp::And,
            items,
        }
    }

    pub fn or(items: Vec<Condition>) -> Self {
        Condition::Group {
            op: LogicalOp::Or,
            items,
        }
    }

    /// `left op right` between two columns. Only plain comparisons and LIKE
    /// patterns make sense here.
    pub fn compare_fields(left: Field, op: Operator, right: Field) -> BuildResult<Self> {
        if !(op.is_comparison() || op.is_pattern()) {
            return Err(BuildError::InvalidOperator {
                op,
                construct: "a field comparison",
            });
        }
        Ok(Condition::FieldComparison { left, op, right })
    }

    /// General subquery condition. The field is required for IN/NOT IN and
    /// scalar comparisons, and forbidden for EXISTS/NOT EXISTS.
    pub fn subquery(field: Option<Field>, op: Operator, query: Query) -> BuildResult<Self> {
        if op.is_existence() {
            if field.is_some() {
                return Err(BuildError::unexpected("EXISTS subquery", "a field"));
            }
        } else if op.is_membership() || op.is_comparison() {
            if field.is_none() {
                return Err(BuildError::missing("subquery comparison", "a field"));
            }
        } else {
            return Err(BuildError::InvalidOperator {
                op,
                construct: "a subquery condition",
            });
        }
        Ok(Condition::Subquery {
            field,
            op,
            query: Box::new(query),
        })
    }

    pub fn in_subquery(field: Field, query: Query) -> Self {
        Condition::Subquery {
            field: Some(field),
            op: Operator::In,
            query: Box::new(query),
        }
    }

    pub fn not_in_subquery(field: Field, query: Query) -> Self {
        Condition::Subquery {
            field: Some(field),
            op: Operator::NotIn,
            query: Box::new(query),
        }
    }

    pub fn exists(query: Query) -> Self {
        Condition::Subquery {
            field: None,
            op: Operator::Exists,
            query: Box::new(query),
        }
    }

    pub fn not_exists(query: Query) -> Self {
        Condition::Subquery {
            field: None,
            op: Operator::NotExists,
            query: Box::new(query),
        }
    }

    pub fn between(field: Field, low: Param, high: Param) -> Self {
        Condition::Between {
            field,
            low,
            high,
            negated: false,
        }
    }

    pub fn not_between(field: Field, low: Param, high: Param) -> Self {
        Condition::Between {
            field,
            low,
            high,
            negated: true,
        }
    }

    /// `AGG(field) op :param` for HAVING. COUNT may omit the field.
    pub fn aggregate(
        kind: AggregateKind,
        field: Option<Field>,
        op: Operator,
        param: Param,
    ) -> BuildResult<Self> {
        if !op.is_comparison() {
            return Err(BuildError::InvalidOperator {
                op,
                construct: "an aggregate condition",
            });
        }
        if field.is_none() && kind != AggregateKind::Count {
            return Err(BuildError::missing("aggregate condition", "a field"));
        }
        Ok(Condition::Aggregate {
            kind,
            field,
            op,
            param,
        })
    }

    /// `expr op :param`.
    pub fn expression(expr: Expr, op: Operator, param: Param) -> BuildResult<Self> {
        if !(op.is_comparison() || op.is_pattern()) {
            return Err(BuildError::InvalidOperator {
                op,
                construct: "an expression condition",
            });
        }
        Ok(Condition::Expression {
            expr: Box::new(expr),
            op,
            param,
        })
    }

    /// Combine with another condition using AND, flattening AND groups.
    pub fn and_also(self, other: Condition) -> Self {
        match self {
            Condition::Group {
                op: LogicalOp::And,
                mut items,
            } => {
                items.push(other);
                Condition::and(items)
            }
            first => Condition::and(vec![first, other]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Table;
    use crate::registry::ModelRegistry;

    fn registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry.register_table("users", &["id", "age"]);
        registry
    }

    #[test]
    fn test_simple_rejects_unary_operator() {
        let r = registry();
        let err = Condition::simple(Field::must(&r, "age"), Operator::IsNull, Param::must("a"));
        assert!(matches!(err, Err(BuildError::InvalidOperator { .. })));
    }

    #[test]
    fn test_subquery_field_rules() {
        let r = registry();
        let inner = Query::select(Table::must(&r, "users"));
        assert!(
            Condition::subquery(Some(Field::must(&r, "id")), Operator::Exists, inner.clone())
                .is_err()
        );
        assert!(Condition::subquery(None, Operator::In, inner.clone()).is_err());
        assert!(Condition::subquery(None, Operator::NotExists, inner).is_ok());
    }

    #[test]
    fn test_and_also_flattens() {
        let r = registry();
        let a = Condition::is_null(Field::must(&r, "id"));
        let b = Condition::is_not_null(Field::must(&r, "age"));
        let c = Condition::is_null(Field::must(&r, "age"));
        match a.and_also(b).and_also(c) {
            Condition::Group { op, items } => {
                assert_eq!(op, LogicalOp::And);
                assert_eq!(items.len(), 3);
            }
            other => panic!("expected group, got {:?}", other),
        }
    }
}
