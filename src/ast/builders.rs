//! Shorthand constructors for common conditions and expressions.
//!
//! ```ignore
//! use quarry::ast::builders::*;
//!
//! let adults = gte(Field::must(&catalog, "age"), Param::must("min_age"));
//! let label = case_when(adults, Param::must("adult"))
//!     .otherwise(Param::must("minor"))
//!     .alias("label")?;
//! ```

use crate::ast::{CaseExpr, Condition, Field, Operator, Param, WhenClause};

fn compare(field: Field, op: Operator, param: Param) -> Condition {
    Condition::Simple {
        field,
        op,
        param: Some(param),
    }
}

/// `field = :param`
pub fn eq(field: Field, param: Param) -> Condition {
    compare(field, Operator::Eq, param)
}

/// `field != :param`
pub fn ne(field: Field, param: Param) -> Condition {
    compare(field, Operator::Ne, param)
}

pub fn gt(field: Field, param: Param) -> Condition {
    compare(field, Operator::Gt, param)
}

pub fn gte(field: Field, param: Param) -> Condition {
    compare(field, Operator::Gte, param)
}

pub fn lt(field: Field, param: Param) -> Condition {
    compare(field, Operator::Lt, param)
}

pub fn lte(field: Field, param: Param) -> Condition {
    compare(field, Operator::Lte, param)
}

pub fn like(field: Field, param: Param) -> Condition {
    compare(field, Operator::Like, param)
}

pub fn ilike(field: Field, param: Param) -> Condition {
    compare(field, Operator::ILike, param)
}

/// Membership in an array-valued parameter.
pub fn is_in(field: Field, param: Param) -> Condition {
    compare(field, Operator::In, param)
}

pub fn not_in(field: Field, param: Param) -> Condition {
    compare(field, Operator::NotIn, param)
}

/// Start a CASE expression.
pub fn case_when(condition: Condition, then: Param) -> CaseExpr {
    CaseExpr {
        whens: vec![WhenClause { condition, then }],
        otherwise: None,
    }
}
