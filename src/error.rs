//! Error types for quarry.
//!
//! Construction problems surface as [`BuildError`], rendering problems as
//! [`RenderError`]. Identifier gate failures are [`ValidationError`]s and live
//! in [`crate::validator`].

use crate::ast::{JoinKind, Operation, Operator};
use crate::transpiler::Dialect;
use crate::validator::ValidationError;
use thiserror::Error;

/// Errors raised while assembling AST nodes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// INNER/LEFT/RIGHT/FULL joins need an ON condition.
    #[error("{kind} JOIN requires an ON condition")]
    MissingJoinCondition { kind: JoinKind },

    /// CROSS joins must not carry one.
    #[error("CROSS JOIN cannot have an ON condition")]
    UnexpectedJoinCondition,

    #[error("Field '{field}' is assigned more than once")]
    DuplicateAssignment { field: String },

    #[error("Operator {op} cannot be used in {construct}")]
    InvalidOperator {
        op: Operator,
        construct: &'static str,
    },

    #[error("{construct} requires {operand}")]
    MissingOperand {
        construct: &'static str,
        operand: &'static str,
    },

    #[error("{construct} does not accept {operand}")]
    UnexpectedOperand {
        construct: &'static str,
        operand: &'static str,
    },

    /// Insert/update columns must be plain, unqualified fields.
    #[error("Field '{field}' cannot be written: {reason}")]
    InvalidColumn { field: String, reason: &'static str },
}

impl BuildError {
    /// Create a missing operand error.
    pub fn missing(construct: &'static str, operand: &'static str) -> Self {
        Self::MissingOperand { construct, operand }
    }

    /// Create an unexpected operand error.
    pub fn unexpected(construct: &'static str, operand: &'static str) -> Self {
        Self::UnexpectedOperand { construct, operand }
    }
}

/// Errors raised while rendering an AST into SQL text.
///
/// A render either yields the complete statement or one of these; there is no
/// partial output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Subquery depth {depth} exceeds the maximum of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("{construct} requires {operand}")]
    MissingOperand {
        construct: &'static str,
        operand: &'static str,
    },

    #[error("{construct} does not accept {operand}")]
    UnexpectedOperand {
        construct: &'static str,
        operand: &'static str,
    },

    /// The target dialect cannot express the construct.
    #[error("{feature} is not supported by {dialect}")]
    Unsupported { dialect: Dialect, feature: String },

    #[error("{clause} is not allowed in a {operation} statement")]
    ClauseNotAllowed {
        operation: Operation,
        clause: &'static str,
    },

    #[error("Operator {op} cannot be used in {construct}")]
    InvalidOperator {
        op: Operator,
        construct: &'static str,
    },

    #[error("HAVING requires GROUP BY")]
    HavingWithoutGroupBy,

    #[error("DISTINCT and DISTINCT ON cannot be combined")]
    ConflictingDistinct,

    #[error("INSERT row {row} does not have the same fields as the first row")]
    RowShapeMismatch { row: usize },

    #[error("Field '{field}' is assigned more than once")]
    DuplicateAssignment { field: String },

    #[error("Aggregate conditions are only allowed in HAVING")]
    AggregateOutsideHaving,

    #[error("{0} cannot be used as an assignment value")]
    InvalidAssignment(&'static str),

    #[error("Invalid window frame: {0}")]
    InvalidFrame(&'static str),

    #[error("Condition group is empty")]
    EmptyConditionGroup,

    #[error("{kind} JOIN on '{table}' has an invalid ON clause")]
    InvalidJoin { kind: JoinKind, table: String },

    #[error("Subquery must be a SELECT or COUNT, found {0}")]
    InvalidSubquery(Operation),

    #[error("Compound operand {index} is invalid: {reason}")]
    InvalidCompoundOperand { index: usize, reason: &'static str },
}

impl RenderError {
    /// Create a capability error for `dialect`.
    pub fn unsupported(dialect: Dialect, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }

    /// Create a missing operand error.
    pub fn missing(construct: &'static str, operand: &'static str) -> Self {
        Self::MissingOperand { construct, operand }
    }

    /// Create an unexpected operand error.
    pub fn unexpected(construct: &'static str, operand: &'static str) -> Self {
        Self::UnexpectedOperand { construct, operand }
    }

    /// Create a clause error for `operation`.
    pub fn clause(operation: Operation, clause: &'static str) -> Self {
        Self::ClauseNotAllowed { operation, clause }
    }
}

/// Result type alias for AST construction.
pub type BuildResult<T> = Result<T, BuildError>;

/// Result type alias for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::unsupported(Dialect::MySQL, "DISTINCT ON");
        assert_eq!(err.to_string(), "DISTINCT ON is not supported by MySQL");

        let err = RenderError::DepthExceeded { depth: 4, max: 3 };
        assert_eq!(
            err.to_string(),
            "Subquery depth 4 exceeds the maximum of 3"
        );
    }

    #[test]
    fn test_build_error_display() {
        let err = BuildError::MissingJoinCondition {
            kind: JoinKind::Left,
        };
        assert_eq!(err.to_string(), "LEFT JOIN requires an ON condition");

        let err = BuildError::missing("COALESCE", "at least two operands");
        assert_eq!(err.to_string(), "COALESCE requires at least two operands");
    }
}
