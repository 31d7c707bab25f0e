//! Typed query representation.
//!
//! Every identifier that can reach SQL text enters through a validated
//! constructor in [`ident`]. Values never appear in the tree: the only value
//! carrier is a named [`Param`].

pub mod builders;
pub mod compound;
pub mod conditions;
pub mod expr;
pub mod ident;
pub mod joins;
pub mod operators;
pub mod query;

pub use self::compound::{CompoundPart, CompoundQuery};
pub use self::conditions::Condition;
pub use self::expr::{
    AggregateExpr, CaseExpr, Expr, FieldExpr, Frame, FrameBound, FrameUnits, MathExpr, Operand,
    OrderBy, WhenClause, WindowExpr, WindowSpec,
};
pub use self::ident::{
    Alias, Field, JsonKey, JsonPath, JsonSegment, Param, Qualifier, Table, TableAlias,
};
pub use self::joins::Join;
pub use self::operators::{
    AggregateKind, BinaryOp, CastType, JoinKind, LockMode, LockStrength, LockWait, LogicalOp,
    MathFunc, NullsOrder, Operation, Operator, SetOperation, SortOrder, WindowFunc,
};
pub use self::query::{AssignValue, Assignment, ConflictAction, ConflictValue, OnConflict, Query, Row};

use serde::{Deserialize, Serialize};

/// A renderable document: a single query or a set-operation chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Query(Query),
    Compound(CompoundQuery),
}

impl From<Query> for Statement {
    fn from(query: Query) -> Self {
        Statement::Query(query)
    }
}

impl From<CompoundQuery> for Statement {
    fn from(compound: CompoundQuery) -> Self {
        Statement::Compound(compound)
    }
}
