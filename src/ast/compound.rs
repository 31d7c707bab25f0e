use crate::ast::{OrderBy, Query, SetOperation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundPart {
    pub op: SetOperation,
    pub query: Query,
}

/// `base UNION q1 INTERSECT q2 … [ORDER BY] [LIMIT] [OFFSET]`.
///
/// Operands are plain SELECTs; ordering and pagination belong to the
/// compound as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundQuery {
    pub base: Query,
    #[serde(default)]
    pub parts: Vec<CompoundPart>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
}

impl CompoundQuery {
    pub fn new(base: Query) -> Self {
        Self {
            base,
            parts: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn push(mut self, op: SetOperation, query: Query) -> Self {
        self.parts.push(CompoundPart { op, query });
        self
    }

    pub fn union(self, query: Query) -> Self {
        self.push(SetOperation::Union, query)
    }

    pub fn union_all(self, query: Query) -> Self {
        self.push(SetOperation::UnionAll, query)
    }

    pub fn intersect(self, query: Query) -> Self {
        self.push(SetOperation::Intersect, query)
    }

    pub fn except(self, query: Query) -> Self {
        self.push(SetOperation::Except, query)
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

    /// All operand queries in order, base first.
    pub fn operands(&self) -> impl Iterator<Item = &Query> {
        std::iter::once(&self.base).chain(self.parts.iter().map(|p| &p.query))
    }
}
