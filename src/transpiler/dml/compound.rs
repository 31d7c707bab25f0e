//! Set operations: UNION / INTERSECT / EXCEPT chains.

use super::select::build_select;
use crate::ast::{CompoundQuery, Operation, Query};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::RenderContext;
use crate::transpiler::expr::render_order_by;

/// `q0 UNION q1 EXCEPT q2 … [ORDER BY] [LIMIT] [OFFSET]`
///
/// Operands share the caller's depth and parameter namespace.
pub fn build_compound(compound: &CompoundQuery, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    if compound.parts.is_empty() {
        return Err(RenderError::missing("compound query", "a second operand"));
    }

    for (index, query) in compound.operands().enumerate() {
        check_operand(index, query)?;
    }

    let mut sql = build_select(&compound.base, ctx)?;
    for part in &compound.parts {
        if !ctx.generator().supports_set_operation(part.op) {
            return Err(RenderError::unsupported(ctx.dialect(), part.op.to_string()));
        }
        sql.push_str(&format!(" {} ", part.op));
        sql.push_str(&build_select(&part.query, ctx)?);
    }

    if !compound.order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&render_order_by(&compound.order_by, ctx)?);
    }
    sql.push_str(&ctx.generator().limit_offset(
        compound.limit,
        compound.offset,
        !compound.order_by.is_empty(),
    ));
    Ok(sql)
}

fn check_operand(index: usize, query: &Query) -> RenderResult<()> {
    let reason = if query.operation != Operation::Select {
        "operands must be SELECT queries"
    } else if !query.order_by.is_empty() {
        "ORDER BY belongs to the compound query"
    } else if query.limit.is_some() || query.offset.is_some() {
        "LIMIT/OFFSET belong to the compound query"
    } else if query.lock.is_some() {
        "operands cannot lock rows"
    } else {
        return Ok(());
    };
    Err(RenderError::InvalidCompoundOperand { index, reason })
}
