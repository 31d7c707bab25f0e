//! COUNT(*) SQL generation.

use super::{Clause, ensure_clauses, render_joins, render_table, render_where};
use crate::ast::Query;
use crate::error::RenderResult;
use crate::transpiler::RenderContext;

/// `SELECT COUNT(*) FROM t [joins] [WHERE …]`
pub fn build_count(query: &Query, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    ensure_clauses(query, &[Clause::TableAlias, Clause::Join, Clause::Where])?;

    let mut sql = format!("SELECT COUNT(*) FROM {}", render_table(&query.table, ctx));
    sql.push_str(&render_joins(&query.joins, ctx)?);
    sql.push_str(&render_where(query, ctx)?);
    Ok(sql)
}
