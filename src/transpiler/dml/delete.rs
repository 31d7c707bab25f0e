//! DELETE SQL generation.

use super::{
    Clause, OutputSource, ensure_clauses, render_output, render_returning, render_table,
    render_where,
};
use crate::ast::Query;
use crate::error::RenderResult;
use crate::transpiler::RenderContext;

/// Generate DELETE SQL.
pub fn build_delete(query: &Query, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    ensure_clauses(query, &[Clause::Where, Clause::Returning])?;

    let mut sql = format!("DELETE FROM {}", render_table(&query.table, ctx));
    sql.push_str(&render_output(query, OutputSource::Deleted, ctx)?);
    sql.push_str(&render_where(query, ctx)?);
    sql.push_str(&render_returning(query, ctx)?);
    Ok(sql)
}
