//! INSERT SQL generation.

use super::{
    Clause, OutputSource, ensure_clauses, render_output, render_returning, render_table, upsert,
};
use crate::ast::Query;
use crate::error::{RenderError, RenderResult};
use crate::transpiler::RenderContext;

/// Generate INSERT SQL.
///
/// Columns come from the first row in sorted order; every other row must
/// carry exactly the same set.
pub fn build_insert(query: &Query, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    ensure_clauses(
        query,
        &[Clause::Values, Clause::Returning, Clause::OnConflict],
    )?;

    let Some(first) = query.rows.first() else {
        return Err(RenderError::missing("INSERT", "at least one value row"));
    };
    if first.is_empty() {
        return Err(RenderError::missing("INSERT", "at least one column"));
    }
    if let Some(row) = query.rows.iter().position(|r| !r.same_columns(first)) {
        return Err(RenderError::RowShapeMismatch { row });
    }

    let cols = first.columns().map(|c| ctx.quote(c)).collect::<Vec<_>>();
    let mut tuples = Vec::with_capacity(query.rows.len());
    for row in &query.rows {
        let values = row
            .iter()
            .map(|(_, param)| ctx.add_param(param))
            .collect::<RenderResult<Vec<_>>>()?;
        tuples.push(format!("({})", values.join(", ")));
    }

    let mut sql = format!(
        "{} {} ({})",
        upsert::insert_keyword(query, ctx)?,
        render_table(&query.table, ctx),
        cols.join(", ")
    );
    sql.push_str(&render_output(query, OutputSource::Inserted, ctx)?);
    sql.push_str(" VALUES ");
    sql.push_str(&tuples.join(", "));
    sql.push_str(&upsert::build_on_conflict(query, ctx)?);
    sql.push_str(&render_returning(query, ctx)?);
    Ok(sql)
}
