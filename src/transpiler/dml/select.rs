//! SELECT SQL generation.

use super::{Clause, ensure_clauses, render_joins, render_table, render_where};
use crate::ast::Query;
use crate::error::{RenderError, RenderResult};
use crate::transpiler::conditions::{ConditionScope, render_condition};
use crate::transpiler::expr::{render_field_expr, render_field_list, render_order_by};
use crate::transpiler::{LockClause, RenderContext};

/// Generate SELECT SQL.
pub fn build_select(query: &Query, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    ensure_clauses(
        query,
        &[
            Clause::TableAlias,
            Clause::Distinct,
            Clause::DistinctOn,
            Clause::Projection,
            Clause::Join,
            Clause::Where,
            Clause::GroupBy,
            Clause::Having,
            Clause::OrderBy,
            Clause::Limit,
            Clause::Offset,
            Clause::Lock,
        ],
    )?;
    if query.distinct && !query.distinct_on.is_empty() {
        return Err(RenderError::ConflictingDistinct);
    }
    if query.having.is_some() && query.group_by.is_empty() {
        return Err(RenderError::HavingWithoutGroupBy);
    }

    let mut sql = String::from("SELECT ");
    if query.distinct {
        sql.push_str("DISTINCT ");
    } else if !query.distinct_on.is_empty() {
        if !ctx.generator().supports_distinct_on() {
            return Err(RenderError::unsupported(ctx.dialect(), "DISTINCT ON"));
        }
        sql.push_str(&format!(
            "DISTINCT ON ({}) ",
            render_field_list(&query.distinct_on, ctx)?
        ));
    }

    // Columns
    if query.fields.is_empty() {
        sql.push('*');
    } else {
        let cols = query
            .fields
            .iter()
            .map(|item| render_field_expr(item, ctx))
            .collect::<RenderResult<Vec<_>>>()?;
        sql.push_str(&cols.join(", "));
    }

    let lock = query
        .lock
        .map(|mode| ctx.generator().lock_clause(mode))
        .transpose()?;

    // FROM
    sql.push_str(" FROM ");
    sql.push_str(&render_table(&query.table, ctx));
    if let Some(LockClause::TableHint(hint)) = &lock {
        sql.push(' ');
        sql.push_str(hint);
    }

    sql.push_str(&render_joins(&query.joins, ctx)?);
    sql.push_str(&render_where(query, ctx)?);

    if !query.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&render_field_list(&query.group_by, ctx)?);
    }
    if let Some(having) = &query.having {
        sql.push_str(" HAVING ");
        sql.push_str(&render_condition(having, ctx, ConditionScope::Having)?);
    }
    if !query.order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&render_order_by(&query.order_by, ctx)?);
    }
    sql.push_str(&ctx.generator().limit_offset(
        query.limit,
        query.offset,
        !query.order_by.is_empty(),
    ));

    if let Some(LockClause::Suffix(suffix)) = &lock {
        sql.push_str(suffix);
    }
    Ok(sql)
}
