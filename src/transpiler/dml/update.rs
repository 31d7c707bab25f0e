//! UPDATE SQL generation.

use super::{
    Clause, OutputSource, ensure_clauses, render_output, render_returning, render_table,
    render_where,
};
use crate::ast::{AssignValue, Expr, Query};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::RenderContext;
use crate::transpiler::expr::render_expr;

/// Generate UPDATE SQL. Assignments are emitted sorted by column name.
pub fn build_update(query: &Query, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    ensure_clauses(query, &[Clause::Set, Clause::Where, Clause::Returning])?;
    if query.assignments.is_empty() {
        return Err(RenderError::missing("UPDATE", "at least one assignment"));
    }

    let mut assignments = query.assignments.iter().collect::<Vec<_>>();
    assignments.sort_by(|a, b| a.field.name().cmp(b.field.name()));
    if let Some(pair) = assignments
        .windows(2)
        .find(|pair| pair[0].field.name() == pair[1].field.name())
    {
        return Err(RenderError::DuplicateAssignment {
            field: pair[0].field.name().to_string(),
        });
    }

    let mut sets = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        if !assignment.field.is_plain() {
            return Err(RenderError::InvalidAssignment(
                "SET targets must be plain columns",
            ));
        }
        let value = match &assignment.value {
            AssignValue::Param(param) => ctx.add_param(param)?,
            AssignValue::Expr(Expr::Aggregate(_)) => {
                return Err(RenderError::InvalidAssignment(
                    "aggregates cannot be assigned",
                ));
            }
            AssignValue::Expr(Expr::Window(_)) => {
                return Err(RenderError::InvalidAssignment(
                    "window functions cannot be assigned",
                ));
            }
            AssignValue::Expr(expr) => render_expr(expr, ctx)?,
        };
        sets.push(format!("{} = {}", ctx.quote(assignment.field.name()), value));
    }

    let mut sql = format!(
        "UPDATE {} SET {}",
        render_table(&query.table, ctx),
        sets.join(", ")
    );
    sql.push_str(&render_output(query, OutputSource::Inserted, ctx)?);
    sql.push_str(&render_where(query, ctx)?);
    sql.push_str(&render_returning(query, ctx)?);
    Ok(sql)
}
