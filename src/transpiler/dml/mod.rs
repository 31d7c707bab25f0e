//! DML (Data Manipulation Language) SQL generation.
//!
//! Each statement kind has its own builder; this module dispatches on
//! [`Operation`] and holds the clause helpers they share.

pub mod compound;
pub mod count;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;
pub mod upsert;

use crate::ast::{Field, Join, Operation, Query, Table};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::conditions::{ConditionScope, render_condition};
use crate::transpiler::expr::render_field;
use crate::transpiler::{RenderContext, ReturningStyle};

/// Render any single query at the context's depth.
pub fn build_query(query: &Query, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    match query.operation {
        Operation::Select => select::build_select(query, ctx),
        Operation::Count => count::build_count(query, ctx),
        Operation::Insert => insert::build_insert(query, ctx),
        Operation::Update => update::build_update(query, ctx),
        Operation::Delete => delete::build_delete(query, ctx),
    }
}

/// Clauses a query carries, named as they appear in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Clause {
    TableAlias,
    Distinct,
    DistinctOn,
    Projection,
    Join,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
    Lock,
    Values,
    Set,
    Returning,
    OnConflict,
}

impl Clause {
    fn name(self) -> &'static str {
        match self {
            Clause::TableAlias => "table alias",
            Clause::Distinct => "DISTINCT",
            Clause::DistinctOn => "DISTINCT ON",
            Clause::Projection => "projection",
            Clause::Join => "JOIN",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
            Clause::Offset => "OFFSET",
            Clause::Lock => "lock",
            Clause::Values => "VALUES",
            Clause::Set => "SET",
            Clause::Returning => "RETURNING",
            Clause::OnConflict => "ON CONFLICT",
        }
    }

    fn present(self, q: &Query) -> bool {
        match self {
            Clause::TableAlias => q.table.alias().is_some(),
            Clause::Distinct => q.distinct,
            Clause::DistinctOn => !q.distinct_on.is_empty(),
            Clause::Projection => !q.fields.is_empty(),
            Clause::Join => !q.joins.is_empty(),
            Clause::Where => q.filter.is_some(),
            Clause::GroupBy => !q.group_by.is_empty(),
            Clause::Having => q.having.is_some(),
            Clause::OrderBy => !q.order_by.is_empty(),
            Clause::Limit => q.limit.is_some(),
            Clause::Offset => q.offset.is_some(),
            Clause::Lock => q.lock.is_some(),
            Clause::Values => !q.rows.is_empty(),
            Clause::Set => !q.assignments.is_empty(),
            Clause::Returning => !q.returning.is_empty(),
            Clause::OnConflict => q.on_conflict.is_some(),
        }
    }
}

const ALL_CLAUSES: [Clause; 16] = [
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
    Clause::Values,
    Clause::Set,
    Clause::Returning,
    Clause::OnConflict,
];

/// Reject any clause the statement kind cannot carry.
pub(crate) fn ensure_clauses(query: &Query, allowed: &[Clause]) -> RenderResult<()> {
    match ALL_CLAUSES
        .iter()
        .find(|clause| !allowed.contains(clause) && clause.present(query))
    {
        Some(clause) => Err(RenderError::clause(query.operation, clause.name())),
        None => Ok(()),
    }
}

/// `"users"` or `"users" u`.
pub(crate) fn render_table(table: &Table, ctx: &RenderContext<'_>) -> String {
    let quoted = ctx.quote(table.name());
    match table.alias() {
        Some(alias) => ctx.generator().table_with_alias(&quoted, alias),
        None => quoted,
    }
}

/// ` INNER JOIN "orders" o ON …` for every join, in order.
pub(crate) fn render_joins(joins: &[Join], ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let mut sql = String::new();
    for join in joins {
        if !join.is_well_formed() {
            return Err(RenderError::InvalidJoin {
                kind: join.kind,
                table: join.table.name().to_string(),
            });
        }
        if !ctx.generator().supports_join(join.kind) {
            return Err(RenderError::unsupported(
                ctx.dialect(),
                format!("{} JOIN", join.kind),
            ));
        }
        sql.push_str(&format!(
            " {} JOIN {}",
            join.kind.sql_keyword(),
            render_table(&join.table, ctx)
        ));
        if let Some(on) = &join.on {
            let on = render_condition(on, ctx, ConditionScope::JoinOn)?;
            sql.push_str(&format!(" ON {}", on));
        }
    }
    Ok(sql)
}

/// ` WHERE …`, or nothing.
pub(crate) fn render_where(query: &Query, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    match &query.filter {
        Some(filter) => Ok(format!(
            " WHERE {}",
            render_condition(filter, ctx, ConditionScope::Where)?
        )),
        None => Ok(String::new()),
    }
}

/// Which pseudo-table SQL Server's OUTPUT clause reads from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum OutputSource {
    Inserted,
    Deleted,
}

/// ` OUTPUT INSERTED."a", INSERTED."b"` on dialects that report affected
/// rows that way; empty elsewhere.
pub(crate) fn render_output(
    query: &Query,
    source: OutputSource,
    ctx: &RenderContext<'_>,
) -> RenderResult<String> {
    if query.returning.is_empty() || ctx.generator().returning_style() != ReturningStyle::Output {
        return Ok(String::new());
    }
    let prefix = match source {
        OutputSource::Inserted => "INSERTED",
        OutputSource::Deleted => "DELETED",
    };
    let cols = query
        .returning
        .iter()
        .map(|f| output_column(f, prefix, ctx))
        .collect::<RenderResult<Vec<_>>>()?;
    Ok(format!(" OUTPUT {}", cols.join(", ")))
}

fn output_column(field: &Field, prefix: &str, ctx: &RenderContext<'_>) -> RenderResult<String> {
    if !field.is_plain() {
        return Err(RenderError::unsupported(
            ctx.dialect(),
            "qualified or JSON fields in OUTPUT",
        ));
    }
    Ok(format!("{}.{}", prefix, ctx.quote(field.name())))
}

/// Trailing ` RETURNING …` where the dialect uses it; an error where the
/// dialect cannot report affected rows at all.
pub(crate) fn render_returning(query: &Query, ctx: &RenderContext<'_>) -> RenderResult<String> {
    if query.returning.is_empty() {
        return Ok(String::new());
    }
    match ctx.generator().returning_style() {
        ReturningStyle::Returning => {
            let cols = query
                .returning
                .iter()
                .map(|f| render_field(f, ctx))
                .collect::<RenderResult<Vec<_>>>()?;
            Ok(format!(" RETURNING {}", cols.join(", ")))
        }
        ReturningStyle::Output => Ok(String::new()),
        ReturningStyle::Unsupported => Err(RenderError::unsupported(ctx.dialect(), "RETURNING")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;

    #[test]
    fn test_ensure_clauses_names_first_offender() {
        let mut r = ModelRegistry::new();
        r.register_table("users", &["id"]);
        let query = Query::delete(Table::must(&r, "users")).limit(1).offset(2);
        assert_eq!(
            ensure_clauses(&query, &[Clause::Where, Clause::Returning]),
            Err(RenderError::clause(Operation::Delete, "LIMIT"))
        );
    }
}
