//! Conflict handling for INSERT.
//!
//! PostgreSQL and SQLite take `ON CONFLICT (target) DO …`; MySQL takes
//! `INSERT IGNORE` or `ON DUPLICATE KEY UPDATE` and resolves against any
//! unique key, so the target is not rendered there.

use crate::ast::{ConflictAction, ConflictValue, Field, OnConflict, Query};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::{RenderContext, UpsertStyle};

/// `INSERT INTO`, or `INSERT IGNORE INTO` for a MySQL DO NOTHING.
pub(crate) fn insert_keyword(query: &Query, ctx: &RenderContext<'_>) -> RenderResult<&'static str> {
    match &query.on_conflict {
        Some(OnConflict {
            action: ConflictAction::DoNothing,
            ..
        }) if ctx.generator().upsert_style() == UpsertStyle::OnDuplicateKey => {
            Ok("INSERT IGNORE INTO")
        }
        _ => Ok("INSERT INTO"),
    }
}

/// Conflict suffix placed after VALUES, or nothing.
pub(crate) fn build_on_conflict(query: &Query, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let Some(on_conflict) = &query.on_conflict else {
        return Ok(String::new());
    };
    match ctx.generator().upsert_style() {
        UpsertStyle::OnConflict => on_conflict_clause(on_conflict, ctx),
        UpsertStyle::OnDuplicateKey => on_duplicate_key_clause(on_conflict, ctx),
        UpsertStyle::Unsupported => Err(RenderError::unsupported(ctx.dialect(), "ON CONFLICT")),
    }
}

fn on_conflict_clause(oc: &OnConflict, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let target = if oc.target.is_empty() {
        String::new()
    } else {
        let cols = oc
            .target
            .iter()
            .map(|f| plain_column(f, ctx))
            .collect::<RenderResult<Vec<_>>>()?;
        format!(" ({})", cols.join(", "))
    };

    match &oc.action {
        ConflictAction::DoNothing => Ok(format!(" ON CONFLICT{} DO NOTHING", target)),
        ConflictAction::DoUpdate(updates) => {
            if target.is_empty() {
                return Err(RenderError::missing("ON CONFLICT DO UPDATE", "a conflict target"));
            }
            if updates.is_empty() {
                return Err(RenderError::missing("ON CONFLICT DO UPDATE", "an assignment"));
            }
            let mut sets = Vec::with_capacity(updates.len());
            for (col, value) in updates {
                let quoted = ctx.quote(col);
                let value = match value {
                    ConflictValue::Param(param) => ctx.add_param(param)?,
                    ConflictValue::Excluded => format!("EXCLUDED.{}", quoted),
                };
                sets.push(format!("{} = {}", quoted, value));
            }
            Ok(format!(
                " ON CONFLICT{} DO UPDATE SET {}",
                target,
                sets.join(", ")
            ))
        }
    }
}

fn on_duplicate_key_clause(oc: &OnConflict, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    match &oc.action {
        // rendered as INSERT IGNORE
        ConflictAction::DoNothing => Ok(String::new()),
        ConflictAction::DoUpdate(updates) => {
            if updates.is_empty() {
                return Err(RenderError::missing("ON DUPLICATE KEY UPDATE", "an assignment"));
            }
            let mut sets = Vec::with_capacity(updates.len());
            for (col, value) in updates {
                let quoted = ctx.quote(col);
                let value = match value {
                    ConflictValue::Param(param) => ctx.add_param(param)?,
                    ConflictValue::Excluded => format!("VALUES({})", quoted),
                };
                sets.push(format!("{} = {}", quoted, value));
            }
            Ok(format!(" ON DUPLICATE KEY UPDATE {}", sets.join(", ")))
        }
    }
}

fn plain_column(field: &Field, ctx: &RenderContext<'_>) -> RenderResult<String> {
    if !field.is_plain() {
        return Err(RenderError::unexpected(
            "ON CONFLICT target",
            "a qualified or JSON field",
        ));
    }
    Ok(ctx.quote(field.name()))
}
