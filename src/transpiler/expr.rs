//! Expression compiler.
//!
//! Every field reference goes through [`render_field`], so dialect checks on
//! JSON access apply wherever a field appears.

use crate::ast::{
    AggregateExpr, AggregateKind, CaseExpr, Expr, Field, FieldExpr, MathExpr, MathFunc,
    NullsOrder, Operand, OrderBy, Qualifier, SortOrder,
};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::conditions::{ConditionScope, render_condition};
use crate::transpiler::window::render_window;
use crate::transpiler::RenderContext;

/// `"col"`, `"table"."col"`, `u."col"`, `"col"->'key'`.
pub fn render_field(field: &Field, ctx: &RenderContext<'_>) -> RenderResult<String> {
    let column = ctx.quote(field.name());
    let base = match field.qualifier() {
        None => column,
        Some(Qualifier::Table(table)) => format!("{}.{}", ctx.quote(table), column),
        Some(Qualifier::Alias(alias)) => format!("{}.{}", alias, column),
    };
    match field.json_path() {
        None => Ok(base),
        Some(path) if path.segments().is_empty() => {
            Err(RenderError::missing("JSON path", "at least one segment"))
        }
        Some(path) => ctx.generator().json_access(&base, path),
    }
}

pub fn render_operand(operand: &Operand, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    match operand {
        Operand::Field(field) => render_field(field, ctx),
        Operand::Param(param) => ctx.add_param(param),
    }
}

/// Projection item with its optional `AS` alias.
pub fn render_field_expr(item: &FieldExpr, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let sql = render_expr(&item.expr, ctx)?;
    match &item.alias {
        Some(alias) => Ok(format!("{} AS {}", sql, ctx.quote(alias.as_str()))),
        None => Ok(sql),
    }
}

pub fn render_expr(expr: &Expr, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    match expr {
        Expr::Field(field) => render_field(field, ctx),
        Expr::Aggregate(agg) => render_aggregate(agg, ctx),
        Expr::Case(case) => render_case(case, ctx),
        Expr::Coalesce(operands) => {
            if operands.len() < 2 {
                return Err(RenderError::missing("COALESCE", "at least two operands"));
            }
            let parts = operands
                .iter()
                .map(|o| render_operand(o, ctx))
                .collect::<RenderResult<Vec<_>>>()?;
            Ok(format!("COALESCE({})", parts.join(", ")))
        }
        Expr::NullIf(left, right) => {
            let left = render_operand(left, ctx)?;
            let right = render_operand(right, ctx)?;
            Ok(format!("NULLIF({}, {})", left, right))
        }
        Expr::Math(math) => render_math(math, ctx),
        Expr::Cast { field, to } => {
            let col = render_field(field, ctx)?;
            let ty = ctx.generator().cast_type(*to)?;
            Ok(format!("CAST({} AS {})", col, ty))
        }
        Expr::Window(window) => render_window(window, ctx),
        Expr::Binary { field, op, param } => {
            let left = render_field(field, ctx)?;
            let right = ctx.add_param(param)?;
            ctx.generator().binary_expr(&left, *op, &right)
        }
    }
}

/// Aggregate call. A FILTER clause is emitted natively where supported and
/// folded into a CASE argument elsewhere.
fn render_aggregate(agg: &AggregateExpr, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let name = agg.kind.sql_name();
    let distinct = if agg.kind == AggregateKind::CountDistinct {
        "DISTINCT "
    } else {
        ""
    };

    let field = match (&agg.field, agg.kind) {
        (Some(field), _) => Some(render_field(field, ctx)?),
        (None, AggregateKind::Count) => None,
        (None, _) => return Err(RenderError::missing("aggregate", "a field")),
    };

    let Some(filter) = &agg.filter else {
        let arg = field.unwrap_or_else(|| "*".to_string());
        return Ok(format!("{}({}{})", name, distinct, arg));
    };

    let condition = render_condition(filter, ctx, ConditionScope::Filter)?;
    if ctx.generator().supports_aggregate_filter() {
        let arg = field.unwrap_or_else(|| "*".to_string());
        Ok(format!(
            "{}({}{}) FILTER (WHERE {})",
            name, distinct, arg, condition
        ))
    } else {
        // CASE without ELSE yields NULL, which every aggregate skips
        let then = field.unwrap_or_else(|| "1".to_string());
        Ok(format!(
            "{}({}CASE WHEN {} THEN {} END)",
            name, distinct, condition, then
        ))
    }
}

fn render_case(case: &CaseExpr, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    if case.whens.is_empty() {
        return Err(RenderError::missing("CASE", "at least one WHEN branch"));
    }
    let mut sql = String::from("CASE");
    for when in &case.whens {
        let condition = render_condition(&when.condition, ctx, ConditionScope::CaseWhen)?;
        let then = ctx.add_param(&when.then)?;
        sql.push_str(&format!(" WHEN {} THEN {}", condition, then));
    }
    if let Some(otherwise) = &case.otherwise {
        let value = ctx.add_param(otherwise)?;
        sql.push_str(&format!(" ELSE {}", value));
    }
    sql.push_str(" END");
    Ok(sql)
}

fn render_math(math: &MathExpr, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let col = render_field(&math.field, ctx)?;
    let arg = match (math.func, &math.arg) {
        (MathFunc::Round, arg) => arg.as_ref(),
        (MathFunc::Power, Some(exponent)) => Some(exponent),
        (MathFunc::Power, None) => return Err(RenderError::missing("POWER", "an exponent")),
        (_, Some(_)) => return Err(RenderError::unexpected("math function", "an argument")),
        (_, None) => None,
    };
    let arg = arg.map(|p| ctx.add_param(p)).transpose()?;
    Ok(ctx.generator().math_call(math.func, &col, arg.as_deref()))
}

/// Comma-joined ORDER BY items (without the keyword).
pub fn render_order_by(items: &[OrderBy], ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        let mut sql = render_expr(&item.expr, ctx)?;
        sql.push_str(match item.direction {
            SortOrder::Asc => " ASC",
            SortOrder::Desc => " DESC",
        });
        if let Some(nulls) = item.nulls {
            if !ctx.generator().supports_nulls_ordering() {
                return Err(RenderError::unsupported(ctx.dialect(), "NULLS FIRST/LAST"));
            }
            sql.push_str(match nulls {
                NullsOrder::First => " NULLS FIRST",
                NullsOrder::Last => " NULLS LAST",
            });
        }
        parts.push(sql);
    }
    Ok(parts.join(", "))
}

/// Comma-joined field list.
pub fn render_field_list(fields: &[Field], ctx: &RenderContext<'_>) -> RenderResult<String> {
    let parts = fields
        .iter()
        .map(|f| render_field(f, ctx))
        .collect::<RenderResult<Vec<_>>>()?;
    Ok(parts.join(", "))
}
