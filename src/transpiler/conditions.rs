//! Predicate rendering for WHERE, HAVING, JOIN ON, CASE WHEN and FILTER.

use crate::ast::{AggregateExpr, Condition, Expr, LogicalOp, Operation, Operator};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::dml::build_query;
use crate::transpiler::expr::{render_expr, render_field};
use crate::transpiler::RenderContext;

/// Clause a condition is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionScope {
    Where,
    Having,
    JoinOn,
    CaseWhen,
    Filter,
}

/// Render a condition tree.
///
/// The top-level group is emitted bare; nested groups are parenthesized.
pub fn render_condition(
    cond: &Condition,
    ctx: &mut RenderContext<'_>,
    scope: ConditionScope,
) -> RenderResult<String> {
    render_node(cond, ctx, scope, false)
}

fn render_node(
    cond: &Condition,
    ctx: &mut RenderContext<'_>,
    scope: ConditionScope,
    nested: bool,
) -> RenderResult<String> {
    match cond {
        Condition::Simple { field, op, param } => {
            let col = render_field(field, ctx)?;
            if op.is_unary() {
                if param.is_some() {
                    return Err(RenderError::unexpected("IS [NOT] NULL", "a parameter"));
                }
                return Ok(format!("{} {}", col, op.sql_symbol()));
            }
            if !op.takes_param() {
                return Err(RenderError::InvalidOperator {
                    op: *op,
                    construct: "simple condition",
                });
            }
            let param = param
                .as_ref()
                .ok_or(RenderError::missing("condition", "a parameter"))?;
            let placeholder = ctx.add_param(param)?;
            Ok(compare(ctx, &col, *op, &placeholder))
        }
        Condition::Group { op, items } => render_group(*op, items, ctx, scope, nested),
        Condition::FieldComparison { left, op, right } => {
            if !(op.is_comparison() || op.is_pattern()) {
                return Err(RenderError::InvalidOperator {
                    op: *op,
                    construct: "field comparison",
                });
            }
            let left = render_field(left, ctx)?;
            let right = render_field(right, ctx)?;
            Ok(compare(ctx, &left, *op, &right))
        }
        Condition::Subquery { field, op, query } => {
            let col = match (op.is_existence(), field) {
                (true, Some(_)) => {
                    return Err(RenderError::unexpected("EXISTS", "a field"));
                }
                (true, None) => None,
                (false, Some(field)) if op.is_membership() || op.is_comparison() => {
                    Some(render_field(field, ctx)?)
                }
                (false, Some(_)) => {
                    return Err(RenderError::InvalidOperator {
                        op: *op,
                        construct: "subquery condition",
                    });
                }
                (false, None) => {
                    return Err(RenderError::missing("subquery condition", "a field"));
                }
            };
            if !matches!(query.operation, Operation::Select | Operation::Count) {
                return Err(RenderError::InvalidSubquery(query.operation));
            }
            let sub = {
                let mut child = ctx.enter_subquery()?;
                build_query(query, &mut child)?
            };
            Ok(match col {
                Some(col) => format!("{} {} ({})", col, op.sql_symbol(), sub),
                None => format!("{} ({})", op.sql_symbol(), sub),
            })
        }
        Condition::Between {
            field,
            low,
            high,
            negated,
        } => {
            let col = render_field(field, ctx)?;
            let low = ctx.add_param(low)?;
            let high = ctx.add_param(high)?;
            let not = if *negated { "NOT " } else { "" };
            Ok(format!("{} {}BETWEEN {} AND {}", col, not, low, high))
        }
        Condition::Aggregate {
            kind,
            field,
            op,
            param,
        } => {
            if scope != ConditionScope::Having {
                return Err(RenderError::AggregateOutsideHaving);
            }
            if !op.is_comparison() {
                return Err(RenderError::InvalidOperator {
                    op: *op,
                    construct: "aggregate condition",
                });
            }
            let agg = Expr::Aggregate(AggregateExpr::new(*kind, field.clone()));
            let left = render_expr(&agg, ctx)?;
            let placeholder = ctx.add_param(param)?;
            Ok(format!("{} {} {}", left, op.sql_symbol(), placeholder))
        }
        Condition::Expression { expr, op, param } => {
            if !(op.is_comparison() || op.is_pattern()) {
                return Err(RenderError::InvalidOperator {
                    op: *op,
                    construct: "expression condition",
                });
            }
            if expr.is_aggregate() && scope != ConditionScope::Having {
                return Err(RenderError::AggregateOutsideHaving);
            }
            let left = render_expr(expr, ctx)?;
            let placeholder = ctx.add_param(param)?;
            Ok(compare(ctx, &left, *op, &placeholder))
        }
    }
}

fn render_group(
    op: LogicalOp,
    items: &[Condition],
    ctx: &mut RenderContext<'_>,
    scope: ConditionScope,
    nested: bool,
) -> RenderResult<String> {
    match items {
        [] => Err(RenderError::EmptyConditionGroup),
        // a one-item group adds no precedence of its own
        [only] => render_node(only, ctx, scope, nested),
        items => {
            let parts = items
                .iter()
                .map(|item| render_node(item, ctx, scope, true))
                .collect::<RenderResult<Vec<_>>>()?;
            let joined = parts.join(&format!(" {} ", op.sql_keyword()));
            if nested {
                Ok(format!("({})", joined))
            } else {
                Ok(joined)
            }
        }
    }
}

/// `left op right`, routing ILIKE and IN through the dialect.
fn compare(ctx: &RenderContext<'_>, left: &str, op: Operator, right: &str) -> String {
    let generator = ctx.generator();
    match op {
        Operator::ILike => generator.ilike(left, right, false),
        Operator::NotILike => generator.ilike(left, right, true),
        Operator::In => generator.in_array(left, right),
        Operator::NotIn => generator.not_in_array(left, right),
        op => format!("{} {} {}", left, op.sql_symbol(), right),
    }
}
