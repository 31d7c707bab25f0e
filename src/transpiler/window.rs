//! Window function rendering.

use crate::ast::{AggregateKind, Frame, FrameBound, FrameUnits, WindowExpr, WindowFunc, WindowSpec};
use crate::error::{RenderError, RenderResult};
use crate::transpiler::expr::{render_field, render_field_list, render_order_by};
use crate::transpiler::RenderContext;

/// `FUNC(args) OVER (…)`
pub fn render_window(window: &WindowExpr, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let call = render_call(window, ctx)?;
    let over = render_over(&window.over, ctx)?;
    Ok(format!("{} OVER ({})", call, over))
}

fn render_call(w: &WindowExpr, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let name = w.func.to_string();

    if w.func != WindowFunc::Ntile && w.bucket.is_some() {
        return Err(RenderError::unexpected("window function", "a bucket count"));
    }
    if !matches!(w.func, WindowFunc::Lag | WindowFunc::Lead)
        && (w.offset.is_some() || w.default.is_some())
    {
        return Err(RenderError::unexpected("window function", "an offset or default"));
    }

    match w.func {
        WindowFunc::RowNumber | WindowFunc::Rank | WindowFunc::DenseRank => {
            if w.field.is_some() {
                return Err(RenderError::unexpected("ranking function", "a field"));
            }
            Ok(format!("{}()", name))
        }
        WindowFunc::Ntile => {
            if w.field.is_some() {
                return Err(RenderError::unexpected("NTILE", "a field"));
            }
            let bucket = w
                .bucket
                .as_ref()
                .ok_or(RenderError::missing("NTILE", "a bucket count"))?;
            let bucket = ctx.add_param(bucket)?;
            Ok(format!("NTILE({})", bucket))
        }
        WindowFunc::Lag | WindowFunc::Lead => {
            let field = w.field.as_ref().ok_or(RenderError::missing("LAG/LEAD", "a field"))?;
            let mut args = vec![render_field(field, ctx)?];
            match (&w.offset, &w.default) {
                (Some(offset), default) => {
                    args.push(ctx.add_param(offset)?);
                    if let Some(default) = default {
                        args.push(ctx.add_param(default)?);
                    }
                }
                // the default is positional, so the offset has to be spelled
                (None, Some(default)) => {
                    args.push("1".to_string());
                    args.push(ctx.add_param(default)?);
                }
                (None, None) => {}
            }
            Ok(format!("{}({})", name, args.join(", ")))
        }
        WindowFunc::FirstValue | WindowFunc::LastValue => {
            let field = w
                .field
                .as_ref()
                .ok_or(RenderError::missing("FIRST_VALUE/LAST_VALUE", "a field"))?;
            Ok(format!("{}({})", name, render_field(field, ctx)?))
        }
        WindowFunc::Aggregate(kind) => {
            let distinct = if kind == AggregateKind::CountDistinct {
                "DISTINCT "
            } else {
                ""
            };
            let arg = match (&w.field, kind) {
                (Some(field), _) => render_field(field, ctx)?,
                (None, AggregateKind::Count) => "*".to_string(),
                (None, _) => return Err(RenderError::missing("window aggregate", "a field")),
            };
            Ok(format!("{}({}{})", kind.sql_name(), distinct, arg))
        }
    }
}

fn render_over(spec: &WindowSpec, ctx: &mut RenderContext<'_>) -> RenderResult<String> {
    let mut parts = Vec::new();
    if !spec.partition_by.is_empty() {
        parts.push(format!(
            "PARTITION BY {}",
            render_field_list(&spec.partition_by, ctx)?
        ));
    }
    if !spec.order_by.is_empty() {
        parts.push(format!("ORDER BY {}", render_order_by(&spec.order_by, ctx)?));
    }
    if let Some(frame) = &spec.frame {
        parts.push(render_frame(frame)?);
    }
    Ok(parts.join(" "))
}

fn render_frame(frame: &Frame) -> RenderResult<String> {
    let units = match frame.units {
        FrameUnits::Rows => "ROWS",
        FrameUnits::Range => "RANGE",
    };
    if frame.start == FrameBound::UnboundedFollowing {
        return Err(RenderError::InvalidFrame(
            "frame cannot start at UNBOUNDED FOLLOWING",
        ));
    }
    match frame.end {
        None => {
            if frame.start.rank() > FrameBound::CurrentRow.rank() {
                return Err(RenderError::InvalidFrame(
                    "a frame without an end must start at or before CURRENT ROW",
                ));
            }
            Ok(format!("{} {}", units, bound_to_sql(frame.start)))
        }
        Some(end) => {
            if end == FrameBound::UnboundedPreceding {
                return Err(RenderError::InvalidFrame(
                    "frame cannot end at UNBOUNDED PRECEDING",
                ));
            }
            if frame.start.rank() > end.rank() {
                return Err(RenderError::InvalidFrame("frame ends before it starts"));
            }
            Ok(format!(
                "{} BETWEEN {} AND {}",
                units,
                bound_to_sql(frame.start),
                bound_to_sql(end)
            ))
        }
    }
}

fn bound_to_sql(bound: FrameBound) -> String {
    match bound {
        FrameBound::UnboundedPreceding => "UNBOUNDED PRECEDING".to_string(),
        FrameBound::Preceding(n) => format!("{} PRECEDING", n),
        FrameBound::CurrentRow => "CURRENT ROW".to_string(),
        FrameBound::Following(n) => format!("{} FOLLOWING", n),
        FrameBound::UnboundedFollowing => "UNBOUNDED FOLLOWING".to_string(),
    }
}
