//! SQL transpiler.
//!
//! Renders a [`Query`], [`CompoundQuery`] or [`Statement`] into one
//! parameterized SQL string plus the ordered list of parameter names it
//! references.

pub mod conditions;
pub mod context;
pub mod dialect;
pub mod dml;
pub mod expr;
pub mod sql;
pub mod traits;
pub mod window;

#[cfg(test)]
mod tests;

use crate::ast::{CompoundQuery, Query, Statement};
use crate::config::RenderOptions;
use crate::error::RenderResult;
use serde::Serialize;

pub use conditions::ConditionScope;
pub use context::{ParamSet, RenderContext};
pub use dialect::Dialect;
pub use traits::{LockClause, ReturningStyle, SqlGenerator, UpsertStyle, quote_with};

/// Output of a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedQuery {
    pub sql: String,
    /// Prefixed parameter names in first-occurrence order, each listed once.
    pub params: Vec<String>,
}

/// Trait for converting AST nodes to SQL.
pub trait ToSql {
    /// Render with the default dialect and options.
    fn to_sql(&self) -> RenderResult<RenderedQuery> {
        self.to_sql_with_options(&RenderOptions::default())
    }

    fn to_sql_with_dialect(&self, dialect: Dialect) -> RenderResult<RenderedQuery> {
        self.to_sql_with_options(&RenderOptions::new(dialect))
    }

    fn to_sql_with_options(&self, options: &RenderOptions) -> RenderResult<RenderedQuery>;
}

impl ToSql for Query {
    fn to_sql_with_options(&self, options: &RenderOptions) -> RenderResult<RenderedQuery> {
        render_with(options, |ctx| dml::build_query(self, ctx))
    }
}

impl ToSql for CompoundQuery {
    fn to_sql_with_options(&self, options: &RenderOptions) -> RenderResult<RenderedQuery> {
        render_with(options, |ctx| dml::compound::build_compound(self, ctx))
    }
}

impl ToSql for Statement {
    fn to_sql_with_options(&self, options: &RenderOptions) -> RenderResult<RenderedQuery> {
        match self {
            Statement::Query(query) => query.to_sql_with_options(options),
            Statement::Compound(compound) => compound.to_sql_with_options(options),
        }
    }
}

/// Set up a fresh top-level context, run `build`, collect the parameters.
fn render_with<F>(options: &RenderOptions, build: F) -> RenderResult<RenderedQuery>
where
    F: FnOnce(&mut RenderContext<'_>) -> RenderResult<String>,
{
    let generator = options.dialect.generator();
    let mut params = ParamSet::new();
    let result = {
        let mut ctx = RenderContext::new(generator.as_ref(), &mut params, options);
        build(&mut ctx)
    };

    match result {
        Ok(sql) => {
            tracing::debug!(
                dialect = %options.dialect,
                params = params.len(),
                "rendered query"
            );
            Ok(RenderedQuery {
                sql,
                params: params.into_names(),
            })
        }
        Err(err) => {
            tracing::debug!(dialect = %options.dialect, error = %err, "render failed");
            Err(err)
        }
    }
}
