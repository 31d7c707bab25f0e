//! # Quarry
//!
//! Typed query construction that compiles to parameterized SQL.
//!
//! Queries are built as a tree of validated identifiers and named
//! parameters, then rendered for PostgreSQL, MySQL, SQLite or SQL Server.
//! Values never enter the SQL text: the renderer returns the statement and
//! the ordered list of parameter names it expects.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use quarry::prelude::*;
//!
//! let mut catalog = ModelRegistry::new();
//! catalog.register_table("users", &["id", "username", "active"]);
//!
//! let query = Query::select(Table::new(&catalog, "users")?)
//!     .field(Field::new(&catalog, "id")?)
//!     .field(Field::new(&catalog, "username")?)
//!     .filter(eq(Field::new(&catalog, "active")?, Param::new("is_active")?));
//!
//! let rendered = query.to_sql()?;
//! // SELECT "id", "username" FROM "users" WHERE "active" = :is_active
//! assert_eq!(rendered.params, vec!["is_active"]);
//! ```
//!
//! Subqueries prefix their parameters by depth (`:sq1_x`, `:sq2_x`), so the
//! same name can be bound independently at each nesting level.

pub mod ast;
pub mod config;
pub mod error;
pub mod registry;
pub mod schema;
pub mod transpiler;
pub mod validator;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::config::{Config, PlaceholderStyle, RenderOptions};
    pub use crate::error::*;
    pub use crate::registry::{Model, ModelRegistry};
    pub use crate::schema::Schema;
    pub use crate::transpiler::{Dialect, RenderedQuery, ToSql};
    pub use crate::validator::{Catalog, ValidationError, validate_statement};
}

pub use transpiler::{Dialect, RenderedQuery, ToSql};
