//! Model registry catalog.
//!
//! A [`Model`] declares its table and fields as associated constants;
//! registering it makes those names valid identifiers from then on.
//!
//! ```ignore
//! struct User;
//!
//! impl Model for User {
//!     const TABLE: &'static str = "users";
//!     const FIELDS: &'static [&'static str] = &["id", "email", "username"];
//! }
//!
//! let mut registry = ModelRegistry::new();
//! registry.register::<User>();
//! let users = Table::new(&registry, "users")?;
//! ```

use crate::validator::Catalog;
use std::collections::{BTreeMap, BTreeSet};

/// A data model whose table and fields become valid identifiers.
pub trait Model {
    const TABLE: &'static str;
    const FIELDS: &'static [&'static str];
    /// Output aliases the model's queries use (computed columns).
    const ALIASES: &'static [&'static str] = &[];
}

/// Explicit registry of tables, their fields and vetted output aliases.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    tables: BTreeMap<String, BTreeSet<String>>,
    aliases: BTreeSet<String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model.
    pub fn register<M: Model>(&mut self) -> &mut Self {
        self.register_table(M::TABLE, M::FIELDS);
        for alias in M::ALIASES {
            self.register_alias(alias);
        }
        self
    }

    /// Register a table and its fields. Re-registering merges the fields.
    pub fn register_table(&mut self, table: &str, fields: &[&str]) -> &mut Self {
        let entry = self.tables.entry(table.to_string()).or_default();
        entry.extend(fields.iter().map(|f| f.to_string()));
        tracing::debug!(table, fields = fields.len(), "registered model");
        self
    }

    pub fn register_alias(&mut self, alias: &str) -> &mut Self {
        self.aliases.insert(alias.to_string());
        self
    }

    /// Fields of one table.
    pub fn fields_of(&self, table: &str) -> Option<impl Iterator<Item = &str>> {
        self.tables
            .get(table)
            .map(|fields| fields.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Catalog for ModelRegistry {
    fn table_exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    fn field_exists(&self, name: &str) -> bool {
        self.tables.values().any(|fields| fields.contains(name))
    }

    fn alias_registered(&self, name: &str) -> bool {
        self.aliases.contains(name)
    }

    fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    fn field_names(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> = self
            .tables
            .values()
            .flat_map(|fields| fields.iter().map(String::as_str))
            .collect();
        unique.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::IdentKind;

    struct User;

    impl Model for User {
        const TABLE: &'static str = "users";
        const FIELDS: &'static [&'static str] = &["id", "email", "username"];
        const ALIASES: &'static [&'static str] = &["display_name"];
    }

    struct Order;

    impl Model for Order {
        const TABLE: &'static str = "orders";
        const FIELDS: &'static [&'static str] = &["id", "user_id", "total"];
    }

    #[test]
    fn test_register_models() {
        let mut registry = ModelRegistry::new();
        assert!(!registry.table_exists("users"));

        registry.register::<User>().register::<Order>();
        assert_eq!(registry.len(), 2);
        assert!(registry.table_exists("users"));
        assert!(registry.field_exists("user_id"));
        assert!(registry.alias_registered("display_name"));
        assert!(!registry.field_exists("password"));
    }

    #[test]
    fn test_field_suggestion() {
        let mut registry = ModelRegistry::new();
        registry.register::<User>();
        let err = registry.validate(IdentKind::Field, "usernme").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'usernme' not found. Did you mean 'username'?"
        );
    }

    #[test]
    fn test_fields_of() {
        let mut registry = ModelRegistry::new();
        registry.register::<Order>();
        let fields: Vec<&str> = registry.fields_of("orders").unwrap().collect();
        assert_eq!(fields, vec!["id", "total", "user_id"]);
        assert!(registry.fields_of("users").is_none());
    }
}
