//! Transpiler tests, grouped by concern.

mod core;
mod features;

use crate::ast::{Field, Param, Table};
use crate::registry::ModelRegistry;

/// Catalog shared by the transpiler tests.
pub(super) fn catalog() -> ModelRegistry {
    let mut r = ModelRegistry::new();
    r.register_table(
        "users",
        &[
            "id", "username", "email", "age", "active", "role", "status", "created_at",
            "profile", "embedding", "score", "name", "login_count",
        ],
    );
    r.register_table(
        "orders",
        &["id", "user_id", "total", "status", "created_at", "amount"],
    );
    r.register_table("products", &["id", "name", "price", "stock", "category_id"]);
    r.register_table("categories", &["id", "name", "parent_id"]);
    r.register_table("order_items", &["id", "order_id", "product_id", "quantity"]);
    r
}

pub(super) fn t(name: &str) -> Table {
    Table::must(&catalog(), name)
}

pub(super) fn f(name: &str) -> Field {
    Field::must(&catalog(), name)
}

pub(super) fn p(name: &str) -> Param {
    Param::must(name)
}
