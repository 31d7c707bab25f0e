//! Identifier gate and catalog validation.
//!
//! Tables and fields are admitted only when a [`Catalog`] knows them.
//! Parameters, output aliases and JSON keys go through a syntactic check and
//! a denylist of SQL metacharacters and statement keywords.

use crate::ast::{
    AssignValue, CompoundQuery, Condition, ConflictAction, Expr, Field, JsonSegment, Operand,
    OrderBy, Qualifier, Query, Statement, Table, WindowExpr,
};
use strsim::levenshtein;

/// What an identifier is about to be used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentKind {
    Table,
    Field,
    Alias,
    Parameter,
    JsonKey,
}

impl std::fmt::Display for IdentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentKind::Table => write!(f, "table"),
            IdentKind::Field => write!(f, "field"),
            IdentKind::Alias => write!(f, "alias"),
            IdentKind::Parameter => write!(f, "parameter"),
            IdentKind::JsonKey => write!(f, "JSON key"),
        }
    }
}

/// Validation error with structured information.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Empty {
        kind: IdentKind,
    },
    /// The candidate contains a denylisted sequence or keyword.
    Denied {
        kind: IdentKind,
        name: String,
        pattern: &'static str,
    },
    InvalidSyntax {
        kind: IdentKind,
        name: String,
        reason: &'static str,
    },
    /// Parameter names may not collide with the subquery prefix space.
    ReservedPrefix {
        name: String,
    },
    TableNotFound {
        table: String,
        suggestion: Option<String>,
    },
    FieldNotFound {
        field: String,
        suggestion: Option<String>,
    },
    InvalidTableAlias {
        alias: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Empty { kind } => write!(f, "Empty {} name", kind),
            ValidationError::Denied {
                kind,
                name,
                pattern,
            } => write!(
                f,
                "Invalid {} '{}': contains forbidden {}",
                kind, name, pattern
            ),
            ValidationError::InvalidSyntax { kind, name, reason } => {
                write!(f, "Invalid {} '{}': {}", kind, name, reason)
            }
            ValidationError::ReservedPrefix { name } => write!(
                f,
                "Invalid parameter '{}': the sq<N>_ prefix is reserved for subqueries",
                name
            ),
            ValidationError::TableNotFound { table, suggestion } => {
                if let Some(s) = suggestion {
                    write!(f, "Table '{}' not found. Did you mean '{}'?", table, s)
                } else {
                    write!(f, "Table '{}' not found.", table)
                }
            }
            ValidationError::FieldNotFound { field, suggestion } => {
                if let Some(s) = suggestion {
                    write!(f, "Field '{}' not found. Did you mean '{}'?", field, s)
                } else {
                    write!(f, "Field '{}' not found.", field)
                }
            }
            ValidationError::InvalidTableAlias { alias } => write!(
                f,
                "Invalid table alias '{}': must be a single lowercase letter",
                alias
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a whole query tree.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Sequences that never appear in a legitimate identifier.
const DENIED_SEQUENCES: &[(&str, &str)] = &[
    (";", "statement terminator ';'"),
    ("--", "line comment '--'"),
    ("/*", "block comment '/*'"),
    ("*/", "block comment '*/'"),
    ("'", "quote '''"),
    ("\"", "quote '\"'"),
    ("`", "quote '`'"),
    ("\\", "backslash"),
];

/// Statement verbs rejected as whole identifiers (case-insensitive).
const STATEMENT_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "drop", "alter", "create", "truncate", "grant",
    "revoke", "exec", "execute", "union", "merge",
];

/// Syntactic + denylist check for parameters, aliases and JSON keys.
pub fn check_identifier(kind: IdentKind, candidate: &str) -> Result<(), ValidationError> {
    if candidate.is_empty() {
        return Err(ValidationError::Empty { kind });
    }

    let denied = |pattern: &'static str| ValidationError::Denied {
        kind,
        name: candidate.to_string(),
        pattern,
    };

    for &(seq, pattern) in DENIED_SEQUENCES {
        if candidate.contains(seq) {
            return Err(denied(pattern));
        }
    }

    let lower = candidate.to_ascii_lowercase();
    if lower.contains(" or ") || lower.contains(" and ") {
        return Err(denied("boolean keyword"));
    }
    if candidate.chars().any(char::is_whitespace) {
        return Err(denied("whitespace"));
    }
    if STATEMENT_KEYWORDS.contains(&lower.as_str()) {
        return Err(denied("statement keyword"));
    }

    check_syntax(kind, candidate)?;

    if kind == IdentKind::Parameter && has_subquery_prefix(candidate) {
        return Err(ValidationError::ReservedPrefix {
            name: candidate.to_string(),
        });
    }

    Ok(())
}

/// Character class only: a letter or `_`, then letters, digits and `_`.
pub fn check_syntax(kind: IdentKind, candidate: &str) -> Result<(), ValidationError> {
    let invalid = |reason: &'static str| ValidationError::InvalidSyntax {
        kind,
        name: candidate.to_string(),
        reason,
    };

    let mut chars = candidate.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Err(invalid("must start with a letter or underscore")),
        None => return Err(ValidationError::Empty { kind }),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("may only contain letters, digits and underscores"));
    }
    Ok(())
}

/// `sq<digits>_…`
fn has_subquery_prefix(name: &str) -> bool {
    let Some(rest) = name.strip_prefix("sq") else {
        return false;
    };
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && rest[digits..].starts_with('_')
}

/// Find the closest match for a name using Levenshtein distance.
pub fn did_you_mean<'a>(name: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let max_distance = match name.len() {
        0..=2 => 0,
        3..=5 => 2,
        _ => 3,
    };

    candidates
        .into_iter()
        .map(|c| (c, levenshtein(name, c)))
        .filter(|(_, d)| *d <= max_distance && *d > 0)
        .min_by_key(|(_, d)| *d)
        .map(|(c, _)| c.to_string())
}

/// Source of truth for table and field names.
///
/// [`crate::registry::ModelRegistry`] and [`crate::schema::Schema`] implement
/// it; either can gate AST construction.
pub trait Catalog {
    fn table_exists(&self, name: &str) -> bool;

    fn field_exists(&self, name: &str) -> bool;

    /// Output aliases the catalog vouches for.
    fn alias_registered(&self, _name: &str) -> bool {
        false
    }

    /// Known table names, for suggestions.
    fn table_names(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Known field names, for suggestions.
    fn field_names(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Admit or reject `candidate` as an identifier of `kind`.
    fn validate(&self, kind: IdentKind, candidate: &str) -> Result<(), ValidationError> {
        if candidate.is_empty() {
            return Err(ValidationError::Empty { kind });
        }
        match kind {
            IdentKind::Table => {
                if self.table_exists(candidate) {
                    Ok(())
                } else {
                    Err(ValidationError::TableNotFound {
                        table: candidate.to_string(),
                        suggestion: did_you_mean(candidate, self.table_names()),
                    })
                }
            }
            IdentKind::Field => {
                if self.field_exists(candidate) {
                    Ok(())
                } else {
                    Err(ValidationError::FieldNotFound {
                        field: candidate.to_string(),
                        suggestion: did_you_mean(candidate, self.field_names()),
                    })
                }
            }
            IdentKind::Alias if self.alias_registered(candidate) => Ok(()),
            IdentKind::Alias | IdentKind::Parameter | IdentKind::JsonKey => {
                check_identifier(kind, candidate)
            }
        }
    }
}

/// Check every identifier in `query` against `catalog`.
///
/// Deserialized trees bypass the validated constructors; run this before
/// rendering them.
pub fn validate_query<C: Catalog + ?Sized>(catalog: &C, query: &Query) -> ValidationResult {
    let mut walker = TreeWalker {
        catalog,
        errors: Vec::new(),
    };
    walker.query(query);
    walker.finish()
}

pub fn validate_compound<C: Catalog + ?Sized>(
    catalog: &C,
    compound: &CompoundQuery,
) -> ValidationResult {
    let mut walker = TreeWalker {
        catalog,
        errors: Vec::new(),
    };
    for query in compound.operands() {
        walker.query(query);
    }
    walker.order_by(&compound.order_by);
    walker.finish()
}

pub fn validate_statement<C: Catalog + ?Sized>(
    catalog: &C,
    statement: &Statement,
) -> ValidationResult {
    match statement {
        Statement::Query(query) => validate_query(catalog, query),
        Statement::Compound(compound) => validate_compound(catalog, compound),
    }
}

struct TreeWalker<'c, C: ?Sized> {
    catalog: &'c C,
    errors: Vec<ValidationError>,
}

impl<C: Catalog + ?Sized> TreeWalker<'_, C> {
    fn finish(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn check(&mut self, kind: IdentKind, name: &str) {
        if let Err(e) = self.catalog.validate(kind, name) {
            self.errors.push(e);
        }
    }

    fn table(&mut self, table: &Table) {
        self.check(IdentKind::Table, table.name());
    }

    fn field(&mut self, field: &Field) {
        self.check(IdentKind::Field, field.name());
        if let Some(Qualifier::Table(name)) = field.qualifier() {
            self.check(IdentKind::Table, name);
        }
        if let Some(path) = field.json_path() {
            for segment in path.segments() {
                if let JsonSegment::Key(key) = segment {
                    self.check(IdentKind::JsonKey, key.as_str());
                }
            }
        }
    }

    fn query(&mut self, q: &Query) {
        self.table(&q.table);
        q.distinct_on.iter().for_each(|f| self.field(f));
        for fe in &q.fields {
            self.expr(&fe.expr);
            if let Some(alias) = &fe.alias {
                self.check(IdentKind::Alias, alias.as_str());
            }
        }
        for join in &q.joins {
            self.table(&join.table);
            if let Some(on) = &join.on {
                self.condition(on);
            }
        }
        if let Some(c) = &q.filter {
            self.condition(c);
        }
        q.group_by.iter().for_each(|f| self.field(f));
        if let Some(c) = &q.having {
            self.condition(c);
        }
        self.order_by(&q.order_by);
        for row in &q.rows {
            for column in row.columns() {
                self.check(IdentKind::Field, column);
            }
        }
        for assignment in &q.assignments {
            self.field(&assignment.field);
            if let AssignValue::Expr(e) = &assignment.value {
                self.expr(e);
            }
        }
        q.returning.iter().for_each(|f| self.field(f));
        if let Some(conflict) = &q.on_conflict {
            conflict.target.iter().for_each(|f| self.field(f));
            if let ConflictAction::DoUpdate(updates) = &conflict.action {
                for column in updates.keys() {
                    self.check(IdentKind::Field, column);
                }
            }
        }
    }

    fn order_by(&mut self, items: &[OrderBy]) {
        for item in items {
            self.expr(&item.expr);
        }
    }

    fn operand(&mut self, operand: &Operand) {
        if let Operand::Field(f) = operand {
            self.field(f);
        }
    }

    fn condition(&mut self, cond: &Condition) {
        match cond {
            Condition::Simple { field, .. } | Condition::Between { field, .. } => {
                self.field(field)
            }
            Condition::Group { items, .. } => items.iter().for_each(|c| self.condition(c)),
            Condition::FieldComparison { left, right, .. } => {
                self.field(left);
                self.field(right);
            }
            Condition::Subquery { field, query, .. } => {
                if let Some(f) = field {
                    self.field(f);
                }
                self.query(query);
            }
            Condition::Aggregate { field, .. } => {
                if let Some(f) = field {
                    self.field(f);
                }
            }
            Condition::Expression { expr, .. } => self.expr(expr),
        }
    }

    fn window(&mut self, w: &WindowExpr) {
        if let Some(f) = &w.field {
            self.field(f);
        }
        w.over.partition_by.iter().for_each(|f| self.field(f));
        self.order_by(&w.over.order_by);
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Field(f) | Expr::Cast { field: f, .. } | Expr::Binary { field: f, .. } => {
                self.field(f)
            }
            Expr::Aggregate(agg) => {
                if let Some(f) = &agg.field {
                    self.field(f);
                }
                if let Some(c) = &agg.filter {
                    self.condition(c);
                }
            }
            Expr::Case(case) => {
                for when in &case.whens {
                    self.condition(&when.condition);
                }
            }
            Expr::Coalesce(operands) => operands.iter().for_each(|o| self.operand(o)),
            Expr::NullIf(a, b) => {
                self.operand(a);
                self.operand(b);
            }
            Expr::Math(m) => self.field(&m.field),
            Expr::Window(w) => self.window(w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;

    #[test]
    fn test_accepts_plain_identifiers() {
        for name in ["user_id", "_private", "a1", "Email", "x"] {
            assert!(check_identifier(IdentKind::Parameter, name).is_ok(), "{name}");
            assert!(check_identifier(IdentKind::Alias, name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_rejects_metacharacters() {
        for name in [
            "a;b", "a--", "a/*b", "b*/", "o'brien", "a\"b", "a`b", "a\\b", "a b", "x or y",
        ] {
            assert!(
                matches!(
                    check_identifier(IdentKind::Parameter, name),
                    Err(ValidationError::Denied { .. })
                ),
                "{name}"
            );
        }
    }

    #[test]
    fn test_rejects_statement_keywords_only_as_whole_names() {
        assert!(check_identifier(IdentKind::Alias, "DROP").is_err());
        assert!(check_identifier(IdentKind::Alias, "select").is_err());
        assert!(check_identifier(IdentKind::Alias, "dropped_at").is_ok());
        assert!(check_identifier(IdentKind::Alias, "updated").is_ok());
    }

    #[test]
    fn test_rejects_bad_syntax() {
        assert!(matches!(
            check_identifier(IdentKind::Parameter, "1abc"),
            Err(ValidationError::InvalidSyntax { .. })
        ));
        assert!(matches!(
            check_identifier(IdentKind::Parameter, "a-b"),
            Err(ValidationError::InvalidSyntax { .. })
        ));
        assert!(matches!(
            check_identifier(IdentKind::Parameter, ""),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_reserved_subquery_prefix() {
        assert!(matches!(
            check_identifier(IdentKind::Parameter, "sq1_term"),
            Err(ValidationError::ReservedPrefix { .. })
        ));
        assert!(check_identifier(IdentKind::Parameter, "sq_term").is_ok());
        assert!(check_identifier(IdentKind::Parameter, "square").is_ok());
        assert!(check_identifier(IdentKind::Alias, "sq1_total").is_ok());
    }

    #[test]
    fn test_did_you_mean() {
        let tables = ["users", "orders", "products"];
        assert_eq!(did_you_mean("usr", tables), Some("users".to_string()));
        assert_eq!(did_you_mean("ordrs", tables), Some("orders".to_string()));
        assert_eq!(did_you_mean("xyz", tables), None);
    }

    #[test]
    fn test_catalog_gates_tables_and_fields() {
        let mut registry = ModelRegistry::new();
        registry.register_table("users", &["id", "email"]);

        assert!(registry.validate(IdentKind::Table, "users").is_ok());
        assert!(registry.validate(IdentKind::Field, "email").is_ok());

        let err = registry.validate(IdentKind::Table, "user").unwrap_err();
        assert_eq!(err.to_string(), "Table 'user' not found. Did you mean 'users'?");

        // Table names bypass the syntactic denylist but never a missing entry.
        assert!(registry.validate(IdentKind::Table, "users; DROP").is_err());
    }

    #[test]
    fn test_registered_alias_bypasses_denylist() {
        let mut registry = ModelRegistry::new();
        registry.register_alias("select");
        assert!(registry.validate(IdentKind::Alias, "select").is_ok());
        assert!(registry.validate(IdentKind::Alias, "update").is_err());
    }

    #[test]
    fn test_loaded_aliases_resolve_against_catalog() {
        let mut registry = ModelRegistry::new();
        registry.register_table("users", &["id"]).register_alias("select");

        let load = |alias: &str| -> Query {
            let document = format!(
                r#"{{"operation": "select", "table": {{"name": "users"}},
                    "fields": [{{"expr": {{"field": {{"name": "id"}}}}, "alias": "{alias}"}}]}}"#
            );
            serde_json::from_str(&document).unwrap()
        };

        assert!(validate_query(&registry, &load("select")).is_ok());
        let errors = validate_query(&registry, &load("update")).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::Denied {
                kind: IdentKind::Alias,
                ..
            }
        ));

        let bad: Result<Query, _> = serde_json::from_str(
            r#"{"operation": "select", "table": {"name": "users"},
                "fields": [{"expr": {"field": {"name": "id"}}, "alias": "a\"b"}]}"#,
        );
        assert!(bad.is_err());
    }
}
