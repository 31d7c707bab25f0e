//! Validated identifiers.
//!
//! Tables and fields are admitted through a [`Catalog`]; parameters, output
//! aliases and JSON keys through the syntactic gate. The inner strings are
//! private so a value of these types is proof that the gate was passed.

use crate::validator::{Catalog, IdentKind, ValidationError, check_identifier, check_syntax};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single lowercase letter naming a table inside one query (`users u`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct TableAlias(char);

impl TableAlias {
    pub fn new(alias: char) -> Result<Self, ValidationError> {
        if alias.is_ascii_lowercase() {
            Ok(Self(alias))
        } else {
            Err(ValidationError::InvalidTableAlias {
                alias: alias.to_string(),
            })
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl TryFrom<char> for TableAlias {
    type Error = ValidationError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TableAlias> for char {
    fn from(alias: TableAlias) -> Self {
        alias.0
    }
}

impl fmt::Display for TableAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A table known to the catalog, optionally aliased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alias: Option<TableAlias>,
}

impl Table {
    /// Admit `name` if the catalog knows the table.
    pub fn new<C: Catalog + ?Sized>(catalog: &C, name: &str) -> Result<Self, ValidationError> {
        catalog.validate(IdentKind::Table, name)?;
        Ok(Self {
            name: name.to_string(),
            alias: None,
        })
    }

    /// Like [`Table::new`], panicking on an unknown table.
    #[track_caller]
    pub fn must<C: Catalog + ?Sized>(catalog: &C, name: &str) -> Self {
        match Self::new(catalog, name) {
            Ok(table) => table,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn aliased(mut self, alias: char) -> Result<Self, ValidationError> {
        self.alias = Some(TableAlias::new(alias)?);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<TableAlias> {
        self.alias
    }

    /// How fields of this table are qualified: by alias when set, else by name.
    pub fn reference(&self) -> Qualifier {
        match self.alias {
            Some(alias) => Qualifier::Alias(alias),
            None => Qualifier::Table(self.name.clone()),
        }
    }

    /// Admit a field and qualify it with this table.
    pub fn field<C: Catalog + ?Sized>(
        &self,
        catalog: &C,
        name: &str,
    ) -> Result<Field, ValidationError> {
        Ok(Field::new(catalog, name)?.qualified(self))
    }
}

/// Prefix of a qualified field reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    Table(String),
    Alias(TableAlias),
}

/// A column reference, optionally qualified and optionally drilling into JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    qualifier: Option<Qualifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    json: Option<JsonPath>,
}

impl Field {
    /// Admit `name` if the catalog knows the field.
    pub fn new<C: Catalog + ?Sized>(catalog: &C, name: &str) -> Result<Self, ValidationError> {
        catalog.validate(IdentKind::Field, name)?;
        Ok(Self {
            name: name.to_string(),
            qualifier: None,
            json: None,
        })
    }

    /// Like [`Field::new`], panicking on an unknown field.
    #[track_caller]
    pub fn must<C: Catalog + ?Sized>(catalog: &C, name: &str) -> Self {
        match Self::new(catalog, name) {
            Ok(field) => field,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn qualified(mut self, table: &Table) -> Self {
        self.qualifier = Some(table.reference());
        self
    }

    pub fn json(mut self, path: JsonPath) -> Self {
        self.json = Some(path);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    pub fn json_path(&self) -> Option<&JsonPath> {
        self.json.as_ref()
    }

    /// True for a bare column name (no qualifier, no JSON path).
    pub fn is_plain(&self) -> bool {
        self.qualifier.is_none() && self.json.is_none()
    }
}

/// Object key inside a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JsonKey(String);

impl JsonKey {
    pub fn new(key: &str) -> Result<Self, ValidationError> {
        check_identifier(IdentKind::JsonKey, key)?;
        Ok(Self(key.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for JsonKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        check_identifier(IdentKind::JsonKey, &value)?;
        Ok(Self(value))
    }
}

impl From<JsonKey> for String {
    fn from(key: JsonKey) -> Self {
        key.0
    }
}

/// One hop of a JSON path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonSegment {
    Key(JsonKey),
    Index(u32),
}

/// Path into a JSON document column.
///
/// Intermediate hops always yield JSON; [`JsonPath::as_text`] makes the last
/// hop extract text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPath {
    segments: Vec<JsonSegment>,
    #[serde(default)]
    as_text: bool,
}

impl JsonPath {
    /// Start a path at object key `key`.
    pub fn key(key: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            segments: vec![JsonSegment::Key(JsonKey::new(key)?)],
            as_text: false,
        })
    }

    /// Start a path at array element `index`.
    pub fn index(index: u32) -> Self {
        Self {
            segments: vec![JsonSegment::Index(index)],
            as_text: false,
        }
    }

    pub fn then_key(mut self, key: &str) -> Result<Self, ValidationError> {
        self.segments.push(JsonSegment::Key(JsonKey::new(key)?));
        Ok(self)
    }

    pub fn then_index(mut self, index: u32) -> Self {
        self.segments.push(JsonSegment::Index(index));
        self
    }

    pub fn as_text(mut self) -> Self {
        self.as_text = true;
        self
    }

    pub fn segments(&self) -> &[JsonSegment] {
        &self.segments
    }

    pub fn is_text(&self) -> bool {
        self.as_text
    }
}

/// A named placeholder. Carries no value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Param(String);

impl Param {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        check_identifier(IdentKind::Parameter, name)?;
        Ok(Self(name.to_string()))
    }

    /// Like [`Param::new`], panicking on a rejected name.
    #[track_caller]
    pub fn must(name: &str) -> Self {
        match Self::new(name) {
            Ok(param) => param,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Param {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        check_identifier(IdentKind::Parameter, &value)?;
        Ok(Self(value))
    }
}

impl From<Param> for String {
    fn from(param: Param) -> Self {
        param.0
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

/// Output alias for a projected expression (`AS "alias"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alias(String);

impl Alias {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        check_identifier(IdentKind::Alias, name)?;
        Ok(Self(name.to_string()))
    }

    /// Admit `name` when the catalog registered it, else fall back to the
    /// syntactic gate.
    pub fn with_catalog<C: Catalog + ?Sized>(
        catalog: &C,
        name: &str,
    ) -> Result<Self, ValidationError> {
        catalog.validate(IdentKind::Alias, name)?;
        Ok(Self(name.to_string()))
    }

    #[track_caller]
    pub fn must(name: &str) -> Self {
        match Self::new(name) {
            Ok(alias) => alias,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Loading only checks the character class; registered aliases and the
/// keyword denylist are resolved by `validate_query` against the catalog.
impl TryFrom<String> for Alias {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        check_syntax(IdentKind::Alias, &value)?;
        Ok(Self(value))
    }
}

impl From<Alias> for String {
    fn from(alias: Alias) -> Self {
        alias.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModelRegistry;

    fn registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry.register_table("users", &["id", "email", "profile"]);
        registry
    }

    #[test]
    fn test_table_requires_catalog_entry() {
        let registry = registry();
        assert!(Table::new(&registry, "users").is_ok());
        assert!(matches!(
            Table::new(&registry, "orders"),
            Err(ValidationError::TableNotFound { .. })
        ));
    }

    #[test]
    fn test_table_alias_is_single_lowercase_letter() {
        let registry = registry();
        let users = Table::must(&registry, "users").aliased('u').unwrap();
        assert_eq!(users.alias().map(TableAlias::as_char), Some('u'));
        assert!(Table::must(&registry, "users").aliased('U').is_err());
        assert!(TableAlias::new('1').is_err());
    }

    #[test]
    fn test_field_qualified_by_alias() {
        let registry = registry();
        let users = Table::must(&registry, "users").aliased('u').unwrap();
        let id = users.field(&registry, "id").unwrap();
        assert_eq!(id.qualifier(), Some(&Qualifier::Alias(TableAlias('u'))));
        assert!(!id.is_plain());
    }

    #[test]
    fn test_param_rejects_injection() {
        assert!(Param::new("user_id").is_ok());
        assert!(Param::new("id; DROP TABLE users").is_err());
        assert!(Param::new("x--").is_err());
    }

    #[test]
    fn test_param_deserialize_is_gated() {
        let ok: Result<Param, _> = serde_json::from_str("\"email\"");
        assert_eq!(ok.unwrap().name(), "email");
        let bad: Result<Param, _> = serde_json::from_str("\"a'b\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_json_path_keys_are_gated() {
        let path = JsonPath::key("address").unwrap().then_key("city").unwrap().as_text();
        assert_eq!(path.segments().len(), 2);
        assert!(path.is_text());
        assert!(JsonPath::key("a'b").is_err());
    }

    #[test]
    fn test_json_key_deserialize_is_gated() {
        let ok: Result<JsonPath, _> =
            serde_json::from_str(r#"{"segments": [{"key": "address"}, {"index": 0}]}"#);
        assert_eq!(ok.unwrap().segments()[0], JsonSegment::Key(JsonKey::new("address").unwrap()));

        let bad: Result<JsonPath, _> =
            serde_json::from_str(r#"{"segments": [{"key": "a\\' OR 1=1 -- "}]}"#);
        assert!(bad.is_err());
    }
}
