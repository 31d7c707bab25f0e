//! Schema catalog.
//!
//! A schema can be loaded from JSON, TOML, or the `.qsl` text format:
//! ```text
//! -- accounts
//! table users (
//!   id uuid primary_key,
//!   email text not null unique,
//!   org_id uuid references orgs(id),
//!   credits int default 0
//! )
//! ```

use crate::validator::Catalog;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_while1},
    character::complete::{char, multispace1, not_line_ending, space1},
    combinator::{map, opt, recognize},
    multi::{many0, separated_list0},
    sequence::{delimited, preceded},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML schema: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Schema parse error: {0}")]
    Parse(String),
}

/// Schema containing all table definitions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Schema {
    #[serde(default)]
    pub tables: Vec<TableDef>,
    /// Output aliases admitted without the syntactic check.
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDef {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub default_value: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDef {
    pub fn new(name: &str, typ: &str) -> Self {
        Self {
            name: name.to_string(),
            typ: typ.to_string(),
            nullable: true,
            primary_key: false,
            unique: false,
            references: None,
            default_value: None,
        }
    }
}

impl Schema {
    /// Parse a schema from `.qsl` text.
    pub fn parse(input: &str) -> Result<Self, SchemaError> {
        match parse_schema(input) {
            Ok(("", schema)) => Ok(schema),
            Ok((remaining, _)) => Err(SchemaError::Parse(format!(
                "unexpected content: '{}'",
                remaining.lines().next().unwrap_or_default().trim()
            ))),
            Err(e) => Err(SchemaError::Parse(e.to_string())),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_toml(text: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a schema file. `.json` and `.toml` are decoded with serde,
    /// anything else is parsed as `.qsl` text.
    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let schema = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content)?,
            Some("toml") => Self::from_toml(&content)?,
            _ => Self::parse(&content)?,
        };
        tracing::info!(
            "Loaded {} tables from {}",
            schema.tables.len(),
            path.display()
        );
        Ok(schema)
    }

    /// Find a table by exact name.
    pub fn find_table(&self, name: &str) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.name == name)
    }
}

impl TableDef {
    /// Find a column by exact name.
    pub fn find_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl Catalog for Schema {
    fn table_exists(&self, name: &str) -> bool {
        self.find_table(name).is_some()
    }

    fn field_exists(&self, name: &str) -> bool {
        self.tables.iter().any(|t| t.find_column(name).is_some())
    }

    fn alias_registered(&self, name: &str) -> bool {
        self.aliases.iter().any(|a| a == name)
    }

    fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    fn field_names(&self) -> Vec<&str> {
        let unique: BTreeSet<&str> = self
            .tables
            .iter()
            .flat_map(|t| t.columns.iter().map(|c| c.name.as_str()))
            .collect();
        unique.into_iter().collect()
    }
}

// =============================================================================
// Parsing Combinators
// =============================================================================

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

/// Skip whitespace and `--` comments.
fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    let (input, _) = many0(alt((
        map(multispace1, |_| ()),
        map((tag("--"), not_line_ending), |_| ()),
    )))
    .parse(input)?;
    Ok((input, ()))
}

/// `varchar(255)`, `numeric(10, 2)`, `text[]`
fn column_type(input: &str) -> IResult<&str, &str> {
    recognize((
        identifier,
        opt(delimited(char('('), take_while1(|c: char| c != ')'), char(')'))),
        opt(tag("[]")),
    ))
    .parse(input)
}

enum Constraint {
    PrimaryKey,
    NotNull,
    Unique,
    References(String),
    Default(String),
}

fn constraint(input: &str) -> IResult<&str, Constraint> {
    alt((
        map(
            alt((
                tag_no_case("primary_key"),
                recognize((tag_no_case("primary"), space1, tag_no_case("key"))),
            )),
            |_| Constraint::PrimaryKey,
        ),
        map(
            alt((
                tag_no_case("not_null"),
                recognize((tag_no_case("not"), space1, tag_no_case("null"))),
            )),
            |_| Constraint::NotNull,
        ),
        map(tag_no_case("unique"), |_| Constraint::Unique),
        map(
            preceded(
                (tag_no_case("references"), space1),
                recognize((
                    identifier,
                    opt(delimited(char('('), identifier, char(')'))),
                )),
            ),
            |r: &str| Constraint::References(r.to_string()),
        ),
        map(
            preceded(
                (tag_no_case("default"), space1),
                take_while1(|c: char| !c.is_whitespace() && c != ',' && c != ')'),
            ),
            |d: &str| Constraint::Default(d.to_string()),
        ),
    ))
    .parse(input)
}

fn parse_column(input: &str) -> IResult<&str, ColumnDef> {
    let (input, _) = ws_and_comments(input)?;
    let (input, name) = identifier(input)?;
    let (input, _) = space1(input)?;
    let (input, typ) = column_type(input)?;
    let (input, constraints) = many0(preceded(space1, constraint)).parse(input)?;

    let mut col = ColumnDef::new(name, &typ.to_lowercase());
    for c in constraints {
        match c {
            Constraint::PrimaryKey => {
                col.primary_key = true;
                col.nullable = false;
            }
            Constraint::NotNull => col.nullable = false,
            Constraint::Unique => col.unique = true,
            Constraint::References(r) => col.references = Some(r),
            Constraint::Default(d) => col.default_value = Some(d),
        }
    }
    Ok((input, col))
}

fn parse_column_list(input: &str) -> IResult<&str, Vec<ColumnDef>> {
    let (input, _) = ws_and_comments(input)?;
    let (input, _) = char('(').parse(input)?;
    let (input, columns) =
        separated_list0(preceded(ws_and_comments, char(',')), parse_column).parse(input)?;
    let (input, _) = ws_and_comments(input)?;
    let (input, _) = char(')').parse(input)?;
    Ok((input, columns))
}

fn parse_table(input: &str) -> IResult<&str, TableDef> {
    let (input, _) = ws_and_comments(input)?;
    let (input, _) = tag_no_case("table").parse(input)?;
    let (input, _) = multispace1(input)?;
    let (input, name) = identifier(input)?;
    let (input, columns) = parse_column_list(input)?;

    Ok((
        input,
        TableDef {
            name: name.to_string(),
            columns,
        },
    ))
}

fn parse_schema(input: &str) -> IResult<&str, Schema> {
    let (input, tables) = many0(parse_table).parse(input)?;
    let (input, _) = ws_and_comments(input)?;
    Ok((
        input,
        Schema {
            tables,
            aliases: Vec::new(),
        },
    ))
}
