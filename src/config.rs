//! Render options and the `quarry.toml` configuration file.
//!
//! ```toml
//! dialect = "postgres"
//! max_subquery_depth = 3
//! placeholders = "named"
//! schema = "db/schema.qsl"
//! ```

use crate::transpiler::Dialect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default ceiling for nested subqueries.
pub const DEFAULT_MAX_SUBQUERY_DEPTH: usize = 3;

/// Placeholder spelling in rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `:name` (`@name` on SQL Server)
    #[default]
    Named,
    /// `$1`, `?1`, `@p1` in first-occurrence order.
    Numbered,
}

/// Knobs for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub dialect: Dialect,
    pub max_subquery_depth: usize,
    pub placeholders: PlaceholderStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            max_subquery_depth: DEFAULT_MAX_SUBQUERY_DEPTH,
            placeholders: PlaceholderStyle::default(),
        }
    }
}

impl RenderOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn max_subquery_depth(mut self, depth: usize) -> Self {
        self.max_subquery_depth = depth;
        self
    }

    pub fn placeholders(mut self, style: PlaceholderStyle) -> Self {
        self.placeholders = style;
        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Contents of `quarry.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub render: RenderOptions,
    /// Schema file used as the catalog.
    #[serde(default)]
    pub schema: Option<PathBuf>,
}

impl Config {
    pub const FILE_NAME: &'static str = "quarry.toml";

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        // Schema paths are relative to the config file.
        if let (Some(schema), Some(dir)) = (&config.schema, path.parent())
            && schema.is_relative()
        {
            config.schema = Some(dir.join(schema));
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// First existing file among `./quarry.toml` and
    /// `<config dir>/quarry/config.toml`.
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(Self::FILE_NAME);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("quarry").join("config.toml"))
            .filter(|p| p.is_file())
    }

    /// Load the discovered config, or defaults when none exists.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::discover() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.render.dialect, Dialect::Postgres);
        assert_eq!(config.render.max_subquery_depth, 3);
        assert_eq!(config.render.placeholders, PlaceholderStyle::Named);
        assert!(config.schema.is_none());
    }

    #[test]
    fn test_parse_config() {
        let config = Config::from_toml(
            r#"
            dialect = "sqlserver"
            max_subquery_depth = 5
            placeholders = "numbered"
            schema = "schema.qsl"
            "#,
        )
        .unwrap();
        assert_eq!(config.render.dialect, Dialect::SqlServer);
        assert_eq!(config.render.max_subquery_depth, 5);
        assert_eq!(config.render.placeholders, PlaceholderStyle::Numbered);
        assert_eq!(config.schema, Some(PathBuf::from("schema.qsl")));
    }

    #[test]
    fn test_unknown_dialect_is_an_error() {
        assert!(Config::from_toml("dialect = \"oracle\"").is_err());
    }
}
