//! Store configuration.
//!
//! A [`StoreConfig`] names the database to open and the project whose
//! documents this process works with. Both are required; when either is
//! missing the access layer is still constructed, but unconfigured (see
//! [`StoreConnection::from_config`](crate::core::StoreConnection::from_config)).

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[cfg(feature = "sqlite")]
use crate::backends::sqlite::SqliteStoreConfig;

/// Where the document database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A private in-memory database, gone when the process exits.
    Memory,
    /// A database file.
    File(PathBuf),
}

impl DatabaseLocation {
    /// Parses a database URL.
    ///
    /// Accepted forms: `:memory:`, `sqlite::memory:`, `sqlite://<path>`,
    /// `sqlite:<path>` and a bare path.
    pub fn parse(url: &str) -> Self {
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .unwrap_or(url);
        if rest == ":memory:" {
            DatabaseLocation::Memory
        } else {
            DatabaseLocation::File(PathBuf::from(rest))
        }
    }
}

impl fmt::Display for DatabaseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseLocation::Memory => f.write_str(":memory:"),
            DatabaseLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Configuration of the document store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database URL (required).
    #[serde(default)]
    pub database_url: Option<String>,

    /// Project identifier namespacing this clinic's documents (required).
    #[serde(default)]
    pub project_id: Option<String>,

    /// Backend tuning.
    #[cfg(feature = "sqlite")]
    #[serde(flatten)]
    pub sqlite: SqliteStoreConfig,
}

/// Names of the required configuration keys.
pub const REQUIRED_KEYS: [&str; 2] = ["database_url", "project_id"];

impl StoreConfig {
    /// Creates a complete configuration with default tuning.
    pub fn new(database_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            project_id: Some(project_id.into()),
            ..Default::default()
        }
    }

    /// Configuration for a private in-memory store.
    pub fn in_memory(project_id: impl Into<String>) -> Self {
        Self::new(":memory:", project_id)
    }

    /// Returns the required keys that are absent or blank.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        let mut missing = Vec::new();
        if !present(&self.database_url) {
            missing.push(REQUIRED_KEYS[0]);
        }
        if !present(&self.project_id) {
            missing.push(REQUIRED_KEYS[1]);
        }
        missing
    }

    /// Returns true if every required key is set.
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Parsed database location, if a URL is set.
    pub fn location(&self) -> Option<DatabaseLocation> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(DatabaseLocation::parse)
    }

    /// Validates the configuration.
    ///
    /// Returns every problem found, not only the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors: Vec<String> = self
            .missing_required()
            .into_iter()
            .map(|key| format!("{key} is required"))
            .collect();

        if let Some(project_id) = &self.project_id {
            if project_id.chars().any(char::is_whitespace) {
                errors.push("project_id must not contain whitespace".to_string());
            }
        }

        #[cfg(feature = "sqlite")]
        {
            if self.sqlite.max_connections == 0 {
                errors.push("max_connections must be greater than 0".to_string());
            }
            if self.sqlite.min_connections > self.sqlite.max_connections {
                errors.push("min_connections must not exceed max_connections".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reports the configuration without revealing values that may be
    /// sensitive.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            database_url_set: self.location().is_some(),
            project_id: self.project_id.clone().filter(|p| !p.trim().is_empty()),
            in_memory: matches!(self.location(), Some(DatabaseLocation::Memory)),
            missing: self.missing_required(),
        }
    }
}

/// Diagnostic view of a [`StoreConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    /// Whether a database URL is set.
    pub database_url_set: bool,
    /// The project identifier, if set.
    pub project_id: Option<String>,
    /// Whether the database is in-memory.
    pub in_memory: bool,
    /// Required keys that are missing.
    pub missing: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_parse() {
        assert_eq!(DatabaseLocation::parse(":memory:"), DatabaseLocation::Memory);
        assert_eq!(DatabaseLocation::parse("sqlite::memory:"), DatabaseLocation::Memory);
        assert_eq!(
            DatabaseLocation::parse("sqlite:///var/lib/sadhak.db"),
            DatabaseLocation::File(PathBuf::from("/var/lib/sadhak.db"))
        );
        assert_eq!(
            DatabaseLocation::parse("clinic.db"),
            DatabaseLocation::File(PathBuf::from("clinic.db"))
        );
    }

    #[test]
    fn test_missing_required() {
        assert_eq!(
            StoreConfig::default().missing_required(),
            vec!["database_url", "project_id"]
        );

        let config = StoreConfig {
            database_url: Some("clinic.db".to_string()),
            project_id: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(config.missing_required(), vec!["project_id"]);
        assert!(StoreConfig::in_memory("sadhak").is_complete());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = StoreConfig::default();
        config.sqlite.max_connections = 0;
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(StoreConfig::in_memory("sadhak").validate().is_ok());
    }

    #[test]
    fn test_summary_hides_url() {
        let summary = StoreConfig::new("/secret/path.db", "sadhak").summary();
        assert!(summary.database_url_set);
        assert!(!summary.in_memory);
        assert!(summary.missing.is_empty());
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"database_url": ":memory:", "project_id": "sadhak"}"#).unwrap();
        assert_eq!(config.sqlite.max_connections, 10);
        assert!(config.sqlite.enable_wal);
    }
}
