//! Configuration for the clinic tools.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SADHAK_DATABASE_URL` | (none) | Database URL (`sqlite://clinic.db`, `:memory:`) |
//! | `SADHAK_PROJECT_ID` | (none) | Project identifier namespacing the clinic's data |
//! | `SADHAK_MAX_CONNECTIONS` | 10 | Connection pool size |
//! | `SADHAK_BUSY_TIMEOUT_MS` | 5000 | SQLite busy timeout |
//! | `SADHAK_LOG_LEVEL` | info | Log level |
//! | `SADHAK_DEFAULT_PAGE_SIZE` | 20 | Page size when none is requested |
//! | `SADHAK_MAX_PAGE_SIZE` | 1000 | Largest page size accepted |
//!
//! The database URL and project id are not validated here: when either is
//! missing the store connection is left unconfigured and every data
//! operation reports it.

use clap::Args;

use sadhak_persistence::StoreConfig;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Configuration shared by the clinic tools.
#[derive(Debug, Clone, Args)]
pub struct ClinicConfig {
    /// Database URL.
    #[arg(long, env = "SADHAK_DATABASE_URL", global = true)]
    pub database_url: Option<String>,

    /// Project identifier namespacing this clinic's documents.
    #[arg(long, env = "SADHAK_PROJECT_ID", global = true)]
    pub project_id: Option<String>,

    /// Maximum number of pooled connections.
    #[arg(long, env = "SADHAK_MAX_CONNECTIONS", default_value = "10", global = true)]
    pub max_connections: u32,

    /// SQLite busy timeout in milliseconds.
    #[arg(long, env = "SADHAK_BUSY_TIMEOUT_MS", default_value = "5000", global = true)]
    pub busy_timeout_ms: u32,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "SADHAK_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Page size used when a listing does not ask for one.
    #[arg(long, env = "SADHAK_DEFAULT_PAGE_SIZE", default_value = "20", global = true)]
    pub default_page_size: usize,

    /// Largest accepted page size.
    #[arg(long, env = "SADHAK_MAX_PAGE_SIZE", default_value = "1000", global = true)]
    pub max_page_size: usize,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            project_id: None,
            max_connections: 10,
            busy_timeout_ms: 5000,
            log_level: "info".to_string(),
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl ClinicConfig {
    /// Builds the store configuration.
    pub fn to_store_config(&self) -> StoreConfig {
        #[allow(unused_mut)]
        let mut config = StoreConfig {
            database_url: self.database_url.clone(),
            project_id: self.project_id.clone(),
            ..Default::default()
        };

        #[cfg(feature = "sqlite")]
        {
            config.sqlite.max_connections = self.max_connections;
            config.sqlite.min_connections = config.sqlite.min_connections.min(self.max_connections);
            config.sqlite.busy_timeout_ms = self.busy_timeout_ms;
        }

        config
    }

    /// Returns the page size to use for a listing.
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            errors.push(format!(
                "Log level must be one of {}, got {}",
                LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        if self.max_connections == 0 {
            errors.push("Max connections cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if let Some(project_id) = &self.project_id {
            if project_id.chars().any(char::is_whitespace) {
                errors.push("Project id cannot contain whitespace".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing: a private in-memory
    /// database and debug logging.
    pub fn for_testing() -> Self {
        Self {
            database_url: Some(":memory:".to_string()),
            project_id: Some("sadhak-test".to_string()),
            log_level: "debug".to_string(),
            default_page_size: 10,
            max_page_size: 100,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClinicConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
        assert!(!config.to_store_config().is_complete());
    }

    #[test]
    fn test_for_testing_is_complete() {
        let store = ClinicConfig::for_testing().to_store_config();
        assert!(store.is_complete());
        assert!(store.summary().in_memory);
        assert_eq!(store.project_id.as_deref(), Some("sadhak-test"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_store_tuning_is_carried() {
        let config = ClinicConfig {
            max_connections: 4,
            busy_timeout_ms: 250,
            ..ClinicConfig::for_testing()
        };
        let store = config.to_store_config();
        assert_eq!(store.sqlite.max_connections, 4);
        assert_eq!(store.sqlite.busy_timeout_ms, 250);
        assert!(store.validate().is_ok());
    }

    #[test]
    fn test_page_size() {
        let config = ClinicConfig::for_testing();
        assert_eq!(config.page_size(None), 10);
        assert_eq!(config.page_size(Some(25)), 25);
        assert_eq!(config.page_size(Some(5000)), 100);
        assert_eq!(config.page_size(Some(0)), 1);
    }

    #[test]
    fn test_validate_collects_every_error() {
        let config = ClinicConfig {
            log_level: "loud".to_string(),
            max_connections: 0,
            default_page_size: 200,
            max_page_size: 100,
            project_id: Some("my clinic".to_string()),
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.contains("Log level")));
        assert!(errors.iter().any(|e| e.contains("whitespace")));
    }
}
