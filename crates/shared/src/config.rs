//! Application configuration management.

use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Settlement configuration.
    #[serde(default)]
    pub settlement: SettlementConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settlement configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Currency reported when a computation has no records to take one from.
    #[serde(default = "default_currency")]
    pub default_currency: Currency,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
        }
    }
}

fn default_currency() -> Currency {
    Currency::Usd
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON log lines instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "divvy=info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("DIVVY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.settlement.default_currency, Currency::Usd);
        assert_eq!(config.logging.filter, "divvy=info");
        assert!(!config.logging.json);
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        temp_env::with_vars_unset(
            [
                "DIVVY_SETTLEMENT__DEFAULT_CURRENCY",
                "DIVVY_LOGGING__FILTER",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.settlement.default_currency, Currency::Usd);
                assert_eq!(config.logging.filter, "divvy=info");
            },
        );
    }

    #[test]
    fn test_load_reads_environment() {
        temp_env::with_vars(
            [
                ("DIVVY_SETTLEMENT__DEFAULT_CURRENCY", Some("EUR")),
                ("DIVVY_LOGGING__FILTER", Some("divvy=debug")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.settlement.default_currency, Currency::Eur);
                assert_eq!(config.logging.filter, "divvy=debug");
            },
        );
    }
}
