//! Server configuration read from environment variables.

use taxi_map_source::registry::{DEFAULT_DATASET_ID, find_dataset};
use taxi_map_source::socrata::SocrataConfig;

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;
/// Page size used when a request does not specify `limit`.
pub const DEFAULT_PAGE_SIZE: u64 = 100;
/// Largest accepted `limit`.
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 1000;

/// Errors raised while reading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be parsed.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Environment variable name.
        key: &'static str,
        /// The offending value.
        value: String,
    },

    /// The configured dataset is not registered.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
}

/// Bounds applied to the `limit` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    /// Page size when `limit` is absent.
    pub default: u64,
    /// Largest page size served.
    pub max: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default: DEFAULT_PAGE_SIZE,
            max: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl PageLimits {
    /// Resolves a requested page size into `1..=max`.
    #[must_use]
    pub fn resolve(&self, requested: Option<u64>) -> u64 {
        requested.unwrap_or(self.default).clamp(1, self.max.max(1))
    }
}

/// Complete server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to listen on (`PORT`).
    pub port: u16,
    /// Upstream configuration (`TRIPS_DATASET`, `SOCRATA_API_URL`,
    /// `SOCRATA_APP_TOKEN`, `TRIPS_COUNT_STRATEGY`).
    pub socrata: SocrataConfig,
    /// Page size bounds (`TRIPS_DEFAULT_LIMIT`, `TRIPS_MAX_LIMIT`).
    pub limits: PageLimits,
}

impl ServerConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable holds an unparseable value or
    /// names an unknown dataset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which returns the value of
    /// a variable or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable holds an unparseable value or
    /// names an unknown dataset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let port = parse_var(&var, "PORT")?.unwrap_or(DEFAULT_PORT);

        let dataset_id = var("TRIPS_DATASET").unwrap_or_else(|| DEFAULT_DATASET_ID.to_string());
        let dataset =
            find_dataset(&dataset_id).ok_or_else(|| ConfigError::UnknownDataset(dataset_id))?;

        let count_strategy = parse_var(&var, "TRIPS_COUNT_STRATEGY")?.unwrap_or_default();

        let defaults = PageLimits::default();
        let limits = PageLimits {
            default: parse_var(&var, "TRIPS_DEFAULT_LIMIT")?.unwrap_or(defaults.default),
            max: parse_var(&var, "TRIPS_MAX_LIMIT")?.unwrap_or(defaults.max),
        };

        Ok(Self {
            bind_addr,
            port,
            socrata: SocrataConfig {
                dataset,
                api_url_override: var("SOCRATA_API_URL"),
                app_token: var("SOCRATA_APP_TOKEN"),
                count_strategy,
            },
            limits,
        })
    }
}

fn parse_var<T, F>(var: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use taxi_map_source_models::CountStrategy;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.limits, PageLimits::default());
        assert_eq!(config.socrata.count_strategy, CountStrategy::Aggregate);
        assert_eq!(config.socrata.dataset.id, DEFAULT_DATASET_ID);
        assert!(config.socrata.app_token.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("SOCRATA_API_URL", "http://localhost/resource/x.json"),
            ("SOCRATA_APP_TOKEN", "secret"),
            ("TRIPS_COUNT_STRATEGY", "full_scan"),
            ("TRIPS_DEFAULT_LIMIT", "10"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.socrata.count_strategy, CountStrategy::FullScan);
        assert_eq!(config.socrata.app_token.as_deref(), Some("secret"));
        assert_eq!(config.limits.default, 10);
        assert_eq!(
            config.socrata.api_url_override.as_deref(),
            Some("http://localhost/resource/x.json")
        );
    }

    #[test]
    fn rejects_bad_values() {
        let err = ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
        let err = ServerConfig::from_lookup(lookup(&[("TRIPS_DATASET", "nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDataset(_)));
    }

    #[test]
    fn limits_clamp_requested_page_size() {
        let limits = PageLimits::default();
        assert_eq!(limits.resolve(None), DEFAULT_PAGE_SIZE);
        assert_eq!(limits.resolve(Some(0)), 1);
        assert_eq!(limits.resolve(Some(10)), 10);
        assert_eq!(limits.resolve(Some(5000)), DEFAULT_MAX_PAGE_SIZE);
    }
}
