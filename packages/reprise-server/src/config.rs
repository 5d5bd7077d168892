//! Service configuration.

use serde::Deserialize;

/// Configuration for the reprise order service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    /// JSON snapshot of the catalogue (users, offers, addresses, orders).
    /// Empty disables persistence.
    #[serde(default = "defaults::data_path")]
    pub data_path: String,

    /// Seconds between background snapshot flushes. 0 flushes only on shutdown.
    #[serde(default = "defaults::snapshot_interval_secs")]
    pub snapshot_interval_secs: u64,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound for `limit` on order listings.
    #[serde(default = "defaults::max_page_limit")]
    pub max_page_limit: u32,

    #[serde(default = "defaults::search_result_limit")]
    pub search_result_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: defaults::bind_address(),
            data_path: defaults::data_path(),
            snapshot_interval_secs: defaults::snapshot_interval_secs(),
            request_timeout_secs: defaults::request_timeout_secs(),
            max_page_limit: defaults::max_page_limit(),
            search_result_limit: defaults::search_result_limit(),
        }
    }
}

impl Config {
    /// Load `reprise.toml` (optional) overlaid with `REPRISE_*` variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("reprise").required(false))
            .add_source(config::Environment::with_prefix("REPRISE"))
            .build()?
            .try_deserialize()
    }

    pub fn persistence_enabled(&self) -> bool {
        !self.data_path.trim().is_empty()
    }
}

mod defaults {
    pub fn bind_address() -> String {
        "0.0.0.0:3050".into()
    }

    pub fn data_path() -> String {
        "./data/reprise.json".into()
    }

    pub fn snapshot_interval_secs() -> u64 {
        30
    }

    pub fn request_timeout_secs() -> u64 {
        15
    }

    pub fn max_page_limit() -> u32 {
        50
    }

    pub fn search_result_limit() -> usize {
        20
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_yields_defaults() {
        let config: Config = config::Config::builder()
            .build()
            .and_then(|c| c.try_deserialize())
            .unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3050");
        assert_eq!(config.max_page_limit, 50);
        assert!(config.persistence_enabled());
    }

    #[test]
    fn blank_data_path_disables_persistence() {
        let config = Config {
            data_path: "  ".into(),
            ..Config::default()
        };
        assert!(!config.persistence_enabled());
    }
}
