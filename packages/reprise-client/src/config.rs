//! Client configuration.

use serde::Deserialize;
use std::time::Duration;

/// Configuration for the negotiation client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Order service root, without the `/api` suffix.
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    #[serde(default = "defaults::request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "defaults::connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Quiet period after the last keystroke before a location search fires.
    #[serde(default = "defaults::search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Shorter queries clear the results instead of searching.
    #[serde(default = "defaults::min_search_chars")]
    pub min_search_chars: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            request_timeout_secs: defaults::request_timeout_secs(),
            connect_timeout_secs: defaults::connect_timeout_secs(),
            search_debounce_ms: defaults::search_debounce_ms(),
            min_search_chars: defaults::min_search_chars(),
        }
    }
}

impl ClientConfig {
    /// Load `reprise-client.toml` (optional) overlaid with `REPRISE_CLIENT_*`
    /// variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("reprise-client").required(false))
            .add_source(config::Environment::with_prefix("REPRISE_CLIENT"))
            .build()?
            .try_deserialize()
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

mod defaults {
    pub fn base_url() -> String {
        "http://localhost:3050".into()
    }

    pub fn request_timeout_secs() -> u64 {
        15
    }

    pub fn connect_timeout_secs() -> u64 {
        5
    }

    pub fn search_debounce_ms() -> u64 {
        500
    }

    pub fn min_search_chars() -> usize {
        3
    }
}
