//! Response types for the order service API.

use serde::Serialize;

/// Response from the health endpoint.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub requests: u64,
    pub orders: usize,
    pub persistence: bool,
}
