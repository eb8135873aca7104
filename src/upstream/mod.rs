//! Clients for the upstream hazard and conditions APIs
//!
//! Every client follows the same contract: build the query URL, perform a
//! single request, map non-success statuses onto the error taxonomy, and
//! hand the response body back unmodified.

pub mod openaq;
pub mod openweather;
pub mod usgs;

// Re-export commonly used types from submodules
pub use openaq::OpenAqClient;
pub use openweather::OpenWeatherClient;
pub use usgs::UsgsClient;

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::warn;

use crate::{GeoAlertError, Result};

const USER_AGENT: &str = concat!("GeoAlert/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client builder for all upstream integrations
pub(crate) fn build_client(timeout_seconds: u32) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| GeoAlertError::config(format!("Failed to create HTTP client: {e}")))
}

/// Map a non-success upstream response onto the error taxonomy.
///
/// The upstream body is logged (truncated) but never forwarded to callers.
pub(crate) async fn check_status(service: &'static str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let preview: String = body.chars().take(256).collect();
    warn!("{} returned {}: {}", service, status, preview);

    match status.as_u16() {
        401 | 403 => Err(GeoAlertError::UpstreamAuth { service }),
        429 => Err(GeoAlertError::RateLimited { service }),
        _ => Err(GeoAlertError::upstream(
            service,
            format!("unexpected status {status}"),
        )),
    }
}
