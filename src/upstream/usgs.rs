//! USGS earthquake catalog client (fdsnws event service)

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::{build_client, check_status};
use crate::config::GeoAlertConfig;
use crate::models::EarthquakeQuery;
use crate::{GeoAlertError, Result};

const SERVICE: &str = "USGS";

/// Client for the USGS earthquake catalog
pub struct UsgsClient {
    client: Client,
    base_url: String,
}

impl UsgsClient {
    /// Create a new client
    pub fn new(config: &GeoAlertConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.upstream.timeout_seconds)?,
            base_url: config
                .upstream
                .usgs_base_url
                .trim_end_matches('/')
                .to_string(),
        })
    }

    /// Fetch recent events above a magnitude threshold as raw GeoJSON.
    #[tracing::instrument(skip(self))]
    pub async fn query(&self, query: &EarthquakeQuery) -> Result<Value> {
        query.validate()?;

        let url = self.query_url(query, Utc::now());
        debug!("USGS request URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GeoAlertError::upstream(SERVICE, format!("request failed: {e}")))?;
        let response = check_status(SERVICE, response).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| GeoAlertError::upstream(SERVICE, format!("invalid JSON body: {e}")))?;

        let feature_count = body["features"].as_array().map_or(0, Vec::len);
        info!("USGS returned {} events", feature_count);

        Ok(body)
    }

    fn query_url(&self, query: &EarthquakeQuery, now: DateTime<Utc>) -> String {
        let starttime = (now - Duration::hours(i64::from(query.lookback_hours)))
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        format!(
            "{}/query?format=geojson&starttime={}&minmagnitude={}&orderby=time&limit={}",
            self.base_url, starttime, query.min_magnitude, query.limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_client() -> UsgsClient {
        UsgsClient::new(&GeoAlertConfig::default()).unwrap()
    }

    #[test]
    fn test_query_url_building() {
        let client = test_client();
        let query = EarthquakeQuery {
            lookback_hours: 24,
            min_magnitude: 4.5,
            limit: 100,
        };
        let now = Utc.with_ymd_and_hms(2026, 8, 2, 12, 0, 0).unwrap();

        let url = client.query_url(&query, now);
        assert_eq!(
            url,
            "https://earthquake.usgs.gov/fdsnws/event/1/query?format=geojson\
             &starttime=2026-08-01T12:00:00Z&minmagnitude=4.5&orderby=time&limit=100"
        );
    }

    #[test]
    fn test_query_url_strips_trailing_slash() {
        let mut config = GeoAlertConfig::default();
        config.upstream.usgs_base_url = "https://example.com/fdsnws/event/1/".to_string();
        let client = UsgsClient::new(&config).unwrap();

        let query = EarthquakeQuery {
            lookback_hours: 1,
            min_magnitude: 2.0,
            limit: 10,
        };
        let url = client.query_url(&query, Utc::now());
        assert!(url.starts_with("https://example.com/fdsnws/event/1/query?"));
    }

    #[tokio::test]
    async fn test_query_rejects_invalid_window_before_network() {
        let client = test_client();
        let query = EarthquakeQuery {
            lookback_hours: 0,
            min_magnitude: 4.5,
            limit: 100,
        };
        // Fails validation without touching the network.
        assert!(matches!(
            client.query(&query).await,
            Err(GeoAlertError::Validation { .. })
        ));
    }
}
