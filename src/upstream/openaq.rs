//! OpenAQ air-quality client (v3 locations endpoint)

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::{build_client, check_status};
use crate::config::GeoAlertConfig;
use crate::models::AirQualityQuery;
use crate::{GeoAlertError, Result};

const SERVICE: &str = "OpenAQ";

/// Client for the OpenAQ measurement API
pub struct OpenAqClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAqClient {
    /// Create a new client
    pub fn new(config: &GeoAlertConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.upstream.timeout_seconds)?,
            base_url: config
                .upstream
                .openaq_base_url
                .trim_end_matches('/')
                .to_string(),
            api_key: config.upstream.openaq_api_key.clone(),
        })
    }

    /// Fetch the latest readings near a point, unmodified.
    #[tracing::instrument(skip(self))]
    pub async fn latest(&self, query: &AirQualityQuery) -> Result<Value> {
        query.validate()?;

        let url = self.latest_url(query);
        debug!("OpenAQ request URL: {}", url);

        let mut request = self.client.get(&url);
        if let Some(api_key) = &self.api_key {
            request = request.header("X-API-Key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GeoAlertError::upstream(SERVICE, format!("request failed: {e}")))?;
        let response = check_status(SERVICE, response).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| GeoAlertError::upstream(SERVICE, format!("invalid JSON body: {e}")))?;

        let result_count = body["results"].as_array().map_or(0, Vec::len);
        info!("OpenAQ returned {} locations", result_count);

        Ok(body)
    }

    fn latest_url(&self, query: &AirQualityQuery) -> String {
        format!(
            "{}/locations?coordinates={},{}&radius={}&limit={}",
            self.base_url, query.latitude, query.longitude, query.radius_meters, query.limit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_url_building() {
        let client = OpenAqClient::new(&GeoAlertConfig::default()).unwrap();
        let query = AirQualityQuery {
            latitude: 35.6895,
            longitude: 139.6917,
            radius_meters: 25_000,
            limit: 100,
        };

        assert_eq!(
            client.latest_url(&query),
            "https://api.openaq.org/v3/locations?coordinates=35.6895,139.6917&radius=25000&limit=100"
        );
    }

    #[test]
    fn test_client_carries_configured_key() {
        let mut config = GeoAlertConfig::default();
        config.upstream.openaq_api_key = Some("openaq_test_key".to_string());
        let client = OpenAqClient::new(&config).unwrap();
        assert_eq!(client.api_key.as_deref(), Some("openaq_test_key"));
    }

    #[tokio::test]
    async fn test_latest_rejects_bad_coordinates_before_network() {
        let client = OpenAqClient::new(&GeoAlertConfig::default()).unwrap();
        let query = AirQualityQuery {
            latitude: 95.0,
            longitude: 0.0,
            radius_meters: 25_000,
            limit: 100,
        };
        assert!(matches!(
            client.latest(&query).await,
            Err(GeoAlertError::Validation { .. })
        ));
    }
}
