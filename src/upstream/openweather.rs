//! OpenWeather One Call client ("today's weather")

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use super::{build_client, check_status};
use crate::config::GeoAlertConfig;
use crate::models::WeatherQuery;
use crate::{GeoAlertError, Result};

const SERVICE: &str = "OpenWeather";

/// Client for the OpenWeather API
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    /// Create a new client
    pub fn new(config: &GeoAlertConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.upstream.timeout_seconds)?,
            base_url: config
                .upstream
                .openweather_base_url
                .trim_end_matches('/')
                .to_string(),
            api_key: config.upstream.openweather_api_key.clone(),
        })
    }

    /// Fetch current conditions and the daily outlook for a point, unmodified.
    ///
    /// A missing API key is not an error here: the request goes out without
    /// `appid` and the upstream 401 surfaces through the usual mapping.
    #[tracing::instrument(skip(self))]
    pub async fn today(&self, query: &WeatherQuery) -> Result<Value> {
        query.validate()?;

        let url = self.today_url(query);
        // The key is part of the query string, so the URL itself stays out
        // of the logs.
        debug!(
            "OpenWeather request for {},{} ({})",
            query.latitude, query.longitude, query.units
        );

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

        info!("OpenWeather returned conditions for {},{}", query.latitude, query.longitude);

        Ok(body)
    }

    fn today_url(&self, query: &WeatherQuery) -> String {
        let mut url = format!(
            "{}/onecall?lat={}&lon={}&units={}&exclude=minutely,hourly",
            self.base_url, query.latitude, query.longitude, query.units
        );

        if let Some(api_key) = &self.api_key {
            url.push_str("&appid=");
            url.push_str(api_key);
        }

        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> WeatherQuery {
        WeatherQuery {
            latitude: 35.6895,
            longitude: 139.6917,
            units: "metric".to_string(),
        }
    }

    #[test]
    fn test_today_url_building_with_key() {
        let mut config = GeoAlertConfig::default();
        config.upstream.openweather_api_key = Some("ow_test_key".to_string());
        let client = OpenWeatherClient::new(&config).unwrap();

        assert_eq!(
            client.today_url(&query()),
            "https://api.openweathermap.org/data/3.0/onecall?lat=35.6895&lon=139.6917\
             &units=metric&exclude=minutely,hourly&appid=ow_test_key"
        );
    }

    #[test]
    fn test_today_url_building_without_key() {
        let client = OpenWeatherClient::new(&GeoAlertConfig::default()).unwrap();
        let url = client.today_url(&query());
        assert!(!url.contains("appid"));
    }

    #[tokio::test]
    async fn test_today_rejects_unknown_units_before_network() {
        let client = OpenWeatherClient::new(&GeoAlertConfig::default()).unwrap();
        let bad = WeatherQuery {
            units: "fahrenheit".to_string(),
            ..query()
        };
        assert!(matches!(
            client.today(&bad).await,
            Err(GeoAlertError::Validation { .. })
        ));
    }
}
