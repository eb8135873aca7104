use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::GeoAlertError;
use crate::config::GeoAlertConfig;
use crate::models::{AirQualityQuery, EarthquakeQuery, PushMessage, WeatherQuery};
use crate::notify::FcmNotifier;
use crate::upstream::{OpenAqClient, OpenWeatherClient, UsgsClient};

/// Shared state behind every handler
pub struct AppState {
    pub config: GeoAlertConfig,
    pub usgs: UsgsClient,
    pub openaq: OpenAqClient,
    pub openweather: OpenWeatherClient,
    pub notifier: FcmNotifier,
    started: Instant,
}

impl AppState {
    pub fn new(config: GeoAlertConfig) -> crate::Result<Self> {
        Ok(Self {
            usgs: UsgsClient::new(&config)?,
            openaq: OpenAqClient::new(&config)?,
            openweather: OpenWeatherClient::new(&config)?,
            notifier: FcmNotifier::new(&config)?,
            config,
            started: Instant::now(),
        })
    }

    fn uptime_seconds(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

type ApiError = (StatusCode, Json<Value>);

/// Map service errors onto HTTP responses with a generic body.
fn error_response(err: &GeoAlertError) -> ApiError {
    let status = match err {
        GeoAlertError::Validation { .. } => StatusCode::BAD_REQUEST,
        GeoAlertError::RateLimited { .. } => StatusCode::SERVICE_UNAVAILABLE,
        GeoAlertError::Upstream { .. } | GeoAlertError::UpstreamAuth { .. } => {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    }

    (status, Json(json!({ "error": err.user_message() })))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct EarthquakeParams {
    pub lookback_hours: Option<u32>,
    pub min_magnitude: Option<f64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AirQualityParams {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub latitude: f64,
    pub longitude: f64,
    pub units: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestNotificationRequest {
    pub token: String,
    pub title: Option<String>,
    pub body: Option<String>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/earthquakes", get(get_earthquakes))
        .route("/air-quality", get(get_air_quality))
        .route("/weather", get(get_weather))
        .route("/notifications/test", post(send_test_notification))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "up",
        version: crate::VERSION,
        uptime_seconds: state.uptime_seconds(),
    })
}

async fn get_earthquakes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EarthquakeParams>,
) -> Result<Json<Value>, ApiError> {
    let defaults = &state.config.defaults;
    let query = EarthquakeQuery {
        lookback_hours: params.lookback_hours.unwrap_or(defaults.lookback_hours),
        min_magnitude: params.min_magnitude.unwrap_or(defaults.min_magnitude),
        limit: params.limit.unwrap_or(defaults.max_results),
    };

    let body = state
        .usgs
        .query(&query)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(body))
}

async fn get_air_quality(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AirQualityParams>,
) -> Result<Json<Value>, ApiError> {
    let defaults = &state.config.defaults;
    let query = AirQualityQuery {
        latitude: params.latitude,
        longitude: params.longitude,
        radius_meters: params.radius_meters.unwrap_or(defaults.radius_meters),
        limit: params.limit.unwrap_or(defaults.max_results),
    };

    let body = state
        .openaq
        .latest(&query)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(body))
}

async fn get_weather(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WeatherParams>,
) -> Result<Json<Value>, ApiError> {
    let query = WeatherQuery {
        latitude: params.latitude,
        longitude: params.longitude,
        units: params
            .units
            .unwrap_or_else(|| state.config.defaults.units.clone()),
    };

    let body = state
        .openweather
        .today(&query)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(body))
}

/// Fire a single test notification at a device token.
///
/// Delivery failures are logged and swallowed, so this always answers
/// 202 and only reports whether the send went through.
async fn send_test_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TestNotificationRequest>,
) -> (StatusCode, Json<Value>) {
    let message = PushMessage::new(
        request.token,
        request
            .title
            .unwrap_or_else(|| "GeoAlert test notification".to_string()),
        request
            .body
            .unwrap_or_else(|| "If you can read this, push delivery works.".to_string()),
    );

    let delivered = state.notifier.send_or_log(&message).await;
    (StatusCode::ACCEPTED, Json(json!({ "delivered": delivered })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_validation_is_bad_request() {
        let (status, _) = error_response(&GeoAlertError::validation("nope"));
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_response_upstream_is_bad_gateway() {
        let (status, Json(body)) = error_response(&GeoAlertError::upstream("USGS", "status 500"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        // Generic body only; upstream detail stays in the logs.
        assert!(!body["error"].as_str().unwrap().contains("500"));
    }

    #[test]
    fn test_error_response_auth_is_bad_gateway() {
        let (status, _) = error_response(&GeoAlertError::UpstreamAuth { service: "OpenAQ" });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_error_response_rate_limit_is_service_unavailable() {
        let (status, _) = error_response(&GeoAlertError::RateLimited { service: "OpenAQ" });
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_app_state_builds_from_default_config() {
        let state = AppState::new(GeoAlertConfig::default()).unwrap();
        assert_eq!(state.config.server.port, 8080);
    }
}
