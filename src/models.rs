//! Request models for the proxy endpoints and push delivery
//!
//! Each query type validates its ranges before any network call is made;
//! the response side stays untyped because the service returns upstream
//! bodies unmodified.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{GeoAlertError, Result};

/// Query window for the USGS earthquake catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarthquakeQuery {
    /// How far back from now to search, in hours
    pub lookback_hours: u32,
    /// Minimum event magnitude to include
    pub min_magnitude: f64,
    /// Maximum number of events to return
    pub limit: u32,
}

impl EarthquakeQuery {
    pub fn validate(&self) -> Result<()> {
        if self.lookback_hours == 0 || self.lookback_hours > 720 {
            return Err(GeoAlertError::validation(
                "lookback_hours must be between 1 and 720",
            ));
        }
        if !(-1.0..=10.0).contains(&self.min_magnitude) {
            return Err(GeoAlertError::validation(
                "min_magnitude must be between -1.0 and 10.0",
            ));
        }
        validate_limit(self.limit)
    }
}

/// Point-and-radius query for OpenAQ latest readings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQualityQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Search radius around the point, in meters
    pub radius_meters: u32,
    pub limit: u32,
}

impl AirQualityQuery {
    pub fn validate(&self) -> Result<()> {
        validate_coordinates(self.latitude, self.longitude)?;
        if self.radius_meters == 0 || self.radius_meters > 100_000 {
            return Err(GeoAlertError::validation(
                "radius_meters must be between 1 and 100000",
            ));
        }
        validate_limit(self.limit)
    }
}

/// Point query for today's OpenWeather conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Unit system: "metric", "imperial" or "standard"
    pub units: String,
}

impl WeatherQuery {
    pub fn validate(&self) -> Result<()> {
        validate_coordinates(self.latitude, self.longitude)?;

        let valid_units = ["metric", "imperial", "standard"];
        if !valid_units.contains(&self.units.as_str()) {
            return Err(GeoAlertError::validation(format!(
                "Invalid units '{}'. Must be one of: {}",
                self.units,
                valid_units.join(", ")
            )));
        }
        Ok(())
    }
}

/// A single push notification addressed to one device token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    /// Free-form key/value payload forwarded to the client app
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl PushMessage {
    #[must_use]
    pub fn new<S: Into<String>>(token: S, title: S, body: S) -> Self {
        Self {
            token: token.into(),
            title: title.into(),
            body: body.into(),
            data: Map::new(),
        }
    }

    #[must_use]
    pub fn with_data(mut self, key: &str, value: Value) -> Self {
        self.data.insert(key.to_string(), value);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(GeoAlertError::validation("Device token cannot be empty"));
        }
        Ok(())
    }
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GeoAlertError::validation(format!(
            "Latitude {latitude} is out of range [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(GeoAlertError::validation(format!(
            "Longitude {longitude} is out of range [-180, 180]"
        )));
    }
    Ok(())
}

fn validate_limit(limit: u32) -> Result<()> {
    if limit == 0 || limit > 1000 {
        return Err(GeoAlertError::validation(
            "limit must be between 1 and 1000",
        ));
    }
    Ok(())
}
