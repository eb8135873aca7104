//! GeoAlert - earthquake, weather and air-quality notification backend
//!
//! This library provides a small JSON API over public hazard and conditions
//! feeds (USGS earthquake catalog, OpenAQ, OpenWeather) and delivers push
//! notifications through Firebase Cloud Messaging.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod upstream;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use config::GeoAlertConfig;
pub use error::GeoAlertError;
pub use models::{AirQualityQuery, EarthquakeQuery, PushMessage, WeatherQuery};
pub use notify::FcmNotifier;
pub use upstream::{OpenAqClient, OpenWeatherClient, UsgsClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, GeoAlertError>;
