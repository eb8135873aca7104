//! Configuration management for the GeoAlert service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::GeoAlertError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the GeoAlert service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoAlertConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream API configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Push notification configuration
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default query settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Address to bind to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

/// Upstream API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL for the USGS earthquake catalog
    #[serde(default = "default_usgs_base_url")]
    pub usgs_base_url: String,
    /// Base URL for the OpenAQ API
    #[serde(default = "default_openaq_base_url")]
    pub openaq_base_url: String,
    /// OpenAQ API key (sent as X-API-Key when present)
    pub openaq_api_key: Option<String>,
    /// Base URL for the OpenWeather API
    #[serde(default = "default_openweather_base_url")]
    pub openweather_base_url: String,
    /// OpenWeather API key
    pub openweather_api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Push notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// FCM send endpoint
    #[serde(default = "default_fcm_endpoint")]
    pub fcm_endpoint: String,
    /// FCM server key
    pub fcm_server_key: Option<String>,
    /// Log payloads instead of delivering them
    #[serde(default)]
    pub dry_run: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default query settings applied when a request omits a parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Earthquake search window in hours
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,
    /// Minimum earthquake magnitude
    #[serde(default = "default_min_magnitude")]
    pub min_magnitude: f64,
    /// Air-quality search radius in meters
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    /// Maximum number of results per request
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Weather unit system
    #[serde(default = "default_units")]
    pub units: String,
}

// Default value functions
fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_usgs_base_url() -> String {
    "https://earthquake.usgs.gov/fdsnws/event/1".to_string()
}

fn default_openaq_base_url() -> String {
    "https://api.openaq.org/v3".to_string()
}

fn default_openweather_base_url() -> String {
    "https://api.openweathermap.org/data/3.0".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_fcm_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_lookback_hours() -> u32 {
    24
}

fn default_min_magnitude() -> f64 {
    4.5
}

fn default_radius_meters() -> u32 {
    25_000
}

fn default_max_results() -> u32 {
    100
}

fn default_units() -> String {
    "metric".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            usgs_base_url: default_usgs_base_url(),
            openaq_base_url: default_openaq_base_url(),
            openaq_api_key: None,
            openweather_base_url: default_openweather_base_url(),
            openweather_api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            fcm_endpoint: default_fcm_endpoint(),
            fcm_server_key: None,
            dry_run: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            min_magnitude: default_min_magnitude(),
            radius_meters: default_radius_meters(),
            max_results: default_max_results(),
            units: default_units(),
        }
    }
}

impl Default for GeoAlertConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            notifications: NotificationConfig::default(),
            logging: LoggingConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl GeoAlertConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with GEOALERT_ prefix
        builder = builder.add_source(
            Environment::with_prefix("GEOALERT")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: GeoAlertConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("geoalert").join("config.toml"))
    }

    /// Apply default values to fields explicitly set empty or zero
    pub fn apply_defaults(&mut self) {
        if self.server.bind_address.is_empty() {
            self.server.bind_address = default_bind_address();
        }
        if self.upstream.usgs_base_url.is_empty() {
            self.upstream.usgs_base_url = default_usgs_base_url();
        }
        if self.upstream.openaq_base_url.is_empty() {
            self.upstream.openaq_base_url = default_openaq_base_url();
        }
        if self.upstream.openweather_base_url.is_empty() {
            self.upstream.openweather_base_url = default_openweather_base_url();
        }
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_timeout();
        }
        if self.notifications.fcm_endpoint.is_empty() {
            self.notifications.fcm_endpoint = default_fcm_endpoint();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.lookback_hours == 0 {
            self.defaults.lookback_hours = default_lookback_hours();
        }
        if self.defaults.radius_meters == 0 {
            self.defaults.radius_meters = default_radius_meters();
        }
        if self.defaults.max_results == 0 {
            self.defaults.max_results = default_max_results();
        }
        if self.defaults.units.is_empty() {
            self.defaults.units = default_units();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("OpenAQ API key", &self.upstream.openaq_api_key),
            ("OpenWeather API key", &self.upstream.openweather_api_key),
            ("FCM server key", &self.notifications.fcm_server_key),
        ];

        for (name, key) in keys {
            if let Some(key) = key {
                if key.is_empty() {
                    return Err(GeoAlertError::config(format!(
                        "{name} cannot be empty if provided. Either remove it or provide a valid key."
                    ))
                    .into());
                }

                if key.len() > 256 {
                    return Err(GeoAlertError::config(format!(
                        "{name} appears to be invalid (too long). Please check your key."
                    ))
                    .into());
                }
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(GeoAlertError::config("Server port cannot be 0").into());
        }

        if self.upstream.timeout_seconds == 0 || self.upstream.timeout_seconds > 300 {
            return Err(GeoAlertError::config(
                "Upstream timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.defaults.lookback_hours == 0 || self.defaults.lookback_hours > 720 {
            return Err(GeoAlertError::config(
                "Default lookback window must be between 1 and 720 hours",
            )
            .into());
        }

        if !(-1.0..=10.0).contains(&self.defaults.min_magnitude) {
            return Err(GeoAlertError::config(
                "Default minimum magnitude must be between -1.0 and 10.0",
            )
            .into());
        }

        if self.defaults.radius_meters == 0 || self.defaults.radius_meters > 100_000 {
            return Err(GeoAlertError::config(
                "Default air-quality radius must be between 1 and 100000 meters",
            )
            .into());
        }

        if self.defaults.max_results == 0 || self.defaults.max_results > 1000 {
            return Err(GeoAlertError::config(
                "Default result limit must be between 1 and 1000",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(GeoAlertError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(GeoAlertError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let valid_units = ["metric", "imperial", "standard"];
        if !valid_units.contains(&self.defaults.units.as_str()) {
            return Err(GeoAlertError::config(format!(
                "Invalid default units '{}'. Must be one of: {}",
                self.defaults.units,
                valid_units.join(", ")
            ))
            .into());
        }

        let urls = [
            ("USGS base URL", &self.upstream.usgs_base_url),
            ("OpenAQ base URL", &self.upstream.openaq_base_url),
            ("OpenWeather base URL", &self.upstream.openweather_base_url),
            ("FCM endpoint", &self.notifications.fcm_endpoint),
        ];

        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(GeoAlertError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeoAlertConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.upstream.usgs_base_url,
            "https://earthquake.usgs.gov/fdsnws/event/1"
        );
        assert_eq!(config.upstream.timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.defaults.lookback_hours, 24);
        assert!(config.upstream.openweather_api_key.is_none());
        assert!(!config.notifications.dry_run);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = GeoAlertConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_empty_api_key() {
        let mut config = GeoAlertConfig::default();
        config.upstream.openweather_api_key = Some(String::new());
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_config_validation_valid_api_key() {
        let mut config = GeoAlertConfig::default();
        config.upstream.openweather_api_key = Some("valid_api_key_123".to_string());
        assert!(config.validate_api_keys().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = GeoAlertConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = GeoAlertConfig::default();
        config.upstream.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("timeout must be between"));
    }

    #[test]
    fn test_config_validation_magnitude_range() {
        let mut config = GeoAlertConfig::default();
        config.defaults.min_magnitude = 11.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = GeoAlertConfig::default();
        config.upstream.openaq_base_url = "ftp://api.openaq.org".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("OpenAQ base URL"));
    }

    #[test]
    fn test_load_without_config_file_uses_defaults() {
        // No file at this path; environment carries no GEOALERT_ overrides
        // in the test environment, so every value must fall out of serde
        // defaults.
        let config =
            GeoAlertConfig::load_from_path(Some(PathBuf::from("/nonexistent/config.toml")))
                .expect("defaults should load");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.defaults.max_results, 100);
    }

    #[test]
    fn test_config_path_generation() {
        let path = GeoAlertConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("geoalert"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
