//! Error types and handling for the GeoAlert service

use thiserror::Error;

/// Main error type for the GeoAlert service
#[derive(Error, Debug)]
pub enum GeoAlertError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Upstream API failure (transport error, unexpected status, bad body)
    #[error("{service} error: {message}")]
    Upstream {
        service: &'static str,
        message: String,
    },

    /// Upstream rejected the configured credentials
    #[error("{service} rejected the configured credentials")]
    UpstreamAuth { service: &'static str },

    /// Upstream rate limit exceeded
    #[error("{service} rate limit exceeded")]
    RateLimited { service: &'static str },

    /// Push notification delivery errors
    #[error("Notification error: {message}")]
    Notification { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl GeoAlertError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new upstream error for the named service
    pub fn upstream<S: Into<String>>(service: &'static str, message: S) -> Self {
        Self::Upstream {
            service,
            message: message.into(),
        }
    }

    /// Create a new notification error
    pub fn notification<S: Into<String>>(message: S) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    ///
    /// Upstream variants collapse to a generic message: the upstream status
    /// line and body stay in the logs, never in responses.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GeoAlertError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            GeoAlertError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            GeoAlertError::Upstream { service, .. }
            | GeoAlertError::UpstreamAuth { service } => {
                format!("The {service} service is currently unavailable.")
            }
            GeoAlertError::RateLimited { service } => {
                format!("The {service} service is rate limiting requests. Try again later.")
            }
            GeoAlertError::Notification { .. } => {
                "Push notification delivery failed.".to_string()
            }
            GeoAlertError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
