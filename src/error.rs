//! Error types and handling for `TripMate`

use thiserror::Error;

/// Main error type for the `TripMate` application
#[derive(Error, Debug)]
pub enum TripMateError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An external service could not be reached or answered with a failure
    #[error("{service} unavailable: {message}")]
    ServiceUnavailable { service: String, message: String },

    /// The external service answered but found nothing for the request
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The language model answered with something we cannot use
    #[error("LLM error: {message}")]
    Llm { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TripMateError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new service-unavailable error for the named provider
    pub fn service_unavailable<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::ServiceUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn llm<S: Into<String>>(message: S) -> Self {
        Self::Llm {
            message: message.into(),
        }
    }

    /// True for the failure kind callers surface as "lookup failed"
    #[must_use]
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, TripMateError::ServiceUnavailable { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripMateError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripMateError::ServiceUnavailable { service, .. } => {
                format!("The {service} service is currently unavailable. Please try again later.")
            }
            TripMateError::NotFound { message } => message.clone(),
            TripMateError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripMateError::Llm { .. } => {
                "The language model returned an unexpected response.".to_string()
            }
            TripMateError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TripMateError::config("missing API key");
        assert!(matches!(config_err, TripMateError::Config { .. }));

        let unavailable = TripMateError::service_unavailable("weather", "connection refused");
        assert!(unavailable.is_service_unavailable());

        let validation_err = TripMateError::validation("start date after end date");
        assert!(matches!(validation_err, TripMateError::Validation { .. }));
        assert!(!validation_err.is_service_unavailable());
    }

    #[test]
    fn test_user_messages() {
        let config_err = TripMateError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let unavailable = TripMateError::service_unavailable("weather", "HTTP 503");
        assert!(unavailable.user_message().contains("weather service is currently unavailable"));

        let validation_err = TripMateError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));

        let missing = TripMateError::not_found("Location 'Atlantis' not found");
        assert_eq!(missing.user_message(), "Location 'Atlantis' not found");
    }

    #[test]
    fn test_display_includes_service() {
        let err = TripMateError::service_unavailable("events", "HTTP 500");
        assert_eq!(err.to_string(), "events unavailable: HTTP 500");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TripMateError = io_err.into();
        assert!(matches!(err, TripMateError::Io { .. }));
    }
}
