//! Configuration management for `TripMate`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripMateError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Root configuration structure for the `TripMate` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripMateConfig {
    /// Language model provider settings
    pub llm: LlmConfig,
    /// Weather API settings
    pub weather: WeatherConfig,
    /// Events API settings
    pub events: EventsConfig,
    /// Shared HTTP client settings
    pub http: HttpConfig,
    /// Web server settings
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Chat-completions provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key, falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    /// Base URL of an OpenAI compatible API
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// How many tool-call rounds a single turn may use
    pub max_tool_rounds: u32,
    /// Number of prior exchanges replayed to the model
    pub history_window: usize,
    pub timeout_seconds: u32,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Daily forecast endpoint
    pub forecast_url: String,
    /// Geocoding search endpoint
    pub geocoding_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Longest range the forecast provider serves
    pub max_forecast_days: u32,
}

/// Events API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// API key, falls back to `TICKETMASTER_API_KEY`; no key disables the events tool
    pub api_key: Option<String>,
    pub base_url: String,
    /// Maximum number of events requested per lookup
    pub page_size: u32,
    pub timeout_seconds: u32,
}

/// Settings shared by every outbound HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Retries for transient failures, 0 disables retrying
    pub max_retries: u32,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the web UI
    pub static_dir: String,
    /// Sessions idle longer than this are destroyed
    pub session_idle_minutes: u32,
    pub max_sessions: usize,
    /// PEM certificate chain, enables HTTPS together with `tls_key`
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP collector base URL, falls back to `OTEL_EXPORTER_OTLP_ENDPOINT`
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4-turbo-preview".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_events_base_url() -> String {
    "https://app.ticketmaster.com/discovery/v2/events.json".to_string()
}

fn default_user_agent() -> String {
    format!("TripMate/{}", crate::VERSION)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            temperature: 0.7,
            max_tool_rounds: 5,
            history_window: 20,
            timeout_seconds: 60,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            geocoding_url: default_geocoding_url(),
            timeout_seconds: 10,
            max_forecast_days: 16,
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_events_base_url(),
            page_size: 20,
            timeout_seconds: 10,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: "static".to_string(),
            session_idle_minutes: 60,
            max_sessions: 1000,
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl TripMateConfig {
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

        // Environment overrides such as TRIPMATE_LLM__MODEL
        builder = builder.add_source(
            Environment::with_prefix("TRIPMATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripMateConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_well_known_env();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripmate").join("config.toml"))
    }

    /// Fill unset keys from the provider's conventional variable names
    fn apply_well_known_env(&mut self) {
        if self.llm.api_key.is_none() {
            self.llm.api_key = env::var("OPENAI_API_KEY").ok();
        }
        if self.events.api_key.is_none() {
            self.events.api_key = env::var("TICKETMASTER_API_KEY").ok();
        }
        if self.logging.otlp_endpoint.is_none() {
            self.logging.otlp_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.llm.base_url.is_empty() {
            self.llm.base_url = default_llm_base_url();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.weather.forecast_url.is_empty() {
            self.weather.forecast_url = default_forecast_url();
        }
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = default_geocoding_url();
        }
        if self.events.base_url.is_empty() {
            self.events.base_url = default_events_base_url();
        }
        if self.http.user_agent.is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        // Blank keys behave like missing ones
        if self.events.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            self.events.api_key = None;
        }
        if self.logging.otlp_endpoint.as_deref().is_some_and(|e| e.trim().is_empty()) {
            self.logging.otlp_endpoint = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        match self.llm.api_key.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(TripMateError::config(
                    "OpenAI API key is required. Set OPENAI_API_KEY (or llm.api_key) and restart the application.",
                )
                .into());
            }
            Some(key) if key.len() < 8 => {
                return Err(TripMateError::config(
                    "OpenAI API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
            Some(_) => {}
        }

        if let Some(key) = &self.events.api_key
            && key.len() < 8
        {
            return Err(TripMateError::config(
                "Events API key appears to be invalid (too short). Either remove it or provide a valid key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(TripMateError::config("LLM temperature must be between 0.0 and 2.0").into());
        }

        if self.llm.max_tool_rounds == 0 || self.llm.max_tool_rounds > 10 {
            return Err(TripMateError::config("LLM max tool rounds must be between 1 and 10").into());
        }

        for (name, timeout) in [
            ("LLM", self.llm.timeout_seconds),
            ("Weather API", self.weather.timeout_seconds),
            ("Events API", self.events.timeout_seconds),
        ] {
            if timeout == 0 || timeout > 300 {
                return Err(TripMateError::config(format!(
                    "{name} timeout must be between 1 and 300 seconds"
                ))
                .into());
            }
        }

        if self.weather.max_forecast_days == 0 || self.weather.max_forecast_days > 16 {
            return Err(
                TripMateError::config("Weather max forecast days must be between 1 and 16").into(),
            );
        }

        if self.events.page_size == 0 || self.events.page_size > 200 {
            return Err(TripMateError::config("Events page size must be between 1 and 200").into());
        }

        if self.http.max_retries > 10 {
            return Err(TripMateError::config("HTTP max retries cannot exceed 10").into());
        }

        if self.server.session_idle_minutes == 0 {
            return Err(TripMateError::config("Session idle timeout must be at least 1 minute").into());
        }

        if self.server.max_sessions == 0 {
            return Err(TripMateError::config("Max sessions must be at least 1").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripMateError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripMateError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("LLM base URL", &self.llm.base_url),
            ("Weather forecast URL", &self.weather.forecast_url),
            ("Weather geocoding URL", &self.weather.geocoding_url),
            ("Events base URL", &self.events.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripMateError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_tls(&self) -> Result<()> {
        match (&self.server.tls_cert, &self.server.tls_key) {
            (None, None) => Ok(()),
            (Some(_), None) | (None, Some(_)) => Err(TripMateError::config(
                "Both server.tls_cert and server.tls_key must be set to enable HTTPS",
            )
            .into()),
            #[cfg(feature = "tls")]
            (Some(cert), Some(_)) => {
                let file = std::fs::File::open(cert)
                    .with_context(|| format!("Failed to open TLS certificate: {cert}"))?;
                let mut reader = std::io::BufReader::new(file);
                let certs = rustls_pemfile::certs(&mut reader)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .with_context(|| format!("Failed to parse TLS certificate: {cert}"))?;
                if certs.is_empty() {
                    return Err(TripMateError::config(format!(
                        "No certificates found in {cert}"
                    ))
                    .into());
                }
                Ok(())
            }
            #[cfg(not(feature = "tls"))]
            (Some(_), Some(_)) => Err(TripMateError::config(
                "HTTPS requested but tripmate was built without the `tls` feature",
            )
            .into()),
        }
    }
}

/// Load variables from a `.env` file into the process environment
///
/// Reads `path`, or searches the current directory and its parents when
/// `None`. A missing file is not an error; a malformed one is.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).context("Failed to read .env file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid_config() -> TripMateConfig {
        let mut config = TripMateConfig::default();
        config.llm.api_key = Some("sk-test-key-123".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = TripMateConfig::default();
        assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(config.llm.model, "gpt-4-turbo-preview");
        assert_eq!(config.weather.forecast_url, "https://api.open-meteo.com/v1/forecast");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.http.max_retries, 0);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert!(config.llm.api_key.is_none());
        assert!(config.events.api_key.is_none());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let config = TripMateConfig::default();
        let result = config.validate_api_keys();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("OpenAI API key is required"));
    }

    #[test]
    fn test_config_validation_blank_api_key() {
        let mut config = TripMateConfig::default();
        config.llm.api_key = Some("   ".to_string());
        assert!(config.validate_api_keys().is_err());
    }

    #[test]
    fn test_config_validation_valid_api_key() {
        let config = valid_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_events_key() {
        let mut config = valid_config();
        config.events.api_key = Some("abc".to_string());
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Events API key"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = valid_config();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = valid_config();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Weather API timeout must be between")
        );

        let mut config = valid_config();
        config.weather.max_forecast_days = 30;
        assert!(config.validate().is_err());

        let mut config = valid_config();
        config.llm.max_tool_rounds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_non_http_urls() {
        let mut config = valid_config();
        config.events.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Events base URL"));
    }

    #[test]
    fn test_config_validation_half_tls() {
        let mut config = valid_config();
        config.server.tls_cert = Some("cert.pem".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = valid_config();
        config.llm.model = String::new();
        config.events.api_key = Some(String::new());
        config.apply_defaults();
        assert_eq!(config.llm.model, "gpt-4-turbo-preview");
        assert!(config.events.api_key.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[llm]
api_key = "sk-from-file-123"
model = "gpt-4o-mini"

[server]
port = 9090
"#
        )
        .unwrap();

        let config = TripMateConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.weather.max_forecast_days, 16);
    }

    #[test]
    fn test_config_path_generation() {
        let path = TripMateConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("tripmate"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_env_file_missing_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_env_file(Some(&dir.path().join(".env"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_env_file_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "TRIPMATE_DOTENV_LOADED=yes").unwrap();

        let loaded = load_env_file(Some(file.path())).unwrap();
        assert_eq!(loaded.as_deref(), Some(file.path()));
        assert_eq!(env::var("TRIPMATE_DOTENV_LOADED").as_deref(), Ok("yes"));
    }

    #[test]
    fn test_malformed_env_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "TRIPMATE_DOTENV_BROKEN='unterminated").unwrap();

        let err = load_env_file(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains(".env"));
    }
}
