//! Configuration management for the travel planner
//!
//! Settings come from an optional TOML file overlaid by `TRAVEL_PLANNER_*`
//! environment variables. API keys are read separately from the process
//! environment (see [`Credentials`]).

use crate::PlannerError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// External data services
    pub services: ServicesConfig,
    /// Hosted language model endpoint
    pub llm: LlmConfig,
    /// Default planning settings
    pub defaults: DefaultsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Base URLs and HTTP settings for the data services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Nominatim geocoding base URL
    pub nominatim_url: String,
    /// OpenTripMap places base URL
    pub opentripmap_url: String,
    /// Overpass interpreter URL
    pub overpass_url: String,
    /// Open-Meteo API base URL
    pub open_meteo_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// User agent sent with every request (Nominatim requires one)
    pub user_agent: String,
}

/// Language model endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI-compatible API base
    pub api_base: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum number of model turns that may request tool calls
    pub max_tool_rounds: u32,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
}

/// Default planning settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// POI search radius in metres for the POI listing
    pub poi_radius_m: u32,
    /// Number of POIs in the POI listing
    pub poi_limit: u32,
    /// POI search radius in metres when building an itinerary
    pub itinerary_radius_m: u32,
    /// Activities per day in the itinerary
    pub daily_limit: u32,
    /// Country appended to ambiguous place names, e.g. "India"
    pub country_hint: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_llm_api_base() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            opentripmap_url: "https://api.opentripmap.com/0.1/en/places".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            open_meteo_url: "https://api.open-meteo.com/v1".to_string(),
            timeout_seconds: 20,
            user_agent: format!("travel-planner/{}", crate::VERSION),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            model: default_llm_model(),
            temperature: 0.2,
            max_tool_rounds: 8,
            timeout_seconds: 120,
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            poi_radius_m: 2000,
            poi_limit: 8,
            itinerary_radius_m: 3500,
            daily_limit: 3,
            country_hint: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: "pretty".to_string(),
        }
    }
}

impl PlannerConfig {
    /// Load configuration from the default file location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

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

        // TRAVEL_PLANNER_SERVICES__NOMINATIM_URL -> services.nominatim_url
        builder = builder.add_source(
            Environment::with_prefix("TRAVEL_PLANNER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_llm_env_overrides();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("travel-planner").join("config.toml"))
    }

    /// Honour the conventional `OPENAI_API_BASE` / `LLM_MODEL` variables
    fn apply_llm_env_overrides(&mut self) {
        if let Some(base) = non_empty_env("OPENAI_API_BASE") {
            self.llm.api_base = base;
        }
        if let Some(model) = non_empty_env("LLM_MODEL") {
            self.llm.model = model;
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        let services = ServicesConfig::default();
        if self.services.nominatim_url.is_empty() {
            self.services.nominatim_url = services.nominatim_url;
        }
        if self.services.opentripmap_url.is_empty() {
            self.services.opentripmap_url = services.opentripmap_url;
        }
        if self.services.overpass_url.is_empty() {
            self.services.overpass_url = services.overpass_url;
        }
        if self.services.open_meteo_url.is_empty() {
            self.services.open_meteo_url = services.open_meteo_url;
        }
        if self.services.timeout_seconds == 0 {
            self.services.timeout_seconds = services.timeout_seconds;
        }
        if self.services.user_agent.is_empty() {
            self.services.user_agent = services.user_agent;
        }
        if self.llm.api_base.is_empty() {
            self.llm.api_base = default_llm_api_base();
        }
        if self.llm.model.is_empty() {
            self.llm.model = default_llm_model();
        }
        if self.llm.max_tool_rounds == 0 {
            self.llm.max_tool_rounds = LlmConfig::default().max_tool_rounds;
        }
        if self.defaults.daily_limit == 0 {
            self.defaults.daily_limit = DefaultsConfig::default().daily_limit;
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = "pretty".to_string();
        }
        if self
            .defaults
            .country_hint
            .as_deref()
            .is_some_and(|hint| hint.trim().is_empty())
        {
            self.defaults.country_hint = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.services.timeout_seconds > 300 || self.llm.timeout_seconds > 600 {
            return Err(PlannerError::config(
                "Request timeout cannot exceed 300 seconds (600 for the LLM)",
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(PlannerError::config("LLM temperature must be between 0 and 2").into());
        }

        if self.llm.max_tool_rounds > 32 {
            return Err(PlannerError::config("LLM max tool rounds cannot exceed 32").into());
        }

        if self.defaults.poi_radius_m > 50_000 || self.defaults.itinerary_radius_m > 50_000 {
            return Err(PlannerError::config("POI search radius cannot exceed 50000 m").into());
        }

        if self.defaults.poi_limit > 100 {
            return Err(PlannerError::config("POI limit cannot exceed 100").into());
        }

        if self.defaults.daily_limit > 3 {
            return Err(PlannerError::config(
                "Daily limit cannot exceed 3 (morning, afternoon, evening)",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("services.nominatim_url", &self.services.nominatim_url),
            ("services.opentripmap_url", &self.services.opentripmap_url),
            ("services.overpass_url", &self.services.overpass_url),
            ("services.open_meteo_url", &self.services.open_meteo_url),
            ("llm.api_base", &self.llm.api_base),
        ];
        for (key, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PlannerError::config(format!(
                    "{key} must be a valid HTTP or HTTPS URL, got '{url}'"
                ))
                .into());
            }
        }

        Ok(())
    }
}

/// API keys, read once from the process environment at startup
#[derive(Clone, Default)]
pub struct Credentials {
    /// Key for the OpenAI-compatible LLM endpoint
    pub llm_api_key: Option<String>,
    /// Key for OpenTripMap; POI and geocoding lookups skip it when absent
    pub opentripmap_api_key: Option<String>,
}

impl Credentials {
    /// Read `GROQ_API_KEY` (or `OPENAI_API_KEY`) and `OPENTRIPMAP_API_KEY`
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            llm_api_key: non_empty_env("GROQ_API_KEY").or_else(|| non_empty_env("OPENAI_API_KEY")),
            opentripmap_api_key: non_empty_env("OPENTRIPMAP_API_KEY"),
        }
    }

    /// The LLM key, or a configuration error naming the variables to set
    pub fn require_llm_key(&self) -> crate::Result<&str> {
        self.llm_api_key.as_deref().ok_or_else(|| {
            PlannerError::config(
                "No LLM API key found; set GROQ_API_KEY or OPENAI_API_KEY (or use --direct)",
            )
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &self.llm_api_key.as_ref().map(|_| "<set>"))
            .field(
                "opentripmap_api_key",
                &self.opentripmap_api_key.as_ref().map(|_| "<set>"),
            )
            .finish()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = PlannerConfig::default();
        assert_eq!(config.services.open_meteo_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.services.timeout_seconds, 20);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.api_base, "https://api.groq.com/openai/v1");
        assert_eq!(config.defaults.daily_limit, 3);
        assert_eq!(config.logging.level, "warn");
        assert!(config.defaults.country_hint.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = PlannerConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = PlannerConfig::default();
        config.services.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = PlannerConfig::default();
        config.defaults.daily_limit = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_rejects_non_http_urls() {
        let mut config = PlannerConfig::default();
        config.services.overpass_url = "ftp://overpass".to_string();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("services.overpass_url"));
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = PlannerConfig::default();
        config.services.nominatim_url.clear();
        config.llm.model.clear();
        config.defaults.daily_limit = 0;
        config.defaults.country_hint = Some("  ".to_string());
        config.apply_defaults();
        assert_eq!(config.services.nominatim_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.defaults.daily_limit, 3);
        assert!(config.defaults.country_hint.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[defaults]
poi_limit = 12
country_hint = "India"

[logging]
level = "debug"
"#
        )
        .unwrap();

        let config = PlannerConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.defaults.poi_limit, 12);
        assert_eq!(config.defaults.country_hint.as_deref(), Some("India"));
        assert_eq!(config.logging.level, "debug");
        // untouched sections keep their defaults
        assert_eq!(config.services.overpass_url, "https://overpass-api.de/api/interpreter");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = PlannerConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("travel-planner"));
            assert!(path.to_string_lossy().ends_with("config.toml"));
        }
    }

    #[test]
    fn test_credentials_debug_hides_keys() {
        let credentials = Credentials {
            llm_api_key: Some("gsk_secret".to_string()),
            opentripmap_api_key: None,
        };
        let printed = format!("{credentials:?}");
        assert!(!printed.contains("gsk_secret"));
        assert!(printed.contains("<set>"));
        assert_eq!(credentials.require_llm_key().unwrap(), "gsk_secret");
        assert!(Credentials::default().require_llm_key().is_err());
    }
}
