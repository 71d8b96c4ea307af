use crate::constants::{self, env_vars};
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub mod paths;
pub mod validation;

use paths::{get_cache_dir_path, get_config_path, get_log_dir_path};
use validation::validate_config;

/// Configuration structure for the application.
/// Handles loading, saving, and managing application settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// SOAP endpoint of the KSÍ competition service.
    #[serde(default = "default_soap_url")]
    pub soap_url: String,
    /// Base URL of the KSÍ results website (tournament discovery and HTML match pages).
    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,
    /// Path to the log file. If not specified, logs will be written to a default location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file_path: Option<String>,
    /// HTTP timeout in seconds for upstream requests.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// How long cached discovery and match results stay fresh.
    #[serde(default = "default_cache_ttl_days")]
    pub cache_ttl_days: u64,
    /// Directory for the on-disk cache. Defaults to the platform cache directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
    /// Pause after every uncached match fetch.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

fn default_soap_url() -> String {
    constants::DEFAULT_SOAP_URL.to_string()
}

fn default_web_base_url() -> String {
    constants::DEFAULT_WEB_BASE_URL.to_string()
}

fn default_http_timeout() -> u64 {
    constants::DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_cache_ttl_days() -> u64 {
    constants::cache_ttl::DEFAULT_DAYS
}

fn default_request_delay_ms() -> u64 {
    constants::DEFAULT_REQUEST_DELAY_MS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            soap_url: default_soap_url(),
            web_base_url: default_web_base_url(),
            log_file_path: None,
            http_timeout_seconds: default_http_timeout(),
            cache_ttl_days: default_cache_ttl_days(),
            cache_dir: None,
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file location.
    /// Falls back to defaults when no config file exists.
    /// Environment variables override config file values.
    ///
    /// # Environment Variables
    /// - `KSI_SOAP_URL` - Override SOAP endpoint
    /// - `KSI_WEB_URL` - Override website base URL
    /// - `KSI_LOG_FILE` - Override log file path
    /// - `KSI_HTTP_TIMEOUT` - Override HTTP timeout in seconds
    /// - `KSI_CACHE_TTL_DAYS` - Override cache TTL in days
    /// - `KSI_CACHE_DIR` - Override cache directory
    /// - `KSI_REQUEST_DELAY_MS` - Override delay between uncached match fetches
    pub async fn load() -> Result<Self, AppError> {
        let config_path = get_config_path();

        let mut config = if Path::new(&config_path).exists() {
            Self::load_from_path(&config_path).await?
        } else {
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Applies environment variable overrides on top of the current values.
    /// Numeric variables that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(soap_url) = std::env::var(env_vars::SOAP_URL) {
            self.soap_url = soap_url;
        }

        if let Ok(web_url) = std::env::var(env_vars::WEB_URL) {
            self.web_base_url = web_url;
        }

        if let Ok(log_file_path) = std::env::var(env_vars::LOG_FILE) {
            self.log_file_path = Some(log_file_path);
        }

        if let Ok(cache_dir) = std::env::var(env_vars::CACHE_DIR) {
            self.cache_dir = Some(cache_dir);
        }

        if let Some(timeout) = parse_env_u64(env_vars::HTTP_TIMEOUT) {
            self.http_timeout_seconds = timeout;
        }

        if let Some(days) = parse_env_u64(env_vars::CACHE_TTL_DAYS) {
            self.cache_ttl_days = days;
        }

        if let Some(delay) = parse_env_u64(env_vars::REQUEST_DELAY_MS) {
            self.request_delay_ms = delay;
        }
    }

    /// Validates the configuration settings
    pub fn validate(&self) -> Result<(), AppError> {
        validate_config(
            &self.soap_url,
            &self.web_base_url,
            &self.log_file_path,
            self.http_timeout_seconds,
            self.cache_ttl_days,
        )
    }

    /// Cache TTL as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(
            self.cache_ttl_days
                .saturating_mul(constants::cache_ttl::SECONDS_PER_DAY),
        )
    }

    /// Delay between uncached match fetches as a duration.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Cache directory in effect (configured or platform default).
    pub fn effective_cache_dir(&self) -> String {
        self.cache_dir.clone().unwrap_or_else(get_cache_dir_path)
    }

    /// Saves current configuration to the default config file location.
    pub async fn save(&self) -> Result<(), AppError> {
        let config_path = get_config_path();
        self.save_to_path(&config_path).await
    }

    /// Returns the platform-specific path for the config file.
    pub fn get_config_path() -> String {
        paths::get_config_path()
    }

    /// Returns the platform-specific path for the log directory.
    pub fn get_log_dir_path() -> String {
        paths::get_log_dir_path()
    }

    /// Displays current configuration settings to stdout.
    pub async fn display() -> Result<(), AppError> {
        let config_path = get_config_path();
        let log_dir = get_log_dir_path();
        let has_file = Path::new(&config_path).exists();
        let config = Config::load().await?;

        println!("\nCurrent Configuration");
        println!("────────────────────────────────────");
        println!("Config Location:");
        if has_file {
            println!("{config_path}");
        } else {
            println!("{config_path} (not created, using defaults)");
        }
        println!("────────────────────────────────────");
        println!("SOAP Endpoint:");
        println!("{}", config.soap_url);
        println!("────────────────────────────────────");
        println!("Website:");
        println!("{}", config.web_base_url);
        println!("────────────────────────────────────");
        println!("HTTP Timeout:");
        println!("{} seconds", config.http_timeout_seconds);
        println!("────────────────────────────────────");
        println!("Cache:");
        println!("{}", config.effective_cache_dir());
        println!("TTL {} day(s)", config.cache_ttl_days);
        println!("────────────────────────────────────");
        println!("Request Delay:");
        println!("{} ms", config.request_delay_ms);
        println!("────────────────────────────────────");
        println!("Log File Location:");
        if let Some(custom_path) = &config.log_file_path {
            println!("{custom_path}");
        } else {
            println!("{log_dir}/ksi_stats.log");
            println!("(Default location)");
        }

        Ok(())
    }

    /// Saves configuration to a custom file path, creating the parent directory if needed.
    ///
    /// # Errors
    /// * `AppError::Config` - If the provided path has no parent directory
    /// * `AppError::Io` - If there's an I/O error creating directories or writing the file
    /// * `AppError::TomlSerialize` - If there's an error serializing the configuration
    pub async fn save_to_path(&self, path: &str) -> Result<(), AppError> {
        let config_dir = Path::new(path).parent().ok_or_else(|| {
            AppError::config_error(format!("Path '{path}' has no parent directory"))
        })?;

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).await?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = fs::File::create(path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Loads configuration from a custom file path without applying env overrides.
    pub async fn load_from_path(path: &str) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

fn parse_env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.trim().parse::<u64>().ok())
}
