//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Provider credentials are optional: a
//! missing key leaves the matching gateway unconfigured instead of failing startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which hosted model writes descriptions, plans and answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextProvider {
    Gemini,
    OpenAi,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_path: PathBuf,
    pub log_level: Level,
    pub google_api_key: Option<String>,
    pub translate_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub text_provider: TextProvider,
    pub gemini_model: String,
    pub openai_text_model: String,
    pub image_model: String,
    pub request_timeout: Duration,
    pub translation_cache_capacity: usize,
    pub session_ttl: chrono::Duration,
    /// Adds the `Secure` attribute to the session cookie. Disable only for plain-HTTP development.
    pub session_cookie_secure: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // --- Load Server and Storage Settings ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_path = var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./database.json"));

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys (as optional) ---
        let google_api_key = var("GOOGLE_API_KEY");
        let translate_api_key = var("TRANSLATE_API_KEY").or_else(|| google_api_key.clone());
        let openai_api_key = var("OPENAI_API_KEY");

        // --- Load Adapter-specific Settings ---
        let text_provider = match var("TEXT_PROVIDER")
            .unwrap_or_else(|| "gemini".to_string())
            .to_lowercase()
            .as_str()
        {
            "gemini" => TextProvider::Gemini,
            "openai" => TextProvider::OpenAi,
            other => {
                return Err(ConfigError::InvalidValue(
                    "TEXT_PROVIDER".to_string(),
                    format!("'{}' is not one of gemini, openai", other),
                ))
            }
        };
        let gemini_model = var("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash-latest".to_string());
        let openai_text_model = var("OPENAI_TEXT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());
        let image_model = var("IMAGE_MODEL").unwrap_or_else(|| "dall-e-3".to_string());

        let request_timeout = Duration::from_secs(parse_number(&var, "REQUEST_TIMEOUT_SECS", 30)?);
        let translation_cache_capacity = parse_number(&var, "TRANSLATION_CACHE_CAPACITY", 256)? as usize;
        let session_ttl = session_ttl(parse_number(&var, "SESSION_TTL_HOURS", 24)?)?;
        let session_cookie_secure = match var("SESSION_COOKIE_SECURE").map(|v| v.trim().to_lowercase()) {
            None => true,
            Some(v) if v == "true" || v == "1" => true,
            Some(v) if v == "false" || v == "0" => false,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "SESSION_COOKIE_SECURE".to_string(),
                    format!("'{}' is not a boolean", other),
                ))
            }
        };

        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "REQUEST_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            database_path,
            log_level,
            google_api_key,
            translate_api_key,
            openai_api_key,
            text_provider,
            gemini_model,
            openai_text_model,
            image_model,
            request_timeout,
            translation_cache_capacity,
            session_ttl,
            session_cookie_secure,
        })
    }
}

/// Sessions last at most one year.
const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

fn session_ttl(hours: u64) -> Result<chrono::Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue("SESSION_TTL_HOURS".to_string(), reason);
    if hours == 0 || hours > MAX_SESSION_TTL_HOURS {
        return Err(invalid(format!(
            "must be between 1 and {} hours, got {}",
            MAX_SESSION_TTL_HOURS, hours
        )));
    }
    i64::try_from(hours)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .ok_or_else(|| invalid(format!("{} hours is out of range", hours)))
}

fn parse_number<F>(var: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
            ConfigError::InvalidValue(key.to_string(), format!("'{}': {}", raw, e))
        }),
    }
}
