use std::path::PathBuf;

use thiserror::Error;

use crate::config_env::{optional_trimmed_env, parse_u64_env, parse_usize_env};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_MODEL_PATH: &str = "model.onnx";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_SESSION_TIMEOUT_SECONDS: u64 = 600;

/// Origins the bundled web frontend is served from during development.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub model_path: PathBuf,
    pub frontend_url: Option<String>,
    pub max_upload_bytes: usize,
    pub session_timeout_seconds: u64,
    /// Zero disables the periodic sweeper; expiry then only runs after session creation.
    pub session_sweep_interval_seconds: u64,
    pub persona_template: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    MissingVar(String),
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let session_timeout_seconds =
            parse_u64_env("SESSION_TIMEOUT_SECONDS", DEFAULT_SESSION_TIMEOUT_SECONDS)?;
        if session_timeout_seconds == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "SESSION_TIMEOUT_SECONDS must be greater than zero".to_string(),
            ));
        }

        let frontend_url = optional_trimmed_env("FRONTEND_URL");
        if let Some(origin) = frontend_url.as_deref()
            && !origin.starts_with("http://")
            && !origin.starts_with("https://")
        {
            return Err(ConfigError::InvalidConfiguration(
                "FRONTEND_URL must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: optional_trimmed_env("API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            model_path: optional_trimmed_env("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            frontend_url,
            max_upload_bytes: parse_usize_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            session_timeout_seconds,
            session_sweep_interval_seconds: parse_u64_env("SESSION_SWEEP_INTERVAL_SECONDS", 0)?,
            persona_template: optional_trimmed_env("CHAT_PERSONA_TEMPLATE"),
        })
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        allowed_origins(self.frontend_url.as_deref())
    }
}

pub fn allowed_origins(frontend_url: Option<&str>) -> Vec<String> {
    let mut origins = DEFAULT_ALLOWED_ORIGINS
        .iter()
        .map(|origin| (*origin).to_string())
        .collect::<Vec<_>>();

    if let Some(frontend_url) = frontend_url {
        let normalized = frontend_url.trim().trim_end_matches('/');
        if !normalized.is_empty() && !origins.iter().any(|origin| origin == normalized) {
            origins.push(normalized.to_string());
        }
    }

    origins
}

/// Loads `.env` from the working directory when present. A missing file is not an error.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}
