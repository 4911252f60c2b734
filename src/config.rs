use std::net::SocketAddr;

use crate::error::AppError;
use crate::provider::CompletionOptions;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9410";

/// Gateway configuration, loaded from the environment once at startup.
///
/// Recognized variables: `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `OPENAI_MODEL`,
/// `OPENAI_MAX_TOKENS`, `OPENAI_TEMPERATURE`, `BIND_ADDR`.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub options: CompletionOptions,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Numeric variables that fail to parse fall back to their defaults
    /// rather than aborting startup. A missing API key is an error: without
    /// it every completion call would fail anyway.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AppError::Validation("OPENAI_API_KEY is not set".into()))?;

        let base_url = env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL);

        let options = CompletionOptions {
            model: env_or("OPENAI_MODEL", CompletionOptions::DEFAULT_MODEL),
            max_tokens: env_parsed("OPENAI_MAX_TOKENS", CompletionOptions::DEFAULT_MAX_TOKENS),
            temperature: env_parsed(
                "OPENAI_TEMPERATURE",
                CompletionOptions::DEFAULT_TEMPERATURE,
            ),
        };

        let bind_addr = env_or("BIND_ADDR", DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|e| AppError::Validation(format!("BIND_ADDR is not a valid address: {e}")))?;

        Ok(Self {
            api_key,
            base_url,
            options,
            bind_addr,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
