//! Configuration loading for the Libras backend
//!
//! All values come from the environment. Secrets (LLM token, image API
//! token, JWT signing secret) are required and have no compiled-in
//! defaults; the process refuses to start without them.

use crate::{Error, Result};

/// LLM provider settings (OpenAI-compatible chat/completions endpoint)
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Image generation provider settings
#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub api_token: String,
    pub base_url: String,
    pub provider: String,
    pub model: String,
    pub size: String,
    /// Maximum simultaneous in-flight generation requests
    pub concurrency: usize,
    /// Maximum attempts per item when the provider rate-limits
    pub max_attempts: u32,
}

/// Bearer-token validation settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub algorithm: String,
}

/// Process configuration, built once at startup and passed by reference
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_path: String,
    pub llm: LlmConfig,
    pub image: ImageConfig,
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let llm = LlmConfig {
            api_key: require("LLM_API_KEY")?,
            base_url: env_or("LLM_BASE_URL", "https://api.sambanova.ai/v1"),
            model: env_or("LLM_MODEL", "Meta-Llama-3.1-70B-Instruct"),
        };

        let image = ImageConfig {
            api_token: require("IMAGE_API_TOKEN")?,
            base_url: env_or("IMAGE_BASE_URL", "https://api.aimlapi.com/images/generations"),
            provider: env_or("IMAGE_PROVIDER", "fal-ai"),
            model: env_or("IMAGE_MODEL", "flux-pro/v1.1-ultra-raw"),
            size: env_or("IMAGE_SIZE", "256x256"),
            concurrency: parse_env("IMAGE_CONCURRENCY", 5)?,
            max_attempts: parse_env("IMAGE_MAX_ATTEMPTS", 3)?,
        };

        let auth = AuthConfig {
            secret: require("AUTH_SECRET")?,
            algorithm: env_or("AUTH_ALGORITHM", "HS256"),
        };

        Ok(Self {
            bind_addr: env_or("LIBRAS_BIND_ADDR", "127.0.0.1:8000"),
            database_path: env_or("LIBRAS_DATABASE_PATH", "libras.db"),
            llm,
            image,
            auth,
        })
    }
}

/// Read a required variable, rejecting empty or whitespace-only values
fn require(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "{} environment variable is not set",
            name
        ))),
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid number: {}", name, value))),
        Err(_) => Ok(default),
    }
}
