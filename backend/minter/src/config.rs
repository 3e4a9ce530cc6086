//! Application configuration loaded from environment variables.

use crate::errors::{MinterError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the OpenAI-compatible generation API
    pub openai_api_url: String,
    /// API key for the generation API
    pub openai_api_key: String,
    /// Base URL of the Verbwire storage/minting API
    pub verbwire_api_url: String,
    /// API key for the Verbwire API
    pub verbwire_api_key: String,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// Timeout applied to every outbound HTTP call
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            openai_api_url: env_var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            openai_api_key: env_var("OPENAI_API_KEY").map_err(|_| {
                MinterError::Config("OPENAI_API_KEY environment variable is required".to_string())
            })?,
            verbwire_api_url: env_var("VERBWIRE_API_URL")
                .unwrap_or_else(|_| "https://api.verbwire.com".to_string()),
            verbwire_api_key: env_var("VERBWIRE_API_KEY").map_err(|_| {
                MinterError::Config("VERBWIRE_API_KEY environment variable is required".to_string())
            })?,
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./minter_assets.db".to_string()),
            api_port: env_var("API_PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .map_err(|_| MinterError::Config("Invalid API_PORT".to_string()))?,
            http_timeout_secs: env_var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .map_err(|_| MinterError::Config("Invalid HTTP_TIMEOUT_SECS".to_string()))?,
        })
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| MinterError::Config(format!("Missing env var: {key}")))
}
