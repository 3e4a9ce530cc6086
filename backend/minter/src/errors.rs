//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinterError {
    /// Bad trigger input. Nothing was created.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Image or metadata generation failed upstream. No asset row exists.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// IPFS pinning failed. The asset row is marked `failed`.
    #[error("Storage upload failed: {0}")]
    Upload(String),

    /// On-chain mint submission failed. The asset row is marked `failed`.
    #[error("Mint failed: {0}")]
    Mint(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl MinterError {
    /// Stable machine-readable code returned in API error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Generation(_) => "generation_error",
            Self::Upload(_) => "upload_error",
            Self::Mint(_) => "mint_error",
            Self::Database(_) | Self::Migrate(_) => "persistence_error",
            Self::Http(_) => "upstream_error",
            Self::Json(_) => "internal_error",
            Self::Config(_) => "config_error",
            Self::NotFound(_) => "not_found",
        }
    }
}

pub type Result<T> = std::result::Result<T, MinterError>;
