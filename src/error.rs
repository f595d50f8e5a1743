//! Error types for the workload metrics CLI.

use crate::platform::api::ApiError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error returned by command handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dashboard creation failed: {0}")]
    DashboardFailed(String),
}

/// Errors raised while loading configuration; fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Dynatrace URL and API token must be provided (missing: {0})")]
    MissingCredentials(String),

    #[error("Invalid Dynatrace URL '{0}': must start with http:// or https://")]
    InvalidUrl(String),

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParsingFailed(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
