use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackmailError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Email error: {0}")]
    Email(#[from] crate::email::EmailError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read pattern config '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse pattern config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Invalid extraction pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

pub type Result<T> = std::result::Result<T, TrackmailError>;
