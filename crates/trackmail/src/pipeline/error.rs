use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid email input: {0}")]
    InvalidInput(#[from] crate::email::EmailError),

    #[error("Database failure: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Failed to serialize event metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}
