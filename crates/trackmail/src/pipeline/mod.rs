//! Ingestion pipeline.
//!
//! Sequences normalization checks, deduplication, the entitlement gate,
//! extraction, classification, and the final record commit. The four
//! expected terminal outcomes are always `Ok`; only input errors and
//! storage faults surface as `Err`.

pub mod context;
pub mod error;
pub mod runner;

use serde::Serialize;

use crate::classifier::ApplicationStatus;

pub use context::IngestContext;
pub use error::PipelineError;
pub use runner::IngestPipeline;

/// Terminal outcome of one ingestion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    /// A new application and its initial event were created.
    Created,
    /// The fingerprint was already known; at most a status event was
    /// appended.
    Duplicate,
    /// The entitlement gate denied creation.
    LimitExceeded,
    /// The email was classified as unrelated to a job application.
    NotJobRelated,
}

/// Result assembled by the orchestrator for every ingestion attempt.
#[derive(Debug, Clone, Serialize)]
pub struct IngestResult {
    pub outcome: IngestOutcome,
    /// Id of the created or matched application, when one exists.
    pub application_id: Option<String>,
    pub duplicate: bool,
    /// Status recorded for the application, when one was.
    pub status: Option<ApplicationStatus>,
    /// Denial reason for `LimitExceeded`, or `"not_job_related"`.
    pub reason: Option<String>,
    /// Usage counters, populated on `LimitExceeded` so the caller can
    /// prompt for an upgrade.
    pub current_count: Option<u64>,
    pub limit: Option<i64>,
}

impl IngestResult {
    fn outcome_only(outcome: IngestOutcome, reason: &str) -> Self {
        Self {
            outcome,
            application_id: None,
            duplicate: false,
            status: None,
            reason: Some(reason.to_string()),
            current_count: None,
            limit: None,
        }
    }
}
