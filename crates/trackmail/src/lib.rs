pub mod classifier;
pub mod config;
pub mod db;
pub mod email;
pub mod entitlement;
pub mod error;
pub mod extractor;
pub mod pipeline;

pub use classifier::{
    ApplicationStatus, ClassificationMethod, ClassificationResult, Classifier, Urgency,
};
pub use config::{load_patterns, load_patterns_from_str, PatternConfig};
pub use db::Database;
pub use email::{fingerprint, EmailContent};
pub use entitlement::{EntitlementDecision, EntitlementGate, EntitlementSnapshot};
pub use error::{ConfigError, Result, TrackmailError};
pub use extractor::{Extraction, ExtractionCandidate, ExtractionField, Extractor};
pub use pipeline::{IngestOutcome, IngestPipeline, IngestResult, PipelineError};
