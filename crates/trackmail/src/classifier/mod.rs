//! Email classification.
//!
//! Dispatch order: job-listing pre-filter, then the AI path when an API
//! key is configured, then the deterministic phrase-scoring fallback.
//! Classification never fails; every email yields exactly one
//! [`ClassificationResult`] tagged with the path that produced it.

pub mod ai;
pub mod fallback;
pub mod listing_filter;
pub mod status;

use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::PatternConfig;
use crate::email::EmailContent;

pub use ai::{AiClassifier, AiError};
pub use fallback::FallbackClassifier;
pub use listing_filter::ListingFilter;
pub use status::{ApplicationStatus, Urgency};

/// Which path produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
    Ai,
    PatternFallback,
    ListingFilter,
}

impl ClassificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::PatternFallback => "pattern_fallback",
            Self::ListingFilter => "listing_filter",
        }
    }
}

/// Terminal classification for one email, produced exactly once per
/// ingestion attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub status: ApplicationStatus,
    /// Confidence in [0, 100].
    pub confidence: u8,
    /// Phrases or signals that supported the status.
    pub indicators: Vec<String>,
    pub reasoning: String,
    pub is_job_related: bool,
    pub urgency: Urgency,
    pub method: ClassificationMethod,
}

pub struct Classifier {
    listing_filter: ListingFilter,
    fallback: FallbackClassifier,
    ai: Option<AiClassifier>,
}

impl Classifier {
    pub fn new(config: Arc<PatternConfig>) -> Self {
        Self {
            listing_filter: ListingFilter::new(&config.listing_filter),
            fallback: FallbackClassifier::new(&config.classification),
            ai: AiClassifier::from_config(&config.ai),
        }
    }

    /// Builds a classifier that never attempts the AI path.
    pub fn without_ai(config: Arc<PatternConfig>) -> Self {
        Self {
            listing_filter: ListingFilter::new(&config.listing_filter),
            fallback: FallbackClassifier::new(&config.classification),
            ai: None,
        }
    }

    /// Classifies one email. Extracted company and position, when
    /// available, enrich the AI prompt only.
    pub async fn classify(
        &self,
        email: &EmailContent,
        company: Option<&str>,
        position: Option<&str>,
    ) -> ClassificationResult {
        let body = email.text();

        if let Some(result) = self.listing_filter.check(email, &body) {
            return result;
        }

        if let Some(ai) = &self.ai {
            match ai.classify(email, company, position, &body).await {
                Ok(result) => return result,
                Err(err) => {
                    warn!("AI classification failed, using pattern fallback: {err}");
                }
            }
        }

        self.fallback.classify(email, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn classifier() -> Classifier {
        Classifier::without_ai(Arc::new(PatternConfig::embedded().unwrap()))
    }

    #[tokio::test]
    async fn test_fallback_used_without_api_key() {
        let email = EmailContent::new(
            "jobs@acme.com",
            "Application Received",
            "Thank you for applying to Acme.",
            "",
            Utc::now(),
        );
        let result = classifier().classify(&email, Some("Acme"), None).await;
        assert_eq!(result.status, ApplicationStatus::Applied);
        assert_ne!(result.method, ClassificationMethod::Ai);
    }

    #[tokio::test]
    async fn test_listing_filter_runs_before_fallback() {
        let links: String = (1..=8)
            .map(|n| format!("https://jobs.example.com/view/{n}\n"))
            .collect();
        let email = EmailContent::new(
            "jobs-noreply@linkedin.com",
            "8 new jobs matched your search",
            links,
            "",
            Utc::now(),
        );
        let result = classifier().classify(&email, None, None).await;
        assert_eq!(result.status, ApplicationStatus::NotJobRelated);
        assert_eq!(result.method, ClassificationMethod::ListingFilter);
    }
}
