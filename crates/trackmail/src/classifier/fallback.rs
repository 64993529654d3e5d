//! Deterministic phrase-scoring fallback.
//!
//! Scores each status by counting phrase matches in the lowercased
//! subject and body. Used whenever the AI path is unavailable or fails.

use crate::classifier::{ApplicationStatus, ClassificationMethod, ClassificationResult, Urgency};
use crate::config::{ClassificationPatterns, StatusPhrases};
use crate::email::EmailContent;

/// Confidence cap for phrase scoring.
const MAX_CONFIDENCE: u8 = 95;
/// Added per matched phrase on top of the status base confidence.
const PER_MATCH_BONUS: u8 = 5;
/// Confidence when only generic job keywords are present.
const KEYWORD_DEFAULT_CONFIDENCE: u8 = 50;
/// Confidence when nothing job-related is present at all.
const UNRELATED_CONFIDENCE: u8 = 50;

pub struct FallbackClassifier {
    statuses: Vec<StatusEntry>,
    job_keywords: Vec<String>,
}

struct StatusEntry {
    status: ApplicationStatus,
    base_confidence: u8,
    phrases: Vec<String>,
}

impl FallbackClassifier {
    pub fn new(patterns: &ClassificationPatterns) -> Self {
        Self {
            statuses: patterns.statuses.iter().map(StatusEntry::from_config).collect(),
            job_keywords: patterns.job_keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn classify(&self, email: &EmailContent, body: &str) -> ClassificationResult {
        let haystack = format!("{} {}", email.subject, body).to_lowercase();

        let mut scored: Vec<(ApplicationStatus, u8, Vec<String>)> = Vec::new();
        for entry in &self.statuses {
            let matched: Vec<String> = entry
                .phrases
                .iter()
                .filter(|phrase| haystack.contains(phrase.as_str()))
                .cloned()
                .collect();
            if matched.is_empty() {
                continue;
            }
            let bonus = PER_MATCH_BONUS.saturating_mul(matched.len().min(255) as u8);
            let confidence = entry.base_confidence.saturating_add(bonus).min(MAX_CONFIDENCE);
            scored.push((entry.status, confidence, matched));
        }

        // Rejection emails often quote interview or offer language from
        // earlier in the thread, so a rejection match always wins.
        let selected = scored
            .iter()
            .find(|(status, _, _)| *status == ApplicationStatus::Rejected)
            .or_else(|| scored.iter().max_by_key(|(_, confidence, _)| *confidence));

        if let Some((status, confidence, matched)) = selected {
            return result(
                *status,
                *confidence,
                matched.clone(),
                format!("Matched {} {} phrase(s)", matched.len(), status.as_str()),
            );
        }

        let keywords: Vec<String> = self
            .job_keywords
            .iter()
            .filter(|keyword| haystack.contains(keyword.as_str()))
            .cloned()
            .collect();
        if !keywords.is_empty() {
            return result(
                ApplicationStatus::Applied,
                KEYWORD_DEFAULT_CONFIDENCE,
                keywords,
                "Generic job keywords present without a status phrase".to_string(),
            );
        }

        result(
            ApplicationStatus::NotJobRelated,
            UNRELATED_CONFIDENCE,
            Vec::new(),
            "No job-related language found".to_string(),
        )
    }
}

impl StatusEntry {
    fn from_config(config: &StatusPhrases) -> Self {
        Self {
            status: config.status,
            base_confidence: config.base_confidence,
            phrases: config.phrases.iter().map(|p| p.to_lowercase()).collect(),
        }
    }
}

fn result(
    status: ApplicationStatus,
    confidence: u8,
    indicators: Vec<String>,
    reasoning: String,
) -> ClassificationResult {
    ClassificationResult {
        status,
        confidence,
        indicators,
        reasoning,
        is_job_related: status.is_job_related(),
        urgency: Urgency::for_status(status),
        method: ClassificationMethod::PatternFallback,
    }
}
