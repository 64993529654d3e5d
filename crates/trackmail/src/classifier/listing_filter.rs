//! Job-listing pre-filter.
//!
//! Broadcast job-alert emails (aggregator digests, "new jobs matched"
//! newsletters) share vocabulary with genuine application emails and
//! would otherwise be scored as `applied` by the keyword fallback. The
//! filter short-circuits them to `not_job_related` before either
//! classification path runs, but never when an explicit
//! application-lifecycle phrase is present.

use crate::classifier::{ApplicationStatus, ClassificationMethod, ClassificationResult, Urgency};
use crate::config::ListingFilterPatterns;
use crate::email::EmailContent;

/// Confidence assigned when the filter fires.
const LISTING_FILTER_CONFIDENCE: u8 = 30;

pub struct ListingFilter {
    aggregator_domains: Vec<String>,
    alert_phrases: Vec<String>,
    lifecycle_phrases: Vec<String>,
    link_threshold: usize,
}

impl ListingFilter {
    pub fn new(patterns: &ListingFilterPatterns) -> Self {
        Self {
            aggregator_domains: lowered(&patterns.aggregator_domains),
            alert_phrases: lowered(&patterns.alert_phrases),
            lifecycle_phrases: lowered(&patterns.lifecycle_phrases),
            link_threshold: patterns.link_threshold,
        }
    }

    /// Returns a terminal result when the email looks like a bulk job
    /// alert, `None` otherwise.
    pub fn check(&self, email: &EmailContent, body: &str) -> Option<ClassificationResult> {
        let haystack = format!("{} {}", email.subject, body).to_lowercase();

        // Lifecycle language always wins over the bulk heuristics.
        if self
            .lifecycle_phrases
            .iter()
            .any(|phrase| haystack.contains(phrase))
        {
            return None;
        }

        let sender = email.sender.to_lowercase();
        let from_aggregator = self
            .aggregator_domains
            .iter()
            .any(|domain| sender.contains(domain));
        let alert_phrase = self
            .alert_phrases
            .iter()
            .find(|phrase| haystack.contains(phrase.as_str()));
        let link_count = count_links(body);
        let many_links = link_count >= self.link_threshold;

        let is_listing = match (alert_phrase.is_some(), from_aggregator, many_links) {
            (true, true, _) | (true, _, true) | (_, true, true) => true,
            _ => false,
        };
        if !is_listing {
            return None;
        }

        let mut indicators = Vec::new();
        if let Some(phrase) = alert_phrase {
            indicators.push(format!("alert phrase: {phrase}"));
        }
        if from_aggregator {
            indicators.push("aggregator sender domain".to_string());
        }
        if many_links {
            indicators.push(format!("{link_count} outbound links"));
        }

        Some(ClassificationResult {
            status: ApplicationStatus::NotJobRelated,
            confidence: LISTING_FILTER_CONFIDENCE,
            indicators,
            reasoning: "Bulk job-alert email without application lifecycle language".to_string(),
            is_job_related: false,
            urgency: Urgency::for_status(ApplicationStatus::NotJobRelated),
            method: ClassificationMethod::ListingFilter,
        })
    }
}

fn lowered(list: &[String]) -> Vec<String> {
    list.iter().map(|s| s.to_lowercase()).collect()
}

/// Counts outbound links in the preferred body. Counting both body
/// variants would tally each link twice in multipart emails.
fn count_links(body: &str) -> usize {
    body.matches("http://").count() + body.matches("https://").count()
}
