//! Multi-strategy extraction of company, position, and source URL.
//!
//! Each field resolves through an ordered chain of strategies; the first
//! candidate that survives validation wins, and a rejected candidate
//! falls through to the next-lower-precedence strategy.

pub mod strategies;
pub mod validate;

use std::sync::Arc;

use log::debug;
use regex::Regex;

use crate::config::{PatternConfig, PhrasePattern};
use crate::email::EmailContent;

/// Field an extraction candidate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionField {
    Company,
    Position,
    SourceUrl,
}

impl ExtractionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Position => "position",
            Self::SourceUrl => "source_url",
        }
    }
}

/// A single validated extraction proposal.
#[derive(Debug, Clone)]
pub struct ExtractionCandidate {
    pub field: ExtractionField,
    pub value: String,
    /// Name of the strategy that produced the candidate.
    pub method: &'static str,
    /// Confidence in [0, 1].
    pub confidence: f32,
}

/// Per-field extraction outcome. Every field resolves to either one
/// validated candidate or `None`.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub company: Option<ExtractionCandidate>,
    pub position: Option<ExtractionCandidate>,
    pub source_url: Option<ExtractionCandidate>,
}

/// Pre-compiled phrase pattern with its configured confidence.
pub(crate) struct CompiledPattern {
    pub(crate) regex: Regex,
    pub(crate) confidence: f32,
}

pub struct Extractor {
    config: Arc<PatternConfig>,
    company_markup: Vec<CompiledPattern>,
    company_subject: Vec<CompiledPattern>,
    position_markup: Vec<CompiledPattern>,
    position_subject: Vec<CompiledPattern>,
    sender_name: Vec<CompiledPattern>,
    source_url_markup: Vec<CompiledPattern>,
}

impl Extractor {
    pub fn new(config: Arc<PatternConfig>) -> Self {
        let ext = &config.extraction;
        let company_markup = compile(&ext.company_markup_patterns);
        let company_subject = compile(&ext.company_subject_patterns);
        let position_markup = compile(&ext.position_markup_patterns);
        let position_subject = compile(&ext.position_subject_patterns);
        let sender_name = compile(&ext.sender_name_patterns);
        let source_url_markup = compile(&ext.source_url_markup_patterns);

        Self {
            config,
            company_markup,
            company_subject,
            position_markup,
            position_subject,
            sender_name,
            source_url_markup,
        }
    }

    /// Resolves all three fields for one email.
    pub fn extract(&self, email: &EmailContent) -> Extraction {
        let body = email.text();
        // Body text is noisy; only the head is worth scanning.
        let snippet: String = body.chars().take(2000).collect();

        let extraction = Extraction {
            company: self.extract_company(email, &snippet),
            position: self.extract_position(email, &snippet),
            source_url: self.extract_source_url(email, &snippet),
        };

        debug!(
            "Extraction: company={:?} position={:?} source_url={:?}",
            extraction.company.as_ref().map(|c| (&c.value, c.method)),
            extraction.position.as_ref().map(|c| (&c.value, c.method)),
            extraction.source_url.as_ref().map(|c| (&c.value, c.method)),
        );

        extraction
    }

    pub(crate) fn patterns(&self) -> &PatternConfig {
        &self.config
    }
}

/// Compiles a pattern list, skipping anything invalid. The loader has
/// already validated patterns, so skips only happen for hand-built configs.
fn compile(list: &[PhrasePattern]) -> Vec<CompiledPattern> {
    list.iter()
        .filter_map(|p| {
            Regex::new(&p.pattern)
                .ok()
                .map(|regex| CompiledPattern {
                    regex,
                    confidence: p.confidence,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn extractor() -> Extractor {
        Extractor::new(Arc::new(PatternConfig::embedded().unwrap()))
    }

    fn email(sender: &str, subject: &str, text: &str) -> EmailContent {
        EmailContent::new(sender, subject, text, "", Utc::now())
    }

    #[test]
    fn test_company_from_subject_beats_sender_domain() {
        let email = email(
            "no-reply@mail.greenhouse.io",
            "Thank You for Applying to Waymo!",
            "We appreciate your interest.",
        );
        let result = extractor().extract(&email);
        let company = result.company.expect("company resolved");
        assert_eq!(company.value, "Waymo");
        assert_eq!(company.method, "subject_phrase");
        assert!(company.confidence >= 0.85);
    }

    #[test]
    fn test_company_from_sender_display_name() {
        let email = email(
            "Stripe Hiring Team <no-reply@ats.example.com>",
            "Update on your application",
            "We wanted to share an update.",
        );
        let result = extractor().extract(&email);
        let company = result.company.expect("company resolved");
        assert_eq!(company.value, "Stripe");
        assert_eq!(company.method, "sender_name");
    }

    #[test]
    fn test_company_from_sender_domain() {
        let email = email(
            "jobs@acme.com",
            "Your interview details",
            "Details inside.",
        );
        let result = extractor().extract(&email);
        let company = result.company.expect("company resolved");
        assert_eq!(company.value, "Acme");
        assert_eq!(company.method, "sender_domain");
    }

    #[test]
    fn test_relay_domain_never_becomes_company() {
        let email = email(
            "noreply@myworkday.com",
            "Update on your candidacy",
            "An update is available in the portal.",
        );
        let result = extractor().extract(&email);
        assert!(result.company.is_none());
    }

    #[test]
    fn test_position_from_subject_dash_pattern() {
        let email = email(
            "jobs@acme.com",
            "Application Received - Software Engineer",
            "Thanks for applying.",
        );
        let result = extractor().extract(&email);
        let position = result.position.expect("position resolved");
        assert_eq!(position.value, "Software Engineer");
        assert_eq!(position.method, "subject_phrase");
    }

    #[test]
    fn test_company_from_ats_markup() {
        let mut email = email("noreply@greenhouse.io", "Application update", "");
        email.html_body =
            "<div class=\"company-name\">Initech</div><p>Thanks for your application.</p>"
                .to_string();
        let result = extractor().extract(&email);
        let company = result.company.expect("company resolved");
        assert_eq!(company.value, "Initech");
        assert_eq!(company.method, "ats_markup");
    }

    #[test]
    fn test_source_url_from_body_link() {
        let email = email(
            "jobs@acme.com",
            "Application Received - Software Engineer",
            "View the posting at https://jobs.acme.com/listings/1234 for details. \
             Unsubscribe: https://acme.com/unsubscribe?u=1",
        );
        let result = extractor().extract(&email);
        let url = result.source_url.expect("source url resolved");
        assert_eq!(url.value, "https://jobs.acme.com/listings/1234");
        assert_eq!(url.method, "body_link");
    }

    #[test]
    fn test_prose_match_is_rejected() {
        // "our" is a stop phrase; the candidate must fall through instead
        // of surfacing conversational text.
        let email = email(
            "updates@newsletter.example.com",
            "Applying to Our Latest Tips",
            "Nothing useful here.",
        );
        let result = extractor().extract(&email);
        if let Some(company) = result.company {
            assert_ne!(company.value.to_lowercase(), "our latest tips");
            assert_ne!(company.method, "subject_phrase");
        }
    }
}
