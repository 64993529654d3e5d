//! Precedence-ordered extraction strategies.
//!
//! Company: ATS markup, subject phrase, sender display name, sender
//! domain, body phrase. Position: ATS markup, subject phrase, body
//! phrase. Source URL: ATS markup, body link scan.

use std::sync::OnceLock;

use regex::Regex;

use crate::email::EmailContent;
use crate::extractor::validate::{accept_name, accept_url, clean_company, clean_position};
use crate::extractor::{CompiledPattern, ExtractionCandidate, ExtractionField, Extractor};

/// Confidence assigned to a company derived from the sender domain alone.
const SENDER_DOMAIN_CONFIDENCE: f32 = 0.6;
/// Confidence assigned to a bare link found in the body.
const BODY_LINK_CONFIDENCE: f32 = 0.5;
/// Body matches reuse the subject patterns at reduced confidence.
const BODY_CONFIDENCE_FACTOR: f32 = 0.7;

impl Extractor {
    pub(crate) fn extract_company(
        &self,
        email: &EmailContent,
        body: &str,
    ) -> Option<ExtractionCandidate> {
        let patterns = &self.patterns().extraction;

        if !email.html_body.is_empty() {
            if let Some((value, confidence)) =
                first_name_match(&self.company_markup, &email.html_body, |raw| {
                    clean_company(raw, patterns)
                }, patterns)
            {
                return Some(candidate(ExtractionField::Company, value, "ats_markup", confidence));
            }
        }

        if let Some((value, confidence)) =
            first_name_match(&self.company_subject, &email.subject, |raw| {
                clean_company(raw, patterns)
            }, patterns)
        {
            return Some(candidate(ExtractionField::Company, value, "subject_phrase", confidence));
        }

        if let Some(name) = email.sender_display_name() {
            if let Some((value, confidence)) =
                first_name_match(&self.sender_name, name, |raw| clean_company(raw, patterns), patterns)
            {
                return Some(candidate(ExtractionField::Company, value, "sender_name", confidence));
            }
        }

        if let Some(value) = self.company_from_domain(email) {
            return Some(candidate(
                ExtractionField::Company,
                value,
                "sender_domain",
                SENDER_DOMAIN_CONFIDENCE,
            ));
        }

        first_name_match(&self.company_subject, body, |raw| clean_company(raw, patterns), patterns)
            .map(|(value, confidence)| {
                candidate(
                    ExtractionField::Company,
                    value,
                    "body_phrase",
                    confidence * BODY_CONFIDENCE_FACTOR,
                )
            })
    }

    pub(crate) fn extract_position(
        &self,
        email: &EmailContent,
        body: &str,
    ) -> Option<ExtractionCandidate> {
        let patterns = &self.patterns().extraction;

        if !email.html_body.is_empty() {
            if let Some((value, confidence)) =
                first_name_match(&self.position_markup, &email.html_body, |raw| {
                    clean_position(raw, patterns)
                }, patterns)
            {
                return Some(candidate(ExtractionField::Position, value, "ats_markup", confidence));
            }
        }

        if let Some((value, confidence)) =
            first_name_match(&self.position_subject, &email.subject, |raw| {
                clean_position(raw, patterns)
            }, patterns)
        {
            return Some(candidate(ExtractionField::Position, value, "subject_phrase", confidence));
        }

        first_name_match(&self.position_subject, body, |raw| clean_position(raw, patterns), patterns)
            .map(|(value, confidence)| {
                candidate(
                    ExtractionField::Position,
                    value,
                    "body_phrase",
                    confidence * BODY_CONFIDENCE_FACTOR,
                )
            })
    }

    pub(crate) fn extract_source_url(
        &self,
        email: &EmailContent,
        body: &str,
    ) -> Option<ExtractionCandidate> {
        if !email.html_body.is_empty() {
            for pattern in &self.source_url_markup {
                if let Some(caps) = pattern.regex.captures(&email.html_body) {
                    if let Some(value) = caps.name("value") {
                        let value = value.as_str().trim();
                        if accept_url(value) {
                            return Some(candidate(
                                ExtractionField::SourceUrl,
                                value.to_string(),
                                "ats_markup",
                                pattern.confidence,
                            ));
                        }
                    }
                }
            }
        }

        for text in [body, email.html_body.as_str()] {
            for found in url_regex().find_iter(text) {
                let value = found.as_str().trim_end_matches(['.', ',', ';', ')', '>']);
                if accept_url(value) {
                    return Some(candidate(
                        ExtractionField::SourceUrl,
                        value.to_string(),
                        "body_link",
                        BODY_LINK_CONFIDENCE,
                    ));
                }
            }
        }

        None
    }

    /// Derives the company from the registrable sender-domain label,
    /// unless that label belongs to a relay (ATS host, freemail, job board).
    fn company_from_domain(&self, email: &EmailContent) -> Option<String> {
        let patterns = &self.patterns().extraction;
        let domain = email.sender_domain()?.to_lowercase();
        let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
        if labels.len() < 2 {
            return None;
        }
        if labels
            .iter()
            .any(|label| patterns.relay_domains.iter().any(|relay| relay == label))
        {
            return None;
        }
        let registrable = labels[labels.len() - 2];
        let value = capitalize(registrable);
        accept_name(&value, patterns).then_some(value)
    }
}

fn candidate(
    field: ExtractionField,
    value: String,
    method: &'static str,
    confidence: f32,
) -> ExtractionCandidate {
    ExtractionCandidate {
        field,
        value,
        method,
        confidence,
    }
}

/// Runs a pattern list over text, returning the first cleaned candidate
/// that passes acceptance. A match that fails validation is skipped so a
/// later pattern or strategy can still win.
fn first_name_match(
    patterns: &[CompiledPattern],
    text: &str,
    clean: impl Fn(&str) -> String,
    config: &crate::config::ExtractionPatterns,
) -> Option<(String, f32)> {
    for pattern in patterns {
        if let Some(caps) = pattern.regex.captures(text) {
            if let Some(raw) = caps.name("value") {
                let value = clean(raw.as_str());
                if accept_name(&value, config) {
                    return Some((value, pattern.confidence));
                }
            }
        }
    }
    None
}

fn url_regex() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("static regex"))
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
