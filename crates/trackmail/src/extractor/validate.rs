//! Candidate cleanup and acceptance checks shared by all strategies.

use crate::config::ExtractionPatterns;

const TRIM_CHARS: &[char] = &[
    ' ', '\t', '.', ',', ';', ':', '!', '?', '-', '\u{2013}', '"', '\'', '(', ')', '[', ']',
];

/// Normalizes a company candidate: trims punctuation and strips recruiting
/// suffixes like "Hiring Team" until none remain.
pub(crate) fn clean_company(raw: &str, patterns: &ExtractionPatterns) -> String {
    let mut value = raw.trim().trim_matches(TRIM_CHARS).to_string();
    loop {
        let lower = value.to_lowercase();
        let stripped = patterns
            .company_suffixes
            .iter()
            .find_map(|suffix| {
                let tail = format!(" {suffix}");
                lower.ends_with(&tail).then(|| value.len() - tail.len())
            })
            .filter(|&cut| value.is_char_boundary(cut));
        match stripped {
            Some(cut) => value = value[..cut].trim_end().to_string(),
            None => break,
        }
    }
    value.trim_matches(TRIM_CHARS).to_string()
}

const POSITION_SUFFIXES: &[&str] = &["position", "role", "opening", "job", "opportunity"];

/// Normalizes a position candidate: trims punctuation, strips leading
/// articles and trailing filler words like "role".
pub(crate) fn clean_position(raw: &str, patterns: &ExtractionPatterns) -> String {
    let mut value = raw.trim().trim_matches(TRIM_CHARS).to_string();
    loop {
        let lower = value.to_lowercase();
        let stripped = patterns
            .position_prefixes
            .iter()
            .find(|prefix| lower.starts_with(prefix.as_str()))
            .map(|prefix| prefix.len())
            .filter(|&cut| value.is_char_boundary(cut));
        match stripped {
            Some(cut) => value = value[cut..].trim_start().to_string(),
            None => break,
        }
    }
    loop {
        let lower = value.to_lowercase();
        let stripped = POSITION_SUFFIXES
            .iter()
            .find_map(|suffix| {
                let tail = format!(" {suffix}");
                lower.ends_with(&tail).then(|| value.len() - tail.len())
            })
            .filter(|&cut| value.is_char_boundary(cut));
        match stripped {
            Some(cut) => value = value[..cut].trim_end().to_string(),
            None => break,
        }
    }
    value.trim_matches(TRIM_CHARS).to_string()
}

/// Accepts a cleaned name candidate: length in bounds, contains a letter,
/// and does not begin with a conversational stop phrase.
pub(crate) fn accept_name(value: &str, patterns: &ExtractionPatterns) -> bool {
    let len = value.chars().count();
    if len < patterns.min_value_length || len > patterns.max_value_length {
        return false;
    }
    if !value.chars().any(|c| c.is_alphabetic()) {
        return false;
    }
    let lower = value.to_lowercase();
    !patterns.stop_phrases.iter().any(|phrase| {
        lower == *phrase || lower.starts_with(&format!("{phrase} "))
    })
}

const TRACKING_FRAGMENTS: &[&str] = &[
    "unsubscribe",
    "email-preferences",
    "email_preferences",
    "manage-preferences",
    "opt-out",
    "optout",
    "mailto:",
    "privacy",
];

/// Accepts a URL candidate: well-formed scheme, bounded length, and not a
/// tracking or unsubscribe link.
pub(crate) fn accept_url(value: &str) -> bool {
    if !(value.starts_with("https://") || value.starts_with("http://")) {
        return false;
    }
    if value.len() < 12 || value.len() > 500 || value.contains(char::is_whitespace) {
        return false;
    }
    let lower = value.to_lowercase();
    !TRACKING_FRAGMENTS.iter().any(|frag| lower.contains(frag))
}
