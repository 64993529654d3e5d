use std::path::Path;

use crate::config::schema::{PatternConfig, PhrasePattern};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/patterns-v1.json");
const DEFAULT_PATTERNS: &str = include_str!("../../assets/default-patterns.json");

pub fn load_patterns<P: AsRef<Path>>(path: P) -> Result<PatternConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_patterns_from_str(&content)
}

pub fn load_patterns_from_str(content: &str) -> Result<PatternConfig, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: PatternConfig = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

impl PatternConfig {
    /// Returns the embedded default pattern tables.
    pub fn embedded() -> Result<Self, ConfigError> {
        load_patterns_from_str(DEFAULT_PATTERNS)
    }
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| format!("{} at {}", e, e.instance_path()))
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &PatternConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported pattern config version: {}", config.version),
        });
    }

    let pattern_lists = [
        &config.extraction.company_markup_patterns,
        &config.extraction.company_subject_patterns,
        &config.extraction.position_markup_patterns,
        &config.extraction.position_subject_patterns,
        &config.extraction.sender_name_patterns,
        &config.extraction.source_url_markup_patterns,
    ];
    for list in pattern_lists {
        for phrase in list.iter() {
            validate_phrase_pattern(phrase)?;
        }
    }

    if config.extraction.min_value_length >= config.extraction.max_value_length {
        return Err(ConfigError::Validation {
            message: format!(
                "min_value_length ({}) must be below max_value_length ({})",
                config.extraction.min_value_length, config.extraction.max_value_length
            ),
        });
    }

    for entry in &config.classification.statuses {
        if entry.phrases.is_empty() {
            return Err(ConfigError::Validation {
                message: format!("Status '{}' has an empty phrase list", entry.status),
            });
        }
        if entry.base_confidence > 100 {
            return Err(ConfigError::Validation {
                message: format!(
                    "Status '{}' base_confidence {} exceeds 100",
                    entry.status, entry.base_confidence
                ),
            });
        }
    }

    if config.listing_filter.link_threshold == 0 {
        return Err(ConfigError::Validation {
            message: "listing_filter.link_threshold must be at least 1".to_string(),
        });
    }

    Ok(())
}

fn validate_phrase_pattern(phrase: &PhrasePattern) -> Result<(), ConfigError> {
    if let Err(e) = regex::Regex::new(&phrase.pattern) {
        return Err(ConfigError::InvalidPattern {
            pattern: phrase.pattern.clone(),
            reason: e.to_string(),
        });
    }

    if !phrase.pattern.contains("?P<value>") {
        return Err(ConfigError::InvalidPattern {
            pattern: phrase.pattern.clone(),
            reason: "Pattern must contain named capture group '?P<value>'".to_string(),
        });
    }

    if !(0.0..=1.0).contains(&phrase.confidence) {
        return Err(ConfigError::InvalidPattern {
            pattern: phrase.pattern.clone(),
            reason: format!("Confidence {} outside [0, 1]", phrase.confidence),
        });
    }

    Ok(())
}
