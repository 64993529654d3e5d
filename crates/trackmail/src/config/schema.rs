use serde::{Deserialize, Serialize};

use crate::classifier::ApplicationStatus;

/// Versioned pattern-table configuration for the extraction and
/// classification stages. Loaded once at startup and shared immutably.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    pub version: String,
    pub extraction: ExtractionPatterns,
    pub classification: ClassificationPatterns,
    pub listing_filter: ListingFilterPatterns,
    #[serde(default)]
    pub ai: AiConfig,
}

/// A regex pattern with a named `value` capture group and the confidence
/// assigned to candidates it produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhrasePattern {
    pub pattern: String,
    pub confidence: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionPatterns {
    #[serde(default)]
    pub company_markup_patterns: Vec<PhrasePattern>,
    pub company_subject_patterns: Vec<PhrasePattern>,
    #[serde(default)]
    pub position_markup_patterns: Vec<PhrasePattern>,
    pub position_subject_patterns: Vec<PhrasePattern>,
    #[serde(default)]
    pub sender_name_patterns: Vec<PhrasePattern>,
    #[serde(default)]
    pub source_url_markup_patterns: Vec<PhrasePattern>,
    /// Registrable domain labels that never identify the hiring company
    /// (ATS hosts, mail relays, freemail providers).
    pub relay_domains: Vec<String>,
    /// Conversational fragments that indicate a pattern matched prose
    /// rather than a proper noun.
    pub stop_phrases: Vec<String>,
    #[serde(default)]
    pub company_suffixes: Vec<String>,
    #[serde(default)]
    pub position_prefixes: Vec<String>,
    #[serde(default = "default_min_value_length")]
    pub min_value_length: usize,
    #[serde(default = "default_max_value_length")]
    pub max_value_length: usize,
}

fn default_min_value_length() -> usize {
    2
}

fn default_max_value_length() -> usize {
    50
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationPatterns {
    pub statuses: Vec<StatusPhrases>,
    /// Generic keywords whose presence alone defaults the result to
    /// `applied` when no status phrase list matches.
    pub job_keywords: Vec<String>,
}

/// Ordered phrase list for one application status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusPhrases {
    pub status: ApplicationStatus,
    pub base_confidence: u8,
    pub phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingFilterPatterns {
    pub aggregator_domains: Vec<String>,
    pub alert_phrases: Vec<String>,
    /// Application-lifecycle phrases that always override the listing
    /// heuristics; genuine application emails must never be filtered.
    pub lifecycle_phrases: Vec<String>,
    #[serde(default = "default_link_threshold")]
    pub link_threshold: usize,
}

fn default_link_threshold() -> usize {
    6
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Environment variable holding the API key. An absent or empty
    /// variable disables the AI path entirely.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_ai_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "TRACKMAIL_AI_API_KEY".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    10
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}
