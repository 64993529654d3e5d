pub mod loader;
pub mod schema;

pub use loader::{load_patterns, load_patterns_from_str};
pub use schema::{
    AiConfig, ClassificationPatterns, ExtractionPatterns, ListingFilterPatterns, PatternConfig,
    PhrasePattern, StatusPhrases,
};
