//! Configuration errors
//!
//! The simulation itself is total; everything that can go wrong is caught
//! when `Settings` are turned into `Rules`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tier table is empty")]
    EmptyTierTable,

    #[error("First tier must start at score 0, found {0}")]
    FirstThreshold(u32),

    #[error("Tier thresholds must be strictly ascending ({prev} then {next})")]
    UnsortedTiers { prev: u32, next: u32 },

    #[error("Tier at threshold {threshold}: {reason}")]
    InvalidTier { threshold: u32, reason: &'static str },

    #[error("Vocabulary is empty")]
    EmptyVocabulary,

    #[error("Duplicate romaji '{0}' in vocabulary")]
    DuplicateRomaji(String),

    #[error("Invalid romaji '{0}': must be non-empty lowercase ASCII letters")]
    InvalidRomaji(String),

    #[error("Romaji '{romaji}' uses '{ch}', which is outside the input alphabet")]
    RomajiOutsideAlphabet { romaji: String, ch: char },

    #[error("Entry '{romaji}' has {count} glyphs, expected 1 or 2")]
    GlyphCount { romaji: String, count: usize },

    #[error("Invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
