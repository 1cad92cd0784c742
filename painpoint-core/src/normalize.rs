//! Text normalization
//!
//! Both the query and every lexical cue go through the same transform so that
//! cue matching can be a plain substring test.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Anything that is neither a word character nor whitespace
const PUNCTUATION_PATTERN: &str = r"[^\w\s]";

/// English stop-words dropped during normalization
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "can", "this", "that", "these", "those", "i",
    "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PUNCTUATION_PATTERN).expect("punctuation pattern is valid"))
}

/// Normalizer configuration
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Tokens dropped regardless of length
    pub stop_words: HashSet<String>,
    /// Tokens with this many characters or fewer are dropped (default: 2)
    pub max_dropped_len: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            stop_words: DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            max_dropped_len: 2,
        }
    }
}

/// Deterministic string -> string normalizer
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    config: NormalizerConfig,
}

impl TextNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Lowercase, strip punctuation, drop stop-words and short tokens,
    /// then re-join with single spaces.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped = punctuation().replace_all(&lowered, "");

        stripped
            .split_whitespace()
            .filter(|word| {
                word.chars().count() > self.config.max_dropped_len
                    && !self.config.stop_words.contains(*word)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }
}

/// Normalize with the default configuration
pub fn normalize_text(text: &str) -> String {
    TextNormalizer::default().normalize(text)
}
