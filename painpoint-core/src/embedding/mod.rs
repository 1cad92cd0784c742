//! Embedding module for semantic scoring
//!
//! The matcher never constructs an encoder itself: callers hand it an
//! `EmbeddingProvider`. `HashEmbedder` is always available and fully offline;
//! the `fastembed` feature adds the multilingual MiniLM sentence encoder.

mod discovery;
mod engine;
#[cfg(feature = "fastembed")]
mod fastembed;
mod hash;

pub use discovery::find_model_cache_dir;
pub use engine::{VectorEngine, DEFAULT_CACHE_CAPACITY};
#[cfg(feature = "fastembed")]
pub use self::fastembed::FastEmbedProvider;
pub use hash::HashEmbedder;

use crate::error::Result;

/// A deterministic text -> fixed-length vector encoder
pub trait EmbeddingProvider: Send + Sync {
    /// Encode a single text
    fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Encode many texts, preserving order
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.encode(text)).collect()
    }

    /// Output dimensionality
    fn dimension(&self) -> usize;

    /// Identifier recorded alongside precomputed embeddings
    fn model_name(&self) -> &str;
}
