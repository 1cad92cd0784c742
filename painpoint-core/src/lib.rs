//! Painpoint Core
//!
//! Matches a free-text pain point against a product feature catalog and
//! returns a ranked shortlist of the features that address it.
//!
//! ## Features
//!
//! - **Hybrid scoring** - weighted keyword-cue overlap + embedding cosine similarity
//! - **Precomputed catalog embeddings** - encoded once, paired with records at load
//! - **Pluggable encoders** - deterministic hash embeddings, or fastembed MiniLM
//!   behind the `fastembed` feature
//!
//! ## Example
//!
//! ```ignore
//! use painpoint_core::{Catalog, FinderConfig, HashEmbedder, SolutionFinder, TextNormalizer};
//!
//! let catalog = Catalog::load("knowledge_base.json", "kb.bin", &TextNormalizer::default())?;
//! let finder = SolutionFinder::new(
//!     Arc::new(catalog),
//!     Arc::new(HashEmbedder::default()),
//!     FinderConfig::default().with_alpha(0.2),
//! )?;
//!
//! let solutions = finder.find_solutions("Too many repetitive support questions", 3)?;
//! println!("{}", serde_json::to_string_pretty(&solutions)?);
//! ```

pub mod catalog;
pub mod embedding;
pub mod error;
pub mod normalize;
pub mod scoring;
pub mod search;

// Re-exports for convenience
pub use catalog::{
    build_embeddings, load_features, Catalog, CatalogEntry, EmbeddingSet, FeatureRecord,
    NormalizedCues,
};
#[cfg(feature = "fastembed")]
pub use embedding::FastEmbedProvider;
pub use embedding::{EmbeddingProvider, HashEmbedder, VectorEngine, DEFAULT_CACHE_CAPACITY};
pub use error::{Result, SolutionError};
pub use normalize::{normalize_text, NormalizerConfig, TextNormalizer};
pub use scoring::{cosine_similarity, EntryScore, ScoringEngine};
pub use search::{FinderConfig, ScoredResult, SolutionFinder, SuggestedSolutions, DEFAULT_LIMIT};
