//! Encoder selection
//!
//! Turns CLI choices into a concrete `EmbeddingProvider`. The same choice
//! must be used for `embed` and for serving queries.

use crate::error::{ServerError, ServerResult};
use painpoint_core::embedding::EmbeddingProvider;
use painpoint_core::{HashEmbedder, DEFAULT_CACHE_CAPACITY};
use std::path::PathBuf;
use std::sync::Arc;

/// Available encoders
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EncoderKind {
    /// Deterministic FNV-1a hash embeddings, fully offline
    Hash,
    /// paraphrase-multilingual-MiniLM-L12-v2 via fastembed
    Fastembed,
}

/// Encoder settings
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub kind: EncoderKind,
    /// Output dimension for the hash encoder (default: 384)
    pub dimension: usize,
    /// Model cache directory for fastembed
    pub models_dir: Option<PathBuf>,
    /// Query embeddings kept in memory while serving
    pub cache_capacity: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            kind: EncoderKind::Hash,
            dimension: HashEmbedder::default().dimension(),
            models_dir: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Build the configured encoder
pub fn build_encoder(config: &EncoderConfig) -> ServerResult<Arc<dyn EmbeddingProvider>> {
    match config.kind {
        EncoderKind::Hash => {
            if config.dimension == 0 {
                return Err(ServerError::UnsupportedEncoder(
                    "hash encoder dimension must be positive".to_string(),
                ));
            }
            tracing::debug!("Using hash encoder ({}d)", config.dimension);
            Ok(Arc::new(HashEmbedder::new(config.dimension)))
        }
        EncoderKind::Fastembed => build_fastembed(config),
    }
}

#[cfg(feature = "fastembed")]
fn build_fastembed(config: &EncoderConfig) -> ServerResult<Arc<dyn EmbeddingProvider>> {
    let provider = painpoint_core::FastEmbedProvider::new(config.models_dir.clone())?;
    Ok(Arc::new(provider))
}

#[cfg(not(feature = "fastembed"))]
fn build_fastembed(_config: &EncoderConfig) -> ServerResult<Arc<dyn EmbeddingProvider>> {
    Err(ServerError::UnsupportedEncoder(
        "fastembed (rebuild with `--features fastembed`)".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_hash_384() {
        let config = EncoderConfig::default();
        assert_eq!(config.kind, EncoderKind::Hash);
        let encoder = build_encoder(&config).unwrap();
        assert_eq!(encoder.dimension(), 384);
        assert_eq!(encoder.model_name(), "fnv1a-hash-384");
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let config = EncoderConfig {
            dimension: 0,
            ..Default::default()
        };
        assert!(matches!(
            build_encoder(&config),
            Err(ServerError::UnsupportedEncoder(_))
        ));
    }

    #[cfg(not(feature = "fastembed"))]
    #[test]
    fn test_fastembed_requires_feature() {
        let config = EncoderConfig {
            kind: EncoderKind::Fastembed,
            ..Default::default()
        };
        let err = build_encoder(&config).err().unwrap();
        assert!(err.to_string().contains("--features fastembed"));
    }
}
