//! Neural sentence embeddings via fastembed
//!
//! Uses paraphrase-multilingual-MiniLM-L12-v2 (384 dimensions), which handles
//! non-English pain points as well as English ones.

use super::discovery::find_model_cache_dir;
use super::EmbeddingProvider;
use crate::error::{Result, SolutionError};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use std::path::PathBuf;

const MODEL_NAME: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";
const DIMENSION: usize = 384;

/// fastembed wrapper
///
/// The ONNX session is not reentrant, so calls are serialized through a mutex.
pub struct FastEmbedProvider {
    model: Mutex<TextEmbedding>,
    batch_size: Option<usize>,
}

impl FastEmbedProvider {
    /// Load the model, downloading it into the cache directory on first use
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = find_model_cache_dir(cache_dir)?;
        std::fs::create_dir_all(&cache_dir)?;

        log::info!("Loading {} (cache: {})", MODEL_NAME, cache_dir.display());

        let options = InitOptions::new(EmbeddingModel::ParaphraseMLMiniLML12V2)
            .with_cache_dir(cache_dir)
            .with_show_download_progress(false);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| SolutionError::model(format!("Failed to load {MODEL_NAME}: {e}")))?;

        Ok(Self {
            model: Mutex::new(model),
            batch_size: None,
        })
    }

    /// Override fastembed's default batch size for catalog encoding
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.encode_batch(&[text])?;
        embeddings
            .pop()
            .ok_or_else(|| SolutionError::embedding("Encoder returned no vector"))
    }

    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let model = self.model.lock();
        model
            .embed(texts.to_vec(), self.batch_size)
            .map_err(|e| SolutionError::embedding(format!("Failed to encode texts: {e}")))
    }

    fn dimension(&self) -> usize {
        DIMENSION
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }
}
