//! Vector embedding engine
//!
//! Caching front for any `EmbeddingProvider`.

use super::EmbeddingProvider;
use crate::error::Result;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Query embeddings kept by `VectorEngine::new`
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Vector embedding engine with caching
///
/// Wraps a provider with a bounded LRU cache so repeated queries skip the
/// encoder. Itself an `EmbeddingProvider`, so it can be handed to the matcher
/// directly.
pub struct VectorEngine {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Mutex<LruCache<String, Vec<f32>>>,
}

impl VectorEngine {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_capacity(provider, DEFAULT_CACHE_CAPACITY)
    }

    /// A capacity of 0 is treated as 1
    pub fn with_capacity(provider: Arc<dyn EmbeddingProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        log::info!(
            "VectorEngine ready ({}, {}d, cache {})",
            provider.model_name(),
            provider.dimension(),
            capacity
        );

        Self {
            provider,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.lock().cap().get()
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }
}

impl EmbeddingProvider for VectorEngine {
    /// Generate embedding with caching
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.cache.lock().get(text) {
            return Ok(cached.clone());
        }

        // Lock is not held across the encoder call
        let embedding = self.provider.encode(text)?;
        self.cache.lock().put(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    /// Batch embed with caching
    fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results: Vec<Option<Vec<f32>>> = {
            let mut cache = self.cache.lock();
            texts.iter().map(|text| cache.get(*text).cloned()).collect()
        };

        let uncached: Vec<(usize, &str)> = results
            .iter()
            .enumerate()
            .filter(|(_, cached)| cached.is_none())
            .map(|(i, _)| (i, texts[i]))
            .collect();

        if uncached.is_empty() {
            return Ok(results.into_iter().flatten().collect());
        }

        let uncached_texts: Vec<&str> = uncached.iter().map(|(_, t)| *t).collect();
        let new_embeddings = self.provider.encode_batch(&uncached_texts)?;

        let mut cache = self.cache.lock();
        for ((idx, text), emb) in uncached.iter().zip(new_embeddings) {
            cache.put(text.to_string(), emb.clone());
            results[*idx] = Some(emb);
        }

        Ok(results.into_iter().flatten().collect())
    }

    fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    fn model_name(&self) -> &str {
        self.provider.model_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;

    fn engine() -> VectorEngine {
        VectorEngine::new(Arc::new(HashEmbedder::new(32)))
    }

    #[test]
    fn test_encode_populates_cache() {
        let engine = engine();
        let first = engine.encode("high volume of questions").unwrap();
        assert_eq!(engine.cache_size(), 1);
        let second = engine.encode("high volume of questions").unwrap();
        assert_eq!(first, second);
        assert_eq!(engine.cache_size(), 1);
    }

    #[test]
    fn test_batch_mixes_cached_and_new() {
        let engine = engine();
        let cached = engine.encode("alpha").unwrap();
        let batch = engine.encode_batch(&["beta", "alpha", "gamma"]).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[1], cached);
        assert_eq!(engine.cache_size(), 3);
    }

    #[test]
    fn test_cache_is_bounded() {
        let engine = VectorEngine::with_capacity(Arc::new(HashEmbedder::new(32)), 8);
        for i in 0..1000 {
            engine.encode(&format!("distinct pain point {}", i)).unwrap();
            assert!(engine.cache_size() <= 8);
        }
        assert_eq!(engine.cache_size(), 8);
        assert_eq!(engine.cache_capacity(), 8);
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let engine = VectorEngine::with_capacity(Arc::new(HashEmbedder::new(32)), 2);
        engine.encode("alpha").unwrap();
        engine.encode("beta").unwrap();
        engine.encode("alpha").unwrap();
        engine.encode("gamma").unwrap();

        assert_eq!(engine.cache_size(), 2);
        let cache = engine.cache.lock();
        assert!(cache.contains("alpha"));
        assert!(cache.contains("gamma"));
        assert!(!cache.contains("beta"));
    }

    #[test]
    fn test_batch_respects_capacity() {
        let engine = VectorEngine::with_capacity(Arc::new(HashEmbedder::new(32)), 2);
        let batch = engine.encode_batch(&["a1", "b2", "c3", "d4"]).unwrap();
        assert_eq!(batch.len(), 4);
        assert_eq!(engine.cache_size(), 2);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let engine = VectorEngine::with_capacity(Arc::new(HashEmbedder::new(32)), 0);
        engine.encode("alpha").unwrap();
        engine.encode("beta").unwrap();
        assert_eq!(engine.cache_size(), 1);
    }

    #[test]
    fn test_clear_cache() {
        let engine = engine();
        engine.encode("alpha").unwrap();
        engine.clear_cache();
        assert_eq!(engine.cache_size(), 0);
    }

    #[test]
    fn test_delegates_metadata() {
        let engine = engine();
        assert_eq!(engine.dimension(), 32);
        assert_eq!(engine.model_name(), "fnv1a-hash-32");
    }
}
