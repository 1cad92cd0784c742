//! Solution ranking
//!
//! Scores every catalog entry against a pain point, keeps the positive ones,
//! and returns the best `k`. Full scan per query; the catalog is small.

use serde::{Serialize, Serializer};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SolutionError};
use crate::normalize::TextNormalizer;
use crate::scoring::ScoringEngine;

/// Number of suggestions returned when the caller does not ask for a count
pub const DEFAULT_LIMIT: usize = 5;

/// Matcher configuration, fixed for the lifetime of a `SolutionFinder`
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Weight of the keyword score (default: 0.4); semantic gets `1 - alpha`
    pub alpha: f32,
    /// Results returned by `find_solutions_default` (default: 5)
    pub default_limit: usize,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            alpha: 0.4,
            default_limit: DEFAULT_LIMIT,
        }
    }
}

impl FinderConfig {
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ScoringEngine::new(self.alpha)?;
        if self.default_limit == 0 {
            return Err(SolutionError::config("default_limit must be positive"));
        }
        Ok(())
    }
}

/// Scores are kept unrounded for ranking and rounded only when serialized.
/// Exact halves round to the even neighbour (0.125 -> 0.12, 0.375 -> 0.38).
fn round2<S: Serializer>(value: &f32, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64((f64::from(*value) * 100.0).round_ties_even() / 100.0)
}

/// One suggested feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub feature_name: String,
    pub product_category: String,
    /// The feature's description
    pub how_it_helps: String,
    #[serde(serialize_with = "round2")]
    pub relevance_score: f32,
    #[serde(serialize_with = "round2")]
    pub keyword_score: f32,
    #[serde(serialize_with = "round2")]
    pub semantic_score: f32,
}

/// Ranked suggestions for one pain point
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuggestedSolutions {
    pub suggested_solutions: Vec<ScoredResult>,
}

impl SuggestedSolutions {
    pub fn len(&self) -> usize {
        self.suggested_solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suggested_solutions.is_empty()
    }
}

/// Hybrid keyword + semantic matcher over an immutable catalog
///
/// Stateless between calls, so one instance can serve concurrent queries.
pub struct SolutionFinder {
    catalog: Arc<Catalog>,
    provider: Arc<dyn EmbeddingProvider>,
    normalizer: TextNormalizer,
    scoring: ScoringEngine,
    config: FinderConfig,
}

impl SolutionFinder {
    /// Build a matcher, rejecting an encoder whose output space does not
    /// match the catalog's precomputed vectors
    pub fn new(
        catalog: Arc<Catalog>,
        provider: Arc<dyn EmbeddingProvider>,
        config: FinderConfig,
    ) -> Result<Self> {
        Self::with_normalizer(catalog, provider, config, TextNormalizer::default())
    }

    /// Same as `new`, with a custom normalizer. It must be the one the
    /// catalog's cues were normalized with.
    pub fn with_normalizer(
        catalog: Arc<Catalog>,
        provider: Arc<dyn EmbeddingProvider>,
        config: FinderConfig,
        normalizer: TextNormalizer,
    ) -> Result<Self> {
        config.validate()?;
        let scoring = ScoringEngine::new(config.alpha)?;

        if catalog.is_empty() {
            return Err(SolutionError::catalog("Knowledge base is empty"));
        }

        if provider.dimension() != catalog.dimension() {
            return Err(SolutionError::dimension_mismatch(format!(
                "Encoder {} produces {}d vectors but the catalog embeddings are {}d",
                provider.model_name(),
                provider.dimension(),
                catalog.dimension()
            )));
        }

        if provider.model_name() != catalog.model() {
            log::warn!(
                "Catalog embeddings were built with {} but queries use {}; \
                 semantic scores may be meaningless",
                catalog.model(),
                provider.model_name()
            );
        }

        log::info!(
            "SolutionFinder ready: {} features, alpha={}",
            catalog.len(),
            scoring.alpha()
        );

        Ok(Self {
            catalog,
            provider,
            normalizer,
            scoring,
            config,
        })
    }

    /// Rank catalog features for a pain point, returning at most `k`
    ///
    /// Only an encoder failure can make this return an error; a pain point
    /// that matches nothing yields an empty result.
    pub fn find_solutions(&self, pain_point: &str, k: usize) -> Result<SuggestedSolutions> {
        let normalized = self.normalizer.normalize(pain_point);
        let query_embedding = self.provider.encode(pain_point)?;

        let mut solutions: Vec<ScoredResult> = self
            .catalog
            .entries()
            .iter()
            .filter_map(|entry| {
                let score = self.scoring.score(&normalized, &query_embedding, entry);
                (score.relevance > 0.0).then(|| ScoredResult {
                    feature_name: entry.feature.feature_name.clone(),
                    product_category: entry.feature.product_category.clone(),
                    how_it_helps: entry.feature.description.clone(),
                    relevance_score: score.relevance,
                    keyword_score: score.keyword,
                    semantic_score: score.semantic,
                })
            })
            .collect();

        let qualifying = solutions.len();

        // Stable: equal scores keep catalog order
        solutions.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        solutions.truncate(k);

        log::debug!(
            "Pain point matched {}/{} features, returning {}",
            qualifying,
            self.catalog.len(),
            solutions.len()
        );

        Ok(SuggestedSolutions {
            suggested_solutions: solutions,
        })
    }

    /// `find_solutions` with the configured default limit
    pub fn find_solutions_default(&self, pain_point: &str) -> Result<SuggestedSolutions> {
        self.find_solutions(pain_point, self.config.default_limit)
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    pub fn alpha(&self) -> f32 {
        self.scoring.alpha()
    }
}
