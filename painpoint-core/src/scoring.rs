//! Relevance scoring
//!
//! Per-entry keyword and semantic scores and their weighted combination.
//! Nothing in here fails: degenerate inputs score zero.

use crate::catalog::{CatalogEntry, NormalizedCues};
use crate::error::{Result, SolutionError};

const KEYWORD_WEIGHT: usize = 1;
const PAIN_POINT_WEIGHT: usize = 2;

/// Weighted fraction of cues whose normalized text occurs inside the
/// normalized query. Empty cues never match but still count toward the total.
pub fn keyword_score(normalized_query: &str, cues: &NormalizedCues) -> f32 {
    let is_hit = |cue: &&String| !cue.is_empty() && normalized_query.contains(cue.as_str());

    let matched = cues.keywords.iter().filter(is_hit).count() * KEYWORD_WEIGHT
        + cues.pain_points.iter().filter(is_hit).count() * PAIN_POINT_WEIGHT;
    let total_possible =
        cues.keywords.len() * KEYWORD_WEIGHT + cues.pain_points.len() * PAIN_POINT_WEIGHT;

    if total_possible == 0 {
        0.0
    } else {
        matched as f32 / total_possible as f32
    }
}

/// Cosine similarity between two vectors; 0 for mismatched lengths or zero norms
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Cosine similarity floored at zero, clamped to [0, 1]
pub fn semantic_score(query_embedding: &[f32], feature_embedding: &[f32]) -> f32 {
    let similarity = cosine_similarity(query_embedding, feature_embedding);
    if similarity.is_finite() {
        similarity.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Scores for one catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryScore {
    pub keyword: f32,
    pub semantic: f32,
    pub relevance: f32,
}

/// Keyword/semantic blend with a fixed weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringEngine {
    alpha: f32,
}

impl ScoringEngine {
    /// `alpha` weighs the keyword score; `1 - alpha` weighs the semantic score
    pub fn new(alpha: f32) -> Result<Self> {
        if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
            return Err(SolutionError::config(format!(
                "alpha must be within [0, 1], got {alpha}"
            )));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn combine(&self, keyword: f32, semantic: f32) -> f32 {
        self.alpha * keyword + (1.0 - self.alpha) * semantic
    }

    pub fn score(
        &self,
        normalized_query: &str,
        query_embedding: &[f32],
        entry: &CatalogEntry,
    ) -> EntryScore {
        let keyword = keyword_score(normalized_query, &entry.cues);
        let semantic = semantic_score(query_embedding, &entry.embedding);
        EntryScore {
            keyword,
            semantic,
            relevance: self.combine(keyword, semantic),
        }
    }
}
