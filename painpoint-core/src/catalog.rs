//! Feature catalog
//!
//! Loads the knowledge base (JSON) and its precomputed embeddings (bincode),
//! then pairs them into `CatalogEntry` values exactly once. After
//! construction the catalog is immutable.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SolutionError};
use crate::normalize::TextNormalizer;

/// A product feature as stored in the knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub feature_name: String,
    pub product_category: String,
    pub description: String,
    /// Short lexical cues (weight 1)
    #[serde(default, deserialize_with = "lenient_cues")]
    pub keywords: Vec<String>,
    /// Longer problem phrases this feature solves (weight 2)
    #[serde(default, deserialize_with = "lenient_cues")]
    pub associated_pain_points: Vec<String>,
}

impl FeatureRecord {
    /// Text the catalog embedding is computed from
    pub fn embedding_text(&self) -> String {
        format!(
            "{} {}",
            self.description,
            self.associated_pain_points.join(" ")
        )
    }
}

/// Non-string cues become empty strings: they still count toward the
/// feature's total weight but can never match.
fn lenient_cues<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(|value| match value {
            Value::String(cue) => cue,
            other => {
                log::warn!("Ignoring non-string cue: {}", other);
                String::new()
            }
        })
        .collect())
}

/// Cues after normalization, ready for substring tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedCues {
    pub keywords: Vec<String>,
    pub pain_points: Vec<String>,
}

impl NormalizedCues {
    fn from_feature(feature: &FeatureRecord, normalizer: &TextNormalizer) -> Self {
        Self {
            keywords: feature
                .keywords
                .iter()
                .map(|k| normalizer.normalize(k))
                .collect(),
            pain_points: feature
                .associated_pain_points
                .iter()
                .map(|p| normalizer.normalize(p))
                .collect(),
        }
    }
}

/// A feature paired with its embedding
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub feature: FeatureRecord,
    pub embedding: Vec<f32>,
    pub cues: NormalizedCues,
}

/// Precomputed catalog embeddings, positionally aligned with the knowledge base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSet {
    /// Encoder that produced the vectors
    pub model: String,
    pub dimension: usize,
    pub vectors: Vec<Vec<f32>>,
}

impl EmbeddingSet {
    /// Wrap vectors, checking that they share one non-zero dimension
    pub fn new(model: impl Into<String>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = vectors.first().map(Vec::len).unwrap_or(0);
        let set = Self {
            model: model.into(),
            dimension,
            vectors,
        };
        set.validate()?;
        Ok(set)
    }

    fn validate(&self) -> Result<()> {
        if self.vectors.is_empty() {
            return Ok(());
        }
        if self.dimension == 0 {
            return Err(SolutionError::dimension_mismatch(
                "Embeddings have zero dimensions",
            ));
        }
        if let Some((idx, vector)) = self
            .vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != self.dimension)
        {
            return Err(SolutionError::dimension_mismatch(format!(
                "Embedding {} has {} dimensions, expected {}",
                idx,
                vector.len(),
                self.dimension
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Load from a bincode file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SolutionError::catalog(format!(
                "Embeddings file not found: {}. Run `painpoint embed` to generate it first.",
                path.display()
            )));
        }

        let bytes = fs::read(path)?;
        let set: Self = bincode::deserialize(&bytes)?;
        set.validate()?;

        log::info!(
            "Loaded {} precomputed embeddings ({}d, {}) from {}",
            set.len(),
            set.dimension,
            set.model,
            path.display()
        );
        Ok(set)
    }

    /// Write to a bincode file, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bincode::serialize(self)?)?;
        log::info!("Saved {} embeddings to {}", self.len(), path.display());
        Ok(())
    }
}

/// Load feature records from a JSON array
pub fn load_features(path: impl AsRef<Path>) -> Result<Vec<FeatureRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        SolutionError::catalog(format!(
            "Knowledge base file '{}' could not be read: {}",
            path.display(),
            e
        ))
    })?;
    let features: Vec<FeatureRecord> = serde_json::from_str(&text)?;
    log::debug!("Parsed {} features from {}", features.len(), path.display());
    Ok(features)
}

/// Encode every feature's description and pain points in one batch
pub fn build_embeddings(
    features: &[FeatureRecord],
    provider: &dyn EmbeddingProvider,
) -> Result<EmbeddingSet> {
    if features.is_empty() {
        return Err(SolutionError::catalog("Knowledge base is empty"));
    }

    let texts: Vec<String> = features.iter().map(FeatureRecord::embedding_text).collect();
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();

    log::info!(
        "Generating {} embeddings with {}",
        text_refs.len(),
        provider.model_name()
    );
    let vectors = provider.encode_batch(&text_refs)?;
    if vectors.len() != features.len() {
        return Err(SolutionError::embedding(format!(
            "Encoder returned {} vectors for {} texts",
            vectors.len(),
            features.len()
        )));
    }

    EmbeddingSet::new(provider.model_name(), vectors)
}

/// Immutable, validated collection of catalog entries
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    dimension: usize,
    model: String,
}

impl Catalog {
    /// Pair records with vectors by position, validating all load-time invariants
    pub fn from_parts(
        features: Vec<FeatureRecord>,
        embeddings: EmbeddingSet,
        normalizer: &TextNormalizer,
    ) -> Result<Self> {
        if features.is_empty() {
            return Err(SolutionError::catalog(
                "Knowledge base is empty or could not be loaded",
            ));
        }

        if features.len() != embeddings.len() {
            return Err(SolutionError::dimension_mismatch(format!(
                "Knowledge base has {} features but embeddings file has {} embeddings. \
                 Regenerate embeddings with `painpoint embed`.",
                features.len(),
                embeddings.len()
            )));
        }

        embeddings.validate()?;

        let EmbeddingSet {
            model,
            dimension,
            vectors,
        } = embeddings;

        let entries: Vec<CatalogEntry> = features
            .into_iter()
            .zip(vectors)
            .map(|(feature, embedding)| CatalogEntry {
                cues: NormalizedCues::from_feature(&feature, normalizer),
                feature,
                embedding,
            })
            .collect();

        log::info!("Catalog ready: {} features ({}d)", entries.len(), dimension);

        Ok(Self {
            entries,
            dimension,
            model,
        })
    }

    /// Load the knowledge base and embeddings files and pair them
    pub fn load(
        catalog_path: impl AsRef<Path>,
        embeddings_path: impl AsRef<Path>,
        normalizer: &TextNormalizer,
    ) -> Result<Self> {
        let features = load_features(catalog_path)?;
        let embeddings = EmbeddingSet::load(embeddings_path)?;
        Self::from_parts(features, embeddings, normalizer)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality shared by every entry
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Encoder recorded in the embeddings file
    pub fn model(&self) -> &str {
        &self.model
    }
}
