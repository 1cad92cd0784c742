//! Matching service
//!
//! Owns the shared `SolutionFinder` and exposes async entry points suitable
//! for the tokio runtime. Loading is all-or-nothing: any catalog or
//! embedding problem aborts startup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use painpoint_core::{
    build_embeddings, load_features, Catalog, EmbeddingProvider, EmbeddingSet, FinderConfig,
    SolutionFinder, SuggestedSolutions, TextNormalizer, VectorEngine,
};
use serde_json::{json, Value};

use crate::encoder::{build_encoder, EncoderConfig};
use crate::error::{ServerError, ServerResult};

/// Everything needed to stand up a `SolutionService`
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub catalog_path: PathBuf,
    pub embeddings_path: PathBuf,
    pub finder: FinderConfig,
    pub encoder: EncoderConfig,
}

/// Query service shared by the CLI and the MCP server
pub struct SolutionService {
    finder: Arc<SolutionFinder>,
    /// Query encoder cache, when the finder was built by `load`
    engine: Option<Arc<VectorEngine>>,
}

impl SolutionService {
    /// Load catalog + embeddings and build the finder
    ///
    /// # Errors
    /// Returns error if either file is missing or unparsable, the catalog is
    /// empty, the counts or dimensions disagree, or the encoder fails to load.
    pub fn load(config: &ServiceConfig) -> ServerResult<Self> {
        tracing::info!("Loading knowledge base: {:?}", config.catalog_path);
        tracing::info!("Loading embeddings: {:?}", config.embeddings_path);

        let catalog = Catalog::load(
            &config.catalog_path,
            &config.embeddings_path,
            &TextNormalizer::default(),
        )
        .map_err(|e| {
            tracing::error!("Catalog load failed: {}", e);
            e
        })?;

        let encoder = build_encoder(&config.encoder)?;
        let engine = Arc::new(VectorEngine::with_capacity(
            encoder,
            config.encoder.cache_capacity,
        ));

        let finder = SolutionFinder::new(
            Arc::new(catalog),
            Arc::clone(&engine) as Arc<dyn EmbeddingProvider>,
            config.finder.clone(),
        )?;
        tracing::info!(
            "Loaded {} features (alpha={})",
            finder.catalog().len(),
            finder.alpha()
        );

        Ok(Self {
            finder: Arc::new(finder),
            engine: Some(engine),
        })
    }

    pub fn from_finder(finder: Arc<SolutionFinder>) -> Self {
        Self {
            finder,
            engine: None,
        }
    }

    /// Query embeddings currently held in memory
    pub fn cached_queries(&self) -> usize {
        self.engine.as_ref().map_or(0, |engine| engine.cache_size())
    }

    /// Rank features for a pain point, off the async executor
    pub async fn find_solutions(
        &self,
        pain_point: String,
        k: usize,
    ) -> ServerResult<SuggestedSolutions> {
        let finder = Arc::clone(&self.finder);
        let solutions = tokio::task::spawn_blocking(move || finder.find_solutions(&pain_point, k))
            .await
            .map_err(|e| ServerError::Task(e.to_string()))??;
        Ok(solutions)
    }

    pub fn default_limit(&self) -> usize {
        self.finder.config().default_limit
    }

    pub fn finder(&self) -> &Arc<SolutionFinder> {
        &self.finder
    }

    /// Feature listing without embeddings
    pub fn catalog_overview(&self) -> Value {
        let features: Vec<Value> = self
            .finder
            .catalog()
            .entries()
            .iter()
            .map(|entry| {
                json!({
                    "feature_name": entry.feature.feature_name,
                    "product_category": entry.feature.product_category,
                    "description": entry.feature.description,
                    "keywords": entry.feature.keywords,
                    "associated_pain_points": entry.feature.associated_pain_points,
                })
            })
            .collect();

        json!({
            "totalFeatures": features.len(),
            "features": features,
        })
    }

    /// Active engine settings
    pub fn settings(&self) -> Value {
        let catalog = self.finder.catalog();
        json!({
            "alpha": self.finder.alpha(),
            "defaultLimit": self.default_limit(),
            "embeddingModel": catalog.model(),
            "dimension": catalog.dimension(),
            "totalFeatures": catalog.len(),
            "queryCacheCapacity": self.engine.as_ref().map(|engine| engine.cache_capacity()),
        })
    }
}

/// Encode the knowledge base and write the embeddings file
pub fn generate_embeddings(
    catalog_path: &Path,
    output_path: &Path,
    encoder: &EncoderConfig,
) -> ServerResult<EmbeddingSet> {
    tracing::info!("Loading knowledge base: {:?}", catalog_path);
    let features = load_features(catalog_path)?;

    let provider = build_encoder(encoder)?;
    let embeddings = build_embeddings(&features, provider.as_ref())?;
    embeddings.save(output_path)?;

    tracing::info!(
        "Saved {} embeddings ({}d) to {:?}",
        embeddings.len(),
        embeddings.dimension,
        output_path
    );
    Ok(embeddings)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use painpoint_core::FeatureRecord;

    pub(crate) fn sample_features() -> Vec<FeatureRecord> {
        vec![
            FeatureRecord {
                feature_name: "AI Agent".to_string(),
                product_category: "Conversations".to_string(),
                description: "Automates repetitive support answers.".to_string(),
                keywords: vec!["chatbot".to_string(), "faq".to_string()],
                associated_pain_points: vec!["high volume of repetitive questions".to_string()],
            },
            FeatureRecord {
                feature_name: "Survey Insights".to_string(),
                product_category: "Voice of Customer".to_string(),
                description: "Groups open-ended survey responses into themes.".to_string(),
                keywords: vec!["survey".to_string(), "themes".to_string()],
                associated_pain_points: vec!["analyzing open-ended responses".to_string()],
            },
            FeatureRecord {
                feature_name: "Customer 360".to_string(),
                product_category: "Customer Data".to_string(),
                description: "Unified timeline of every customer interaction.".to_string(),
                keywords: vec!["profile".to_string(), "history".to_string()],
                associated_pain_points: vec!["no single view of interaction history".to_string()],
            },
        ]
    }

    /// Writes the sample catalog and its hash embeddings into `dir`
    pub(crate) fn write_fixture(dir: &Path) -> ServiceConfig {
        let catalog_path = dir.join("knowledge_base.json");
        let embeddings_path = dir.join("kb.bin");
        std::fs::write(
            &catalog_path,
            serde_json::to_string_pretty(&sample_features()).unwrap(),
        )
        .unwrap();

        let encoder = EncoderConfig::default();
        generate_embeddings(&catalog_path, &embeddings_path, &encoder).unwrap();

        ServiceConfig {
            catalog_path,
            embeddings_path,
            finder: FinderConfig::default().with_alpha(0.2),
            encoder,
        }
    }

    pub(crate) fn sample_service(dir: &Path) -> SolutionService {
        SolutionService::load(&write_fixture(dir)).unwrap()
    }

    #[tokio::test]
    async fn test_load_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let service = sample_service(dir.path());

        let result = service
            .find_solutions(
                "Our support agents are overwhelmed by the high volume of repetitive questions."
                    .to_string(),
                3,
            )
            .await
            .unwrap();

        assert!(!result.is_empty());
        assert!(result.len() <= 3);
        assert_eq!(result.suggested_solutions[0].feature_name, "AI Agent");
        assert!(result.suggested_solutions[0].keyword_score >= 0.5);
    }

    #[tokio::test]
    async fn test_unrelated_query_never_errors() {
        let dir = tempfile::tempdir().unwrap();
        let service = sample_service(dir.path());
        let result = service.find_solutions("zzz qqq".to_string(), 5).await.unwrap();
        assert!(result
            .suggested_solutions
            .iter()
            .all(|s| s.relevance_score > 0.0));
    }

    #[tokio::test]
    async fn test_query_cache_stays_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_fixture(dir.path());
        config.encoder.cache_capacity = 16;
        let service = SolutionService::load(&config).unwrap();

        for i in 0..200 {
            service
                .find_solutions(format!("repetitive questions, ticket {}", i), 3)
                .await
                .unwrap();
            assert!(service.cached_queries() <= 16);
        }
        assert_eq!(service.cached_queries(), 16);
        assert_eq!(service.settings()["queryCacheCapacity"], 16);
    }

    #[test]
    fn test_count_mismatch_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path());

        // Catalog grows after embeddings were generated
        let mut features = sample_features();
        features.push(features[0].clone());
        std::fs::write(
            &config.catalog_path,
            serde_json::to_string(&features).unwrap(),
        )
        .unwrap();

        let err = SolutionService::load(&config).err().unwrap();
        assert!(err.to_string().contains("4 features"));
    }

    #[test]
    fn test_encoder_dimension_mismatch_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_fixture(dir.path());
        config.encoder.dimension = 64;
        assert!(SolutionService::load(&config).is_err());
    }

    #[test]
    fn test_empty_catalog_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_fixture(dir.path());
        std::fs::write(&config.catalog_path, "[]").unwrap();
        assert!(SolutionService::load(&config).is_err());
    }

    #[test]
    fn test_missing_embeddings_aborts_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_fixture(dir.path());
        config.embeddings_path = dir.path().join("missing.bin");
        let err = SolutionService::load(&config).err().unwrap();
        assert!(err.to_string().contains("painpoint embed"));
    }

    #[test]
    fn test_overview_and_settings() {
        let dir = tempfile::tempdir().unwrap();
        let service = sample_service(dir.path());

        let overview = service.catalog_overview();
        assert_eq!(overview["totalFeatures"], 3);
        assert_eq!(overview["features"][1]["feature_name"], "Survey Insights");
        assert!(overview["features"][0].get("embedding").is_none());

        let settings = service.settings();
        assert_eq!(settings["dimension"], 384);
        assert_eq!(settings["defaultLimit"], 5);
        assert_eq!(settings["embeddingModel"], "fnv1a-hash-384");
    }
}
