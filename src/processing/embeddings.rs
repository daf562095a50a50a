//! Dense sentence embeddings for semantic similarity

use crate::config::HASHING_EMBEDDER;
use crate::error::{CvMatcherError, Result};
use crate::processing::text_processor::TextProcessor;
use log::{info, warn};
use model2vec_rs::model::StaticModel;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

/// Produces a dense vector for a piece of text.
///
/// Implementations are shared read-only across worker tasks.
pub trait SentenceEmbedder: Send + Sync {
    fn name(&self) -> &str;

    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Model2Vec static embedding model
pub struct StaticModelEmbedder {
    model: StaticModel,
    model_name: String,
}

impl StaticModelEmbedder {
    /// Load from a local folder or a Hugging Face repo id
    pub fn load(repo_or_path: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", repo_or_path);

        let model = StaticModel::from_pretrained(repo_or_path, None, None, None)
            .map_err(|e| CvMatcherError::ModelLoading(format!("Failed to load model '{}': {}", repo_or_path, e)))?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: repo_or_path.to_string(),
        })
    }
}

impl SentenceEmbedder for StaticModelEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.model.encode_single(text);
        if embedding.is_empty() {
            return Err(CvMatcherError::Embedding(format!(
                "model '{}' returned an empty embedding",
                self.model_name
            )));
        }
        Ok(embedding)
    }
}

const HASH_SEED_K0: u64 = 0x5eed_0f_c0ffee_01;
const HASH_SEED_K1: u64 = 0x0dd_ba11_cafe_f00d;
pub const DEFAULT_HASH_DIMENSION: usize = 256;

/// Deterministic signed feature-hashing embedder.
///
/// Needs no model files. Unigrams and bigrams of content tokens are hashed
/// into a fixed number of buckets with a fixed seed, then L2-normalized.
pub struct HashingEmbedder {
    dimension: usize,
    processor: TextProcessor,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            processor: TextProcessor::new(),
        }
    }

    fn hash_feature(&self, feature: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        feature.hash(&mut hasher);
        hasher.finish()
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = self.hash_feature(feature);
        let index = (hash % self.dimension as u64) as usize;
        // Top bit picks the sign so collisions tend to cancel
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

impl SentenceEmbedder for HashingEmbedder {
    fn name(&self) -> &str {
        "feature-hashing"
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = self.processor.content_tokens(text);
        let mut vector = vec![0.0f32; self.dimension];

        for token in &tokens {
            self.add_feature(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            self.add_feature(&mut vector, &format!("{} {}", pair[0], pair[1]), 0.5);
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        Ok(vector)
    }
}

/// Build the configured embedder, falling back to feature hashing when the model cannot load.
///
/// `None` or `"hashing"` selects feature hashing directly.
pub fn load_embedder(model: Option<&str>) -> Arc<dyn SentenceEmbedder> {
    match model {
        None | Some(HASHING_EMBEDDER) => Arc::new(HashingEmbedder::default()),
        Some(repo_or_path) => match StaticModelEmbedder::load(repo_or_path) {
            Ok(embedder) => Arc::new(embedder),
            Err(e) => {
                warn!("{}; falling back to the feature-hashing embedder", e);
                Arc::new(HashingEmbedder::default())
            }
        },
    }
}

/// Calculate cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(CvMatcherError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Ok(0.0);
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok((dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0))
    }
}
