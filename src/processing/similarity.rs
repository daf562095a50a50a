//! Phrase-level and document-level similarity

use crate::processing::embeddings::{cosine_similarity, SentenceEmbedder};
use crate::processing::tfidf::{self, TfIdfVectorizer};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Partition of a job skill set against one candidate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhraseMatch {
    pub matched: BTreeSet<String>,
    pub missing: BTreeSet<String>,
}

/// Whole-text similarity of a résumé against the job description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentScore {
    pub lexical: f64,
    pub semantic: f64,
    /// Blend of both on a 0-100 scale, two decimals
    pub percent: f64,
    pub warnings: Vec<String>,
}

pub struct SimilarityMatcher {
    embedder: Arc<dyn SentenceEmbedder>,
}

impl SimilarityMatcher {
    pub fn new(embedder: Arc<dyn SentenceEmbedder>) -> Self {
        Self { embedder }
    }

    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Split job phrases into matched and missing against the candidate's phrases.
    ///
    /// Every phrase is a mini-document in a TF-IDF space fitted on both lists.
    /// A job phrase is matched when its best cosine against any candidate
    /// phrase reaches `threshold`.
    pub fn match_phrases(
        &self,
        job_phrases: &BTreeSet<String>,
        candidate_phrases: &BTreeSet<String>,
        threshold: f64,
    ) -> PhraseMatch {
        let all_missing = || PhraseMatch {
            matched: BTreeSet::new(),
            missing: job_phrases.clone(),
        };

        if job_phrases.is_empty() || candidate_phrases.is_empty() {
            return all_missing();
        }

        let corpus: Vec<&str> = candidate_phrases
            .iter()
            .chain(job_phrases.iter())
            .map(String::as_str)
            .collect();

        let vectorizer = match TfIdfVectorizer::fit(&corpus) {
            Ok(vectorizer) => vectorizer,
            Err(e) => {
                debug!("Phrase vocabulary is empty ({}); every job phrase is missing", e);
                return all_missing();
            }
        };

        let candidate_vectors: Vec<_> = candidate_phrases
            .iter()
            .map(|phrase| vectorizer.transform(phrase))
            .collect();

        let mut result = PhraseMatch::default();
        for phrase in job_phrases {
            let vector = vectorizer.transform(phrase);
            let best = candidate_vectors
                .iter()
                .map(|candidate| vector.cosine(candidate))
                .fold(0.0, f64::max);

            if best >= threshold {
                result.matched.insert(phrase.clone());
            } else {
                result.missing.insert(phrase.clone());
            }
        }

        result
    }

    /// Blend lexical TF-IDF and semantic embedding similarity of two full texts
    pub fn document_score(&self, job_text: &str, candidate_text: &str) -> DocumentScore {
        let mut warnings = Vec::new();

        let lexical = match tfidf::document_similarity(job_text, candidate_text) {
            Ok(score) => score,
            Err(e) => {
                debug!("Lexical similarity defaults to 0: {}", e);
                0.0
            }
        };

        let semantic = match self.semantic_similarity(job_text, candidate_text) {
            Ok(score) => score,
            Err(e) => {
                let warning = format!("Semantic similarity unavailable: {}", e);
                warn!("{}", warning);
                warnings.push(warning);
                0.0
            }
        };

        DocumentScore {
            lexical,
            semantic,
            percent: blend_percent(lexical, semantic),
            warnings,
        }
    }

    fn semantic_similarity(&self, a: &str, b: &str) -> crate::error::Result<f64> {
        let left = self.embedder.embed(a)?;
        let right = self.embedder.embed(b)?;
        let score = cosine_similarity(&left, &right)? as f64;
        Ok(if score.is_finite() { score } else { 0.0 })
    }
}

/// `((lexical + semantic) / 2) * 100`, two decimals, within 0-100
pub fn blend_percent(lexical: f64, semantic: f64) -> f64 {
    round2((lexical + semantic) / 2.0 * 100.0).clamp(0.0, 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
