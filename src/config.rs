//! Configuration management for the cv matcher

use crate::error::{CvMatcherError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_MATCH_WEIGHT: f64 = 0.5;
pub const DEFAULT_COMMON_WEIGHT: f64 = 0.3;
pub const DEFAULT_PROFICIENCY_WEIGHT: f64 = 0.2;
pub const DEFAULT_PENALTY_PER_MISSING_SKILL: f64 = 2.5;
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_EMBEDDING_MODEL: &str = "minishlab/potion-base-8M";
/// `models.embedding_model` value selecting the offline feature-hashing embedder
pub const HASHING_EMBEDDER: &str = "hashing";
pub const DEFAULT_COURSES_PER_SKILL: usize = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub matching: MatchingConfig,
    pub ranking: RankingConfig,
    pub selection: SelectionConfig,
    pub processing: ProcessingConfig,
    pub models: ModelConfig,
    pub vocabulary: VocabularyConfig,
    pub recommendations: RecommendationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum cosine similarity for a job phrase to count as matched
    pub similarity_threshold: f64,
    pub vocabulary_mode: VocabularyMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyMode {
    /// Open vocabulary: drop boilerplate phrases only
    Blocklist,
    /// Keep only phrases from the known-skills lexicon
    Lexicon,
    /// Blocklist first, then lexicon
    Combined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub match_weight: f64,
    pub common_weight: f64,
    pub proficiency_weight: f64,
    pub penalty_per_missing_skill: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub top_k: usize,
    pub min_match_score: f64,
    pub min_matched_skills: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub workers: usize,
    pub enable_caching: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model2Vec model: local folder or Hugging Face repo id, or `"hashing"`
    pub embedding_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    /// CSV course catalogue; recommendations are off without one
    pub catalogue_path: Option<PathBuf>,
    pub courses_per_skill: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    pub blocklist_path: Option<PathBuf>,
    pub lexicon_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            vocabulary_mode: VocabularyMode::Blocklist,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            match_weight: DEFAULT_MATCH_WEIGHT,
            common_weight: DEFAULT_COMMON_WEIGHT,
            proficiency_weight: DEFAULT_PROFICIENCY_WEIGHT,
            penalty_per_missing_skill: DEFAULT_PENALTY_PER_MISSING_SKILL,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_match_score: 0.0,
            min_matched_skills: 0,
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        Self {
            workers,
            enable_caching: true,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            embedding_model: Some(DEFAULT_EMBEDDING_MODEL.to_string()),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            catalogue_path: None,
            courses_per_skill: DEFAULT_COURSES_PER_SKILL,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| CvMatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
        Ok(config.validated())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CvMatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-matcher")
            .join("config.toml")
    }

    /// Clamp every numeric option into its valid range.
    ///
    /// Bad values never abort a run: out-of-range thresholds are clamped,
    /// non-finite or negative weights fall back to their defaults.
    pub fn validated(mut self) -> Self {
        let threshold = self.matching.similarity_threshold;
        self.matching.similarity_threshold = if threshold.is_finite() {
            threshold.clamp(0.0, 1.0)
        } else {
            warn!("Invalid similarity threshold {}, using default", threshold);
            DEFAULT_SIMILARITY_THRESHOLD
        };

        let ranking = &mut self.ranking;
        ranking.match_weight = sanitize_weight("match_weight", ranking.match_weight, DEFAULT_MATCH_WEIGHT);
        ranking.common_weight = sanitize_weight("common_weight", ranking.common_weight, DEFAULT_COMMON_WEIGHT);
        ranking.proficiency_weight = sanitize_weight(
            "proficiency_weight",
            ranking.proficiency_weight,
            DEFAULT_PROFICIENCY_WEIGHT,
        );
        ranking.penalty_per_missing_skill = sanitize_weight(
            "penalty_per_missing_skill",
            ranking.penalty_per_missing_skill,
            DEFAULT_PENALTY_PER_MISSING_SKILL,
        );

        let min_score = self.selection.min_match_score;
        self.selection.min_match_score = if min_score.is_finite() {
            min_score.clamp(0.0, 100.0)
        } else {
            0.0
        };

        self.processing.workers = self.processing.workers.max(1);
        self.recommendations.courses_per_skill = self.recommendations.courses_per_skill.max(1);
        self
    }
}

fn sanitize_weight(name: &str, value: f64, default: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!("Invalid value {} for {}, using default {}", value, name, default);
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.matching.similarity_threshold, 0.5);
        assert_eq!(config.ranking.match_weight, 0.5);
        assert_eq!(config.ranking.common_weight, 0.3);
        assert_eq!(config.ranking.proficiency_weight, 0.2);
        assert_eq!(config.ranking.penalty_per_missing_skill, 2.5);
        assert_eq!(config.matching.vocabulary_mode, VocabularyMode::Blocklist);
        assert!(config.processing.workers >= 1);
        assert_eq!(config.models.embedding_model.as_deref(), Some("minishlab/potion-base-8M"));
        assert_eq!(config.recommendations.catalogue_path, None);
        assert_eq!(config.recommendations.courses_per_skill, 1);
    }

    #[test]
    fn test_validated_clamps_bad_values() {
        let mut config = Config::default();
        config.matching.similarity_threshold = 3.0;
        config.ranking.common_weight = -1.0;
        config.ranking.match_weight = f64::NAN;
        config.selection.min_match_score = 250.0;
        config.processing.workers = 0;
        config.recommendations.courses_per_skill = 0;

        let config = config.validated();
        assert_eq!(config.matching.similarity_threshold, 1.0);
        assert_eq!(config.ranking.common_weight, DEFAULT_COMMON_WEIGHT);
        assert_eq!(config.ranking.match_weight, DEFAULT_MATCH_WEIGHT);
        assert_eq!(config.selection.min_match_score, 100.0);
        assert_eq!(config.processing.workers, 1);
        assert_eq!(config.recommendations.courses_per_skill, 1);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.selection.top_k = 7;
        config.matching.vocabulary_mode = VocabularyMode::Combined;
        config.models.embedding_model = Some(HASHING_EMBEDDER.to_string());
        config.recommendations.catalogue_path = Some(PathBuf::from("courses.csv"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\nsimilarity_threshold = 0.8\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.matching.similarity_threshold, 0.8);
        assert_eq!(loaded.ranking, RankingConfig::default());
    }

    #[test]
    fn test_malformed_config_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "matching = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, CvMatcherError::Configuration(_)));
    }
}
