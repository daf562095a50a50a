//! Screening engine: runs every candidate through extraction, matching and ranking

use crate::config::Config;
use crate::error::{CvMatcherError, Result};
use crate::input::InputManager;
use crate::processing::document::{unique_candidate_ids, CandidateInput, Document};
use crate::processing::embeddings::{load_embedder, SentenceEmbedder};
use crate::processing::features::FeatureDetector;
use crate::processing::phrase_extractor::PhraseExtractor;
use crate::processing::proficiency::{ProficiencyEstimator, ProficiencyLevel};
use crate::processing::ranking::{compare_results, CandidateAssessment, MatchResult, RankingEngine};
use crate::processing::similarity::SimilarityMatcher;
use crate::processing::vocabulary::{Blocklist, SkillLexicon, VocabularyFilter};
use log::{debug, error, info};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Called once per finished candidate, in completion order
pub type ProgressCallback = Arc<dyn Fn(&MatchResult) + Send + Sync>;

/// Job description text with its extracted skill set, shared by every worker
#[derive(Debug, Clone, PartialEq)]
pub struct JobProfile {
    pub text: String,
    pub skills: BTreeSet<String>,
}

/// Read-only services shared across worker tasks
struct Services {
    threshold: f64,
    extractor: PhraseExtractor,
    vocabulary: VocabularyFilter,
    matcher: SimilarityMatcher,
    proficiency: ProficiencyEstimator,
    features: FeatureDetector,
    ranking: RankingEngine,
}

enum PendingCandidate {
    Text(Document),
    File { id: String, path: PathBuf },
}

pub struct ScreeningEngine {
    services: Arc<Services>,
    workers: usize,
}

impl ScreeningEngine {
    /// Build from explicit services
    pub fn new(config: &Config, vocabulary: VocabularyFilter, embedder: Arc<dyn SentenceEmbedder>) -> Self {
        let config = config.clone().validated();

        let services = Services {
            threshold: config.matching.similarity_threshold,
            extractor: PhraseExtractor::new(),
            vocabulary,
            matcher: SimilarityMatcher::new(embedder),
            proficiency: ProficiencyEstimator::new(),
            features: FeatureDetector::new(),
            ranking: RankingEngine::new(config.ranking.clone()),
        };

        Self {
            services: Arc::new(services),
            workers: config.processing.workers,
        }
    }

    /// Load the vocabulary lists and embedding model named in the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let blocklist = match &config.vocabulary.blocklist_path {
            Some(path) => Blocklist::load(path)?,
            None => Blocklist::default(),
        };

        let lexicon = config
            .vocabulary
            .lexicon_path
            .as_deref()
            .map(SkillLexicon::load)
            .transpose()?;

        let vocabulary = VocabularyFilter::new(config.matching.vocabulary_mode, blocklist, lexicon);
        let embedder = load_embedder(config.models.embedding_model.as_deref());

        info!(
            "Screening engine ready: {:?} vocabulary, {} embedder, {} workers",
            vocabulary.mode(),
            embedder.name(),
            config.processing.workers
        );

        Ok(Self::new(config, vocabulary, embedder))
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn embedder_name(&self) -> &str {
        self.services.matcher.embedder_name()
    }

    /// Skill phrases of one text after vocabulary filtering
    pub fn extract_skills(&self, text: &str) -> BTreeSet<String> {
        self.services.extract_skills(text)
    }

    /// Skills of one text with their estimated proficiency
    pub fn skill_profile(&self, text: &str) -> BTreeMap<String, ProficiencyLevel> {
        let skills = self.extract_skills(text);
        self.services.proficiency.annotate(&skills, text)
    }

    pub fn job_profile(&self, job_text: &str) -> JobProfile {
        let skills = self.extract_skills(job_text);
        info!("Job description yields {} skills", skills.len());
        debug!("Job skills: {:?}", skills);

        JobProfile {
            text: job_text.to_string(),
            skills,
        }
    }

    /// Score one candidate synchronously
    pub fn assess(&self, job: &JobProfile, candidate: Document) -> MatchResult {
        self.services.assess(job, candidate)
    }

    /// Screen in-memory candidates against a job description, ranked
    pub async fn screen_texts(&self, job_text: &str, candidates: Vec<CandidateInput>) -> Vec<MatchResult> {
        let job = self.job_profile(job_text);
        let pending = candidates
            .into_iter()
            .map(|candidate| PendingCandidate::Text(candidate.into()))
            .collect();

        self.run(job, pending, None).await
    }

    /// Screen candidate files against an already profiled job.
    ///
    /// Unreadable files produce degraded results. Ids are file stems, made
    /// unique across the batch.
    pub async fn screen_files(
        &self,
        job: &JobProfile,
        paths: &[PathBuf],
        progress: Option<ProgressCallback>,
    ) -> Vec<MatchResult> {
        let pending = unique_candidate_ids(paths)
            .into_iter()
            .zip(paths.iter().cloned())
            .map(|(id, path)| PendingCandidate::File { id, path })
            .collect();

        self.run(job.clone(), pending, progress).await
    }

    async fn run(
        &self,
        job: JobProfile,
        pending: Vec<PendingCandidate>,
        progress: Option<ProgressCallback>,
    ) -> Vec<MatchResult> {
        if pending.is_empty() {
            return Vec::new();
        }

        let start_time = Instant::now();
        let job = Arc::new(job);
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        let mut outstanding: BTreeMap<usize, String> = BTreeMap::new();

        info!("Screening {} candidates with {} workers", pending.len(), self.workers);

        for (index, candidate) in pending.into_iter().enumerate() {
            let candidate_id = match &candidate {
                PendingCandidate::Text(document) => document.id.clone(),
                PendingCandidate::File { id, .. } => id.clone(),
            };
            outstanding.insert(index, candidate_id.clone());

            let services = Arc::clone(&self.services);
            let job = Arc::clone(&job);
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;

                let document = match candidate {
                    PendingCandidate::Text(document) => document,
                    PendingCandidate::File { id, path } => {
                        Document::from_extracted(id, InputManager::read_document(&path).await)
                    }
                };

                let worker_services = Arc::clone(&services);
                let worker_job = Arc::clone(&job);
                let result = match tokio::task::spawn_blocking(move || worker_services.assess(&worker_job, document)).await {
                    Ok(result) => result,
                    Err(e) => {
                        let failure = CvMatcherError::Candidate(format!("'{}' aborted: {}", candidate_id, e));
                        error!("{}", failure);
                        services.ranking.degraded(candidate_id, &job.skills, failure.to_string())
                    }
                };

                (index, result)
            });
        }

        let mut results = Vec::with_capacity(outstanding.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => {
                    outstanding.remove(&index);
                    if let Some(callback) = &progress {
                        callback(&result);
                    }
                    results.push((index, result));
                }
                Err(e) => error!("Candidate task failed to complete: {}", e),
            }
        }

        // Tasks lost without a result still get a row
        for (index, candidate_id) in outstanding {
            let failure = CvMatcherError::Candidate(format!("'{}' produced no result", candidate_id));
            let result = self.services.ranking.degraded(candidate_id, &job.skills, failure.to_string());
            if let Some(callback) = &progress {
                callback(&result);
            }
            results.push((index, result));
        }

        // Input order settles full ties, never completion order
        results.sort_by(|(a_index, a), (b_index, b)| compare_results(a, b).then_with(|| a_index.cmp(b_index)));
        info!("Screened {} candidates in {:.2?}", results.len(), start_time.elapsed());
        results.into_iter().map(|(_, result)| result).collect()
    }
}

impl Services {
    fn extract_skills(&self, text: &str) -> BTreeSet<String> {
        let phrases = self.extractor.extract(text);
        self.vocabulary.apply(&phrases)
    }

    fn assess(&self, job: &JobProfile, candidate: Document) -> MatchResult {
        let Document {
            id, text, warnings, ..
        } = candidate;

        if text.trim().is_empty() && !warnings.is_empty() {
            let mut result = self.ranking.degraded(id, &job.skills, "No usable text for candidate".to_string());
            let reason = std::mem::replace(&mut result.warnings, warnings);
            result.warnings.extend(reason);
            return result;
        }

        let skills = self.extract_skills(&text);
        let phrases = self.matcher.match_phrases(&job.skills, &skills, self.threshold);
        let document = self.matcher.document_score(&job.text, &text);

        let annotated: BTreeSet<&String> = skills.iter().chain(phrases.matched.iter()).collect();
        let proficiency = self.proficiency.annotate(annotated, &text);
        let features = self.features.detect(&text);

        debug!(
            "{}: {} skills, {} matched, {} missing, document score {:.2}",
            id,
            skills.len(),
            phrases.matched.len(),
            phrases.missing.len(),
            document.percent
        );

        self.ranking.score(CandidateAssessment {
            candidate_id: id,
            document,
            phrases,
            proficiency,
            features,
            warnings,
        })
    }
}
