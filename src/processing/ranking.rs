//! Multi-factor candidate ranking with a skill-gap penalty

use crate::config::{RankingConfig, SelectionConfig};
use crate::processing::features::ProfileFeatures;
use crate::processing::proficiency::{mean_factor, ProficiencyLevel};
use crate::processing::similarity::{round2, DocumentScore, PhraseMatch};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Final scored view of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    /// Document-level similarity, 0-100 with two decimals
    pub match_score_percent: f64,
    pub lexical_similarity: f64,
    pub semantic_similarity: f64,
    pub matched_skills: BTreeSet<String>,
    pub missing_skills: BTreeSet<String>,
    pub proficiency: BTreeMap<String, ProficiencyLevel>,
    pub rank_score: f64,
    pub penalty: f64,
    /// `max(match_score_percent - penalty, 0)`, two decimals
    pub final_score: f64,
    pub features: ProfileFeatures,
    pub degraded: bool,
    pub warnings: Vec<String>,
}

impl MatchResult {
    pub fn matched_count(&self) -> usize {
        self.matched_skills.len()
    }

    pub fn has_all_skills(&self, skills: &BTreeSet<String>) -> bool {
        skills.is_subset(&self.matched_skills)
    }
}

/// Everything measured about one candidate before ranking
#[derive(Debug, Clone, Default)]
pub struct CandidateAssessment {
    pub candidate_id: String,
    pub document: DocumentScore,
    pub phrases: PhraseMatch,
    pub proficiency: BTreeMap<String, ProficiencyLevel>,
    pub features: ProfileFeatures,
    pub warnings: Vec<String>,
}

pub struct RankingEngine {
    config: RankingConfig,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(RankingConfig::default())
    }
}

impl RankingEngine {
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// `w1·match + w2·|matched| + w3·factor·100`
    pub fn rank_score(&self, match_percent: f64, matched_count: usize, proficiency_factor: f64) -> f64 {
        self.config.match_weight * match_percent
            + self.config.common_weight * matched_count as f64
            + self.config.proficiency_weight * proficiency_factor * 100.0
    }

    pub fn penalty(&self, missing_count: usize) -> f64 {
        self.config.penalty_per_missing_skill * missing_count as f64
    }

    pub fn final_score(&self, match_percent: f64, penalty: f64) -> f64 {
        round2((match_percent - penalty).max(0.0))
    }

    /// Aggregate one assessment into its ranked result
    pub fn score(&self, assessment: CandidateAssessment) -> MatchResult {
        let CandidateAssessment {
            candidate_id,
            document,
            phrases,
            proficiency,
            features,
            mut warnings,
        } = assessment;

        let factor = mean_factor(
            phrases
                .matched
                .iter()
                .map(|skill| proficiency.get(skill).unwrap_or(&ProficiencyLevel::Unknown)),
        );

        let match_percent = document.percent;
        let penalty = self.penalty(phrases.missing.len());
        warnings.extend(document.warnings);

        MatchResult {
            rank_score: self.rank_score(match_percent, phrases.matched.len(), factor),
            final_score: self.final_score(match_percent, penalty),
            penalty,
            candidate_id,
            match_score_percent: match_percent,
            lexical_similarity: document.lexical,
            semantic_similarity: document.semantic,
            matched_skills: phrases.matched,
            missing_skills: phrases.missing,
            proficiency,
            features,
            degraded: false,
            warnings,
        }
    }

    /// Placeholder for a candidate whose processing failed: zero scores, every job skill missing
    pub fn degraded(&self, candidate_id: String, job_skills: &BTreeSet<String>, reason: String) -> MatchResult {
        let penalty = self.penalty(job_skills.len());

        MatchResult {
            candidate_id,
            match_score_percent: 0.0,
            lexical_similarity: 0.0,
            semantic_similarity: 0.0,
            matched_skills: BTreeSet::new(),
            missing_skills: job_skills.clone(),
            proficiency: BTreeMap::new(),
            rank_score: 0.0,
            penalty,
            final_score: self.final_score(0.0, penalty),
            features: ProfileFeatures::default(),
            degraded: true,
            warnings: vec![reason],
        }
    }
}

/// Descending rank score, then descending final score, then ascending candidate id
pub fn compare_results(a: &MatchResult, b: &MatchResult) -> Ordering {
    b.rank_score
        .total_cmp(&a.rank_score)
        .then_with(|| b.final_score.total_cmp(&a.final_score))
        .then_with(|| a.candidate_id.cmp(&b.candidate_id))
}

pub fn sort_results(results: &mut [MatchResult]) {
    results.sort_by(compare_results);
}

/// Eligibility filters applied before top-K selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateFilter {
    pub min_match_score: f64,
    pub min_matched_skills: usize,
    /// Candidates must have matched every one of these
    pub required_skills: BTreeSet<String>,
}

impl CandidateFilter {
    pub fn from_config(selection: &SelectionConfig) -> Self {
        Self {
            min_match_score: selection.min_match_score,
            min_matched_skills: selection.min_matched_skills,
            required_skills: BTreeSet::new(),
        }
    }

    pub fn with_required_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.required_skills = skills
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn is_noop(&self) -> bool {
        self.min_match_score <= 0.0 && self.min_matched_skills == 0 && self.required_skills.is_empty()
    }

    pub fn accepts(&self, result: &MatchResult) -> bool {
        result.match_score_percent >= self.min_match_score
            && result.matched_count() >= self.min_matched_skills
            && result.has_all_skills(&self.required_skills)
    }
}

/// Positions in `ranked` of the first `k` candidates the filter accepts.
///
/// Positions rather than ids, so candidates sharing an id stay distinct.
pub fn select_positions(ranked: &[MatchResult], k: usize, filter: &CandidateFilter) -> Vec<usize> {
    ranked
        .iter()
        .enumerate()
        .filter(|(_, result)| filter.accepts(result))
        .map(|(position, _)| position)
        .take(k)
        .collect()
}

/// Top-K among eligible candidates; everyone else is rejected.
///
/// Both lists keep the ranking order of `ranked`.
pub fn select_candidates(
    ranked: Vec<MatchResult>,
    k: usize,
    filter: &CandidateFilter,
) -> (Vec<MatchResult>, Vec<MatchResult>) {
    let chosen: HashSet<usize> = select_positions(&ranked, k, filter).into_iter().collect();

    let (selected, rejected): (Vec<_>, Vec<_>) = ranked
        .into_iter()
        .enumerate()
        .partition(|(position, _)| chosen.contains(position));

    let strip = |pairs: Vec<(usize, MatchResult)>| -> Vec<MatchResult> {
        pairs.into_iter().map(|(_, result)| result).collect()
    };
    (strip(selected), strip(rejected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn assessment(id: &str, percent: f64, matched: &[&str], missing: &[&str]) -> CandidateAssessment {
        CandidateAssessment {
            candidate_id: id.to_string(),
            document: DocumentScore {
                percent,
                ..DocumentScore::default()
            },
            phrases: PhraseMatch {
                matched: set(matched),
                missing: set(missing),
            },
            ..CandidateAssessment::default()
        }
    }

    #[test]
    fn test_penalty_and_final_score() {
        let engine = RankingEngine::default();
        let result = engine.score(assessment("a", 40.0, &["python", "sql"], &["project management"]));

        assert_eq!(result.penalty, 2.5);
        assert_eq!(result.final_score, 37.5);
    }

    #[test]
    fn test_final_score_floors_at_zero() {
        let engine = RankingEngine::default();
        let result = engine.score(assessment("a", 3.0, &[], &["a1", "b1", "c1"]));
        assert_eq!(result.penalty, 7.5);
        assert_eq!(result.final_score, 0.0);
    }

    #[test]
    fn test_rank_score_uses_matched_proficiency() {
        let engine = RankingEngine::default();
        let mut input = assessment("a", 60.0, &["python", "sql"], &[]);
        input.proficiency.insert("python".to_string(), ProficiencyLevel::Advanced);
        input.proficiency.insert("sql".to_string(), ProficiencyLevel::Intermediate);
        // Unmatched skills do not count toward the factor
        input.proficiency.insert("cobol".to_string(), ProficiencyLevel::Beginner);

        let result = engine.score(input);
        let expected = 0.5 * 60.0 + 0.3 * 2.0 + 0.2 * 0.75 * 100.0;
        assert!((result.rank_score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_no_matched_skills_means_zero_factor() {
        let engine = RankingEngine::default();
        let result = engine.score(assessment("a", 50.0, &[], &[]));
        assert!((result.rank_score - 25.0).abs() < 1e-9);
        assert_eq!(result.penalty, 0.0);
    }

    #[test]
    fn test_ordering_breaks_ties_deterministically() {
        let engine = RankingEngine::default();
        let mut results = vec![
            engine.score(assessment("zoe", 50.0, &[], &[])),
            engine.score(assessment("amy", 50.0, &[], &[])),
            engine.score(assessment("bob", 80.0, &[], &[])),
            engine.score(assessment("cal", 50.0, &[], &["x1", "y1"])),
        ];
        sort_results(&mut results);

        let ids: Vec<&str> = results.iter().map(|r| r.candidate_id.as_str()).collect();
        // cal ties amy and zoe on rank but has a lower final score
        assert_eq!(ids, vec!["bob", "amy", "zoe", "cal"]);
    }

    #[test]
    fn test_top_k_is_clamped() {
        let engine = RankingEngine::default();
        let results = vec![
            engine.score(assessment("a", 10.0, &[], &[])),
            engine.score(assessment("b", 5.0, &[], &[])),
        ];

        let filter = CandidateFilter::default();
        let (selected, rejected) = select_candidates(results.clone(), 10, &filter);
        assert_eq!(selected.len(), 2);
        assert!(rejected.is_empty());

        let (selected, rejected) = select_candidates(results, 0, &filter);
        assert!(selected.is_empty());
        assert_eq!(rejected.len(), 2);
    }

    #[test]
    fn test_degraded_result() {
        let engine = RankingEngine::default();
        let job = set(&["python", "sql"]);
        let result = engine.degraded("broken".to_string(), &job, "task panicked".to_string());

        assert!(result.degraded);
        assert!(result.matched_skills.is_empty());
        assert_eq!(result.missing_skills, job);
        assert_eq!(result.final_score, 0.0);
        assert_eq!(result.rank_score, 0.0);
        assert_eq!(result.warnings, vec!["task panicked"]);
    }

    #[test]
    fn test_filters_feed_selection() {
        let engine = RankingEngine::default();
        let mut results = vec![
            engine.score(assessment("a", 90.0, &["python"], &["sql"])),
            engine.score(assessment("b", 70.0, &["python", "sql"], &[])),
            engine.score(assessment("c", 20.0, &["python", "sql"], &[])),
        ];
        sort_results(&mut results);

        let filter = CandidateFilter {
            min_match_score: 50.0,
            ..CandidateFilter::default()
        }
        .with_required_skills(["SQL"]);

        let (selected, rejected) = select_candidates(results, 3, &filter);
        let selected_ids: Vec<&str> = selected.iter().map(|r| r.candidate_id.as_str()).collect();
        let rejected_ids: Vec<&str> = rejected.iter().map(|r| r.candidate_id.as_str()).collect();

        assert_eq!(selected_ids, vec!["b"]);
        assert_eq!(rejected_ids, vec!["a", "c"]);
    }

    #[test]
    fn test_selection_keeps_candidates_sharing_an_id() {
        let engine = RankingEngine::default();
        let results = vec![
            engine.score(assessment("resume", 80.0, &[], &[])),
            engine.score(assessment("resume", 40.0, &[], &[])),
        ];

        assert_eq!(select_positions(&results, 1, &CandidateFilter::default()), vec![0]);

        let (selected, rejected) = select_candidates(results, 1, &CandidateFilter::default());
        assert_eq!(selected.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(selected[0].match_score_percent, 80.0);
        assert_eq!(rejected[0].match_score_percent, 40.0);
    }
}
