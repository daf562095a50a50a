//! Batch report handed to formatters and front-ends

use crate::config::Config;
use crate::output::summary::{BatchSummary, DEFAULT_TOP_SKILLS};
use crate::processing::ranking::{select_positions, CandidateFilter, MatchResult};
use crate::processing::recommendation::{CourseRecommendation, CourseRecommender};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub metadata: ReportMetadata,
    pub job_skills: BTreeSet<String>,
    /// Every candidate, ranked
    pub results: Vec<MatchResult>,
    /// Positions in `results` of the top-K eligible candidates, in rank order
    pub selected: Vec<usize>,
    pub summary: BatchSummary,
    /// Courses for skills some candidate is missing, keyed by skill
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub recommendations: BTreeMap<String, Vec<CourseRecommendation>>,
    pub config: Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub job_source: String,
    pub embedder: String,
    pub tool_version: String,
}

impl BatchReport {
    /// `results` must already be ranked
    pub fn new(
        results: Vec<MatchResult>,
        job_skills: BTreeSet<String>,
        config: &Config,
        filter: &CandidateFilter,
        job_source: impl Into<String>,
        embedder: impl Into<String>,
    ) -> Self {
        let selected = select_positions(&results, config.selection.top_k, filter);
        let summary = BatchSummary::compute(&results, &job_skills, selected.len(), DEFAULT_TOP_SKILLS);

        Self {
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                job_source: job_source.into(),
                embedder: embedder.into(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            job_skills,
            results,
            selected,
            summary,
            recommendations: BTreeMap::new(),
            config: config.clone(),
        }
    }

    /// Attach up to `per_skill` courses for every skill missing from some candidate
    pub fn with_recommendations(mut self, recommender: &CourseRecommender, per_skill: usize) -> Self {
        let missing: BTreeSet<&String> = self.results.iter().flat_map(|r| r.missing_skills.iter()).collect();
        self.recommendations = recommender.recommend_all(missing, per_skill);
        self
    }

    /// Whether the result at `position` in `results` was selected
    pub fn is_selected(&self, position: usize) -> bool {
        self.selected.contains(&position)
    }

    /// Selected candidates in rank order
    pub fn selected_results(&self) -> Vec<&MatchResult> {
        self.selected
            .iter()
            .filter_map(|&position| self.results.get(position))
            .collect()
    }

    /// Everyone not selected, in rank order
    pub fn rejected_results(&self) -> Vec<&MatchResult> {
        self.results
            .iter()
            .enumerate()
            .filter(|(position, _)| !self.is_selected(*position))
            .map(|(_, result)| result)
            .collect()
    }

    /// Recommended courses for one candidate's missing skills
    pub fn recommendations_for<'a>(&'a self, result: &'a MatchResult) -> Vec<(&'a str, &'a CourseRecommendation)> {
        result
            .missing_skills
            .iter()
            .filter_map(|skill| self.recommendations.get(skill).map(|courses| (skill, courses)))
            .flat_map(|(skill, courses)| courses.iter().map(move |course| (skill.as_str(), course)))
            .collect()
    }
}
