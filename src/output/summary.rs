//! Batch-level statistics over ranked candidates

use crate::processing::ranking::MatchResult;
use crate::processing::similarity::round2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_TOP_SKILLS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: usize,
}

/// Share of candidates that matched one job skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCoverage {
    pub skill: String,
    pub candidates: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_candidates: usize,
    pub selected_count: usize,
    pub rejected_count: usize,
    pub degraded_count: usize,
    pub average_match_score: f64,
    pub average_final_score: f64,
    /// Percent of candidates with at least one matched skill
    pub matching_rate: f64,
    pub top_matched_skills: Vec<SkillCount>,
    pub top_missing_skills: Vec<SkillCount>,
    /// One entry per job skill, in skill order
    pub skill_coverage: Vec<SkillCoverage>,
}

impl BatchSummary {
    pub fn compute(
        results: &[MatchResult],
        job_skills: &BTreeSet<String>,
        selected_count: usize,
        top_n: usize,
    ) -> Self {
        let total = results.len();
        if total == 0 {
            return Self {
                skill_coverage: job_skills
                    .iter()
                    .map(|skill| SkillCoverage {
                        skill: skill.clone(),
                        candidates: 0,
                        percent: 0.0,
                    })
                    .collect(),
                ..Self::default()
            };
        }

        let average = |f: fn(&MatchResult) -> f64| round2(results.iter().map(f).sum::<f64>() / total as f64);
        let with_matches = results.iter().filter(|r| !r.matched_skills.is_empty()).count();

        let matched_counts = count_skills(results.iter().flat_map(|r| r.matched_skills.iter()));
        let missing_counts = count_skills(results.iter().flat_map(|r| r.missing_skills.iter()));

        let skill_coverage = job_skills
            .iter()
            .map(|skill| {
                let candidates = matched_counts.get(skill.as_str()).copied().unwrap_or(0);
                SkillCoverage {
                    skill: skill.clone(),
                    candidates,
                    percent: percent(candidates, total),
                }
            })
            .collect();

        let selected_count = selected_count.min(total);

        Self {
            total_candidates: total,
            selected_count,
            rejected_count: total - selected_count,
            degraded_count: results.iter().filter(|r| r.degraded).count(),
            average_match_score: average(|r| r.match_score_percent),
            average_final_score: average(|r| r.final_score),
            matching_rate: percent(with_matches, total),
            top_matched_skills: top_skills(&matched_counts, top_n),
            top_missing_skills: top_skills(&missing_counts, top_n),
            skill_coverage,
        }
    }
}

fn count_skills<'a, I>(skills: I) -> BTreeMap<&'a str, usize>
where
    I: Iterator<Item = &'a String>,
{
    let mut counts = BTreeMap::new();
    for skill in skills {
        *counts.entry(skill.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Most frequent first, ties alphabetical
fn top_skills(counts: &BTreeMap<&str, usize>, n: usize) -> Vec<SkillCount> {
    let mut ordered: Vec<(&str, usize)> = counts.iter().map(|(skill, count)| (*skill, *count)).collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ordered
        .into_iter()
        .take(n)
        .map(|(skill, count)| SkillCount {
            skill: skill.to_string(),
            count,
        })
        .collect()
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(part as f64 / total as f64 * 100.0)
    }
}
