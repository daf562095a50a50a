//! Proficiency estimation from phrasing cues around a skill

use crate::processing::text_processor::TextProcessor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProficiencyLevel {
    Unknown,
    Beginner,
    Intermediate,
    Advanced,
}

impl ProficiencyLevel {
    /// Contribution of one skill to the ranking proficiency factor
    pub fn factor(self) -> f64 {
        match self {
            ProficiencyLevel::Advanced => 1.0,
            ProficiencyLevel::Intermediate => 0.5,
            ProficiencyLevel::Beginner | ProficiencyLevel::Unknown => 0.2,
        }
    }

    pub fn stars(self) -> &'static str {
        match self {
            ProficiencyLevel::Advanced => "★★★",
            ProficiencyLevel::Intermediate => "★★",
            ProficiencyLevel::Beginner => "★",
            ProficiencyLevel::Unknown => "-",
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProficiencyLevel::Unknown => "Unknown",
            ProficiencyLevel::Beginner => "Beginner",
            ProficiencyLevel::Intermediate => "Intermediate",
            ProficiencyLevel::Advanced => "Advanced",
        };
        write!(f, "{}", label)
    }
}

/// Cue templates, strongest level first
const CUES: &[(ProficiencyLevel, &[&str])] = &[
    (ProficiencyLevel::Advanced, &["expert in ", "advanced "]),
    (ProficiencyLevel::Intermediate, &["intermediate ", "proficient in "]),
    (ProficiencyLevel::Beginner, &["familiar with ", "basic "]),
];

pub struct ProficiencyEstimator {
    processor: TextProcessor,
}

impl Default for ProficiencyEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProficiencyEstimator {
    pub fn new() -> Self {
        Self {
            processor: TextProcessor::new(),
        }
    }

    /// Lowercased, whitespace-collapsed text the cues are searched in
    pub fn context(&self, text: &str) -> String {
        self.processor
            .normalize_whitespace(&self.processor.normalize(text))
    }

    /// Level of one skill; the first cue found in priority order wins
    pub fn estimate(&self, skill: &str, text: &str) -> ProficiencyLevel {
        estimate_in_context(skill, &self.context(text))
    }

    /// Level for every skill against the same candidate text
    pub fn annotate<'a, I>(&self, skills: I, text: &str) -> BTreeMap<String, ProficiencyLevel>
    where
        I: IntoIterator<Item = &'a String>,
    {
        let context = self.context(text);
        skills
            .into_iter()
            .map(|skill| (skill.clone(), estimate_in_context(skill, &context)))
            .collect()
    }
}

fn estimate_in_context(skill: &str, context: &str) -> ProficiencyLevel {
    let skill = skill.trim().to_lowercase();
    if skill.is_empty() {
        return ProficiencyLevel::Unknown;
    }

    CUES.iter()
        .find(|(_, prefixes)| {
            prefixes
                .iter()
                .any(|prefix| context.contains(&format!("{}{}", prefix, skill)))
        })
        .map(|(level, _)| *level)
        .unwrap_or(ProficiencyLevel::Unknown)
}

/// Mean factor over the given skills, 0 when there are none
pub fn mean_factor<'a, I>(levels: I) -> f64
where
    I: IntoIterator<Item = &'a ProficiencyLevel>,
{
    let (sum, count) = levels
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), level| (sum + level.factor(), count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
