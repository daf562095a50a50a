//! Vocabulary filtering: boilerplate blocklist and known-skills lexicon

use crate::config::VocabularyMode;
use crate::error::{CvMatcherError, Result};
use aho_corasick::AhoCorasick;
use log::{info, warn};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// Generic job-posting boilerplate that never names a concrete skill
pub const DEFAULT_BLOCKED_TERMS: &[&str] = &[
    "your resume",
    "job title",
    "required skills",
    "related field",
    "phd",
    "masters",
    "collaborate",
    "responsibilities",
    "experience",
    "company",
    "location",
    "findings",
    "engineering",
    "team",
    "stakeholders",
    "role",
    "job description",
    "technology",
    "organization",
];

/// Drops any phrase containing a blocked term as a substring
pub struct Blocklist {
    matcher: AhoCorasick,
    terms: Vec<String>,
}

impl Blocklist {
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut terms: Vec<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        terms.sort();
        terms.dedup();

        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&terms)
            .map_err(|e| CvMatcherError::TextProcessing(format!("Failed to build blocklist: {}", e)))?;

        Ok(Self { matcher, terms })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let terms = load_lines(path)?;
        info!("Loaded {} blocked terms from {}", terms.len(), path.display());
        Self::new(terms)
    }

    pub fn is_blocked(&self, phrase: &str) -> bool {
        !self.terms.is_empty() && self.matcher.is_match(phrase)
    }

    /// Remove blocked phrases; the result is sorted lexicographically
    pub fn filter<'a, I>(&self, phrases: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        phrases
            .into_iter()
            .filter(|phrase| !self.is_blocked(phrase))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_TERMS.iter().copied()).expect("Default blocklist must build")
    }
}

/// Curated vocabulary of known skill names
#[derive(Debug, Clone, Default)]
pub struct SkillLexicon {
    skills: HashSet<String>,
}

impl SkillLexicon {
    /// Entries are lowercased; entries of one character or less are ignored
    pub fn new<I, S>(skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let skills = skills
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| s.chars().count() > 1)
            .collect();

        Self { skills }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let lexicon = Self::new(load_lines(path)?);
        info!("Loaded {} known skills from {}", lexicon.len(), path.display());
        Ok(lexicon)
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.skills.contains(&phrase.to_lowercase())
    }

    /// Keep only phrases that exactly match a known skill
    pub fn filter<'a, I>(&self, phrases: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        phrases
            .into_iter()
            .filter(|phrase| self.contains(phrase))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

/// Applies the configured filtering strategy to extracted phrases
pub struct VocabularyFilter {
    mode: VocabularyMode,
    blocklist: Blocklist,
    lexicon: Option<SkillLexicon>,
}

impl VocabularyFilter {
    /// Lexicon modes without a lexicon fall back to the blocklist alone
    pub fn new(mode: VocabularyMode, blocklist: Blocklist, lexicon: Option<SkillLexicon>) -> Self {
        let mode = match (mode, &lexicon) {
            (VocabularyMode::Lexicon | VocabularyMode::Combined, None) => {
                warn!("Vocabulary mode {:?} requested without a skill lexicon; using blocklist only", mode);
                VocabularyMode::Blocklist
            }
            _ => mode,
        };

        Self {
            mode,
            blocklist,
            lexicon,
        }
    }

    pub fn blocklist_only(blocklist: Blocklist) -> Self {
        Self::new(VocabularyMode::Blocklist, blocklist, None)
    }

    pub fn mode(&self) -> VocabularyMode {
        self.mode
    }

    pub fn apply(&self, phrases: &BTreeSet<String>) -> BTreeSet<String> {
        match (self.mode, &self.lexicon) {
            (VocabularyMode::Lexicon, Some(lexicon)) => lexicon.filter(phrases),
            (VocabularyMode::Combined, Some(lexicon)) => {
                let unblocked = self.blocklist.filter(phrases);
                lexicon.filter(&unblocked)
            }
            _ => self.blocklist.filter(phrases),
        }
    }
}

impl Default for VocabularyFilter {
    fn default() -> Self {
        Self::blocklist_only(Blocklist::default())
    }
}

/// Read a newline-delimited list, skipping blank lines and `#` comments
pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_blocklist_drops_substring_matches() {
        let blocklist = Blocklist::default();
        let phrases = set(&["python", "team player", "5 years experience", "sql", "job title"]);

        let kept: Vec<String> = blocklist.filter(&phrases).into_iter().collect();
        assert_eq!(kept, vec!["python", "sql"]);
    }

    #[test]
    fn test_blocklist_substring_inside_word() {
        // "role" inside "controller" is still a substring hit
        let blocklist = Blocklist::default();
        assert!(blocklist.is_blocked("controller design"));
        assert!(!blocklist.is_blocked("kubernetes"));
    }

    #[test]
    fn test_empty_blocklist_keeps_everything() {
        let blocklist = Blocklist::new(Vec::<String>::new()).unwrap();
        assert!(blocklist.is_empty());
        assert_eq!(blocklist.filter(&set(&["team"])).len(), 1);
    }

    #[test]
    fn test_lexicon_exact_match_only() {
        let lexicon = SkillLexicon::new(["Python", "machine learning", "r", "SQL"]);
        assert_eq!(lexicon.len(), 3); // "r" is too short

        let phrases = set(&["python", "machine learning models", "sql", "r"]);
        let kept: Vec<String> = lexicon.filter(&phrases).into_iter().collect();
        assert_eq!(kept, vec!["python", "sql"]);
    }

    #[test]
    fn test_filter_modes() {
        let lexicon = SkillLexicon::new(["python", "team leadership"]);
        let phrases = set(&["python", "team leadership", "golang"]);

        let lexicon_only = VocabularyFilter::new(VocabularyMode::Lexicon, Blocklist::default(), Some(lexicon.clone()));
        assert_eq!(lexicon_only.apply(&phrases), set(&["python", "team leadership"]));

        let combined = VocabularyFilter::new(VocabularyMode::Combined, Blocklist::default(), Some(lexicon));
        assert_eq!(combined.apply(&phrases), set(&["python"]));

        let open = VocabularyFilter::default();
        assert_eq!(open.apply(&phrases), set(&["golang", "python"]));
    }

    #[test]
    fn test_lexicon_mode_without_lexicon_falls_back() {
        let filter = VocabularyFilter::new(VocabularyMode::Lexicon, Blocklist::default(), None);
        assert_eq!(filter.mode(), VocabularyMode::Blocklist);
    }

    #[test]
    fn test_load_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# skills\npython\n\n  SQL  \nx").unwrap();

        let lexicon = SkillLexicon::load(file.path()).unwrap();
        assert!(lexicon.contains("python"));
        assert!(lexicon.contains("sql"));
        assert!(!lexicon.contains("x"));
    }
}
