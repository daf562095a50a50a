//! Candidate skill phrase extraction
//!
//! A rule-based noun-phrase chunker: clause punctuation, function words and
//! common verbs end a chunk, everything between them forms a span. Spans are
//! then cleaned and filtered into skill phrases.

use crate::processing::text_processor::{self, TextProcessor};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Longest span (in whitespace tokens) kept as a phrase
pub const MAX_PHRASE_TOKENS: usize = 5;

/// Stop words that may sit inside a noun phrase ("several databases", "more tests")
const CHUNK_INTERNAL_STOP_WORDS: &[&str] = &[
    "more", "most", "other", "others", "several", "few", "many", "much", "various", "own", "same",
    "whole", "less", "least", "enough",
];

/// Verbs and cue adjectives that never belong to a skill phrase
const VERB_BREAKERS: &[&str] = &[
    "work", "works", "worked", "working", "develop", "develops", "developed", "developing",
    "build", "builds", "built", "building", "design", "designs", "designed", "designing",
    "implement", "implements", "implemented", "implementing", "create", "creates", "created",
    "creating", "manage", "manages", "managed", "managing", "lead", "leads", "led", "leading",
    "use", "uses", "utilize", "utilizes", "utilized", "utilizing", "maintain", "maintains",
    "maintained", "maintaining", "write", "writes", "wrote", "written", "writing", "deliver",
    "delivers", "delivered", "delivering", "improve", "improves", "improved", "improving",
    "ensure", "ensures", "ensured", "ensuring", "require", "requires", "required", "requiring",
    "seek", "seeks", "seeking", "looking", "join", "joined", "apply", "applied", "include",
    "includes", "included", "including", "provide", "provides", "provided", "providing",
    "help", "helps", "helped", "helping", "want", "wants", "need", "needs", "needed", "make",
    "makes", "made", "get", "gets", "got", "take", "takes", "took", "know", "knows", "knew",
    "like", "prefer", "preferred", "familiar", "proficient", "able",
];

/// Characters that close a clause when they trail a token
const TRAILING_BOUNDARIES: &[char] = &[',', ';', ':', '!', '?', ')', ']', '}', '"', '\'', '>', '.'];

/// Characters that open a clause when they lead a token
const LEADING_BOUNDARIES: &[char] = &['(', '[', '{', '"', '\'', '<'];

pub struct PhraseExtractor {
    processor: TextProcessor,
    breakers: HashSet<&'static str>,
    strip_regex: Regex,
    max_tokens: usize,
}

impl Default for PhraseExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PhraseExtractor {
    pub fn new() -> Self {
        let processor = TextProcessor::new();

        let internal: HashSet<&str> = CHUNK_INTERNAL_STOP_WORDS.iter().copied().collect();
        let mut breakers: HashSet<&'static str> = text_processor::stop_words()
            .filter(|word| !internal.contains(word))
            .collect();
        breakers.extend(VERB_BREAKERS.iter().copied());

        // Hyphen, plus, hash and period carry meaning in "c++", "c#", ".net"
        let strip_regex = Regex::new(r"[^\w\s\-+#.]").expect("Invalid phrase strip regex");

        Self {
            processor,
            breakers,
            strip_regex,
            max_tokens: MAX_PHRASE_TOKENS,
        }
    }

    /// Extract the deduplicated set of skill phrases from raw text
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        if text.trim().is_empty() {
            return BTreeSet::new();
        }

        let normalized = self.processor.normalize(text);

        self.chunk(&normalized)
            .into_iter()
            .filter_map(|span| self.clean_span(&span))
            .collect()
    }

    /// Split normalized text into noun-phrase-like spans of raw tokens
    pub fn chunk(&self, normalized: &str) -> Vec<Vec<String>> {
        let mut spans = Vec::new();

        for line in normalized.lines() {
            let mut current: Vec<String> = Vec::new();

            for raw in line.split_whitespace() {
                let leading = raw.trim_start_matches(LEADING_BOUNDARIES);
                if leading.len() != raw.len() {
                    flush(&mut current, &mut spans);
                }

                let core = leading.trim_end_matches(TRAILING_BOUNDARIES);
                let closes_clause = core.len() != leading.len();

                if !core.chars().any(|c| c.is_alphanumeric()) || self.breakers.contains(core) {
                    flush(&mut current, &mut spans);
                    continue;
                }

                current.push(core.to_string());

                if closes_clause {
                    flush(&mut current, &mut spans);
                }
            }

            flush(&mut current, &mut spans);
        }

        spans
    }

    fn clean_span(&self, span: &[String]) -> Option<String> {
        let joined = span.join(" ");
        let stripped = self.strip_regex.replace_all(&joined, "");
        let phrase = self.processor.normalize_whitespace(&stripped);

        if phrase.is_empty() {
            return None;
        }

        let tokens: Vec<&str> = phrase.split_whitespace().collect();
        if tokens.len() > self.max_tokens {
            return None;
        }
        if tokens.iter().all(|token| self.processor.is_stop_word(token)) {
            return None;
        }

        Some(phrase)
    }
}

fn flush(current: &mut Vec<String>, spans: &mut Vec<Vec<String>>) {
    if !current.is_empty() {
        spans.push(std::mem::take(current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phrases(text: &str) -> Vec<String> {
        PhraseExtractor::new().extract(text).into_iter().collect()
    }

    #[test]
    fn test_empty_input_yields_empty_set() {
        assert!(phrases("").is_empty());
        assert!(phrases("   \n\t ").is_empty());
    }

    #[test]
    fn test_extracts_noun_phrases() {
        let found = phrases("Expert in Python, SQL and machine learning.");
        assert_eq!(found, vec!["expert", "machine learning", "python", "sql"]);
    }

    #[test]
    fn test_keeps_technical_punctuation() {
        let found = phrases("C++, C# and .NET developer");
        assert!(found.contains(&"c++".to_string()));
        assert!(found.contains(&"c#".to_string()));
        assert!(found.contains(&".net developer".to_string()));
    }

    #[test]
    fn test_strips_other_punctuation() {
        let found = phrases("Built ci/cd pipelines");
        assert_eq!(found, vec!["cicd pipelines"]);
    }

    #[test]
    fn test_drops_all_stop_word_spans() {
        let found = phrases("Python and more");
        assert_eq!(found, vec!["python"]);
    }

    #[test]
    fn test_mixed_stop_word_span_survives() {
        let found = phrases("Worked on several databases");
        assert_eq!(found, vec!["several databases"]);
    }

    #[test]
    fn test_length_bound() {
        assert!(phrases("alpha beta gamma delta epsilon zeta").is_empty());
        assert_eq!(
            phrases("alpha beta gamma delta epsilon"),
            vec!["alpha beta gamma delta epsilon"]
        );
    }

    #[test]
    fn test_duplicates_collapse_case_insensitively() {
        let found = phrases("Python. PYTHON. python");
        assert_eq!(found, vec!["python"]);
    }

    #[test]
    fn test_lines_are_boundaries() {
        let found = phrases("Docker\nKubernetes");
        assert_eq!(found, vec!["docker", "kubernetes"]);
    }
}
