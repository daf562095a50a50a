//! TF-IDF vector space
//!
//! Mirrors the common default weighting: tokens are runs of two or more word
//! characters, term frequency is the raw count, idf is smoothed as
//! `ln((1 + n) / (1 + df)) + 1` and every vector is L2-normalized. The
//! vocabulary is fitted on exactly the supplied corpus and kept ordered, so
//! identical input always yields identical vectors.

use crate::error::{CvMatcherError, Result};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};

/// Sparse L2-normalized vector, entries sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Cosine similarity; both vectors are unit length so this is the dot product
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0;

        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_val) = self.entries[i];
            let (b_idx, b_val) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += a_val * b_val;
                    i += 1;
                    j += 1;
                }
            }
        }

        dot.clamp(0.0, 1.0)
    }
}

pub struct TfIdfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    token_regex: Regex,
    stop_words: HashSet<String>,
}

impl TfIdfVectorizer {
    /// Fit the vocabulary and idf weights on a corpus.
    ///
    /// Fails with `Vectorization` when no document contains a single token,
    /// leaving the fallback policy to the caller.
    pub fn fit<S: AsRef<str>>(corpus: &[S]) -> Result<Self> {
        Self::fit_with_stop_words(corpus, std::iter::empty::<&str>())
    }

    /// Like [`fit`](Self::fit), but the given words are never terms, neither
    /// while fitting nor in later transforms
    pub fn fit_with_stop_words<S, I, W>(corpus: &[S], stop_words: I) -> Result<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let token_regex = token_regex();
        let stop_words: HashSet<String> = stop_words
            .into_iter()
            .map(|word| word.as_ref().to_lowercase())
            .collect();

        let mut doc_frequencies: BTreeMap<String, usize> = BTreeMap::new();
        for doc in corpus {
            let unique: HashSet<String> = tokenize(&token_regex, doc.as_ref())
                .filter(|term| !stop_words.contains(term))
                .collect();
            for term in unique {
                *doc_frequencies.entry(term).or_insert(0) += 1;
            }
        }

        if doc_frequencies.is_empty() {
            return Err(CvMatcherError::Vectorization(
                "empty vocabulary; documents contain no terms".to_string(),
            ));
        }

        let n = corpus.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_frequencies.len());

        for (index, (term, df)) in doc_frequencies.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self {
            vocabulary,
            idf,
            token_regex,
            stop_words,
        })
    }

    /// Project a document into the fitted space; unknown terms are ignored
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in tokenize(&self.token_regex, document) {
            if self.stop_words.contains(&term) {
                continue;
            }
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut entries {
                *weight /= norm;
            }
        }

        SparseVector { entries }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Lexical similarity of two full documents in a space fitted on just the pair
pub fn document_similarity(a: &str, b: &str) -> Result<f64> {
    let vectorizer = TfIdfVectorizer::fit(&[a, b])?;
    Ok(vectorizer.transform(a).cosine(&vectorizer.transform(b)))
}

fn token_regex() -> Regex {
    Regex::new(r"\b\w\w+\b").expect("Invalid token regex")
}

fn tokenize<'a>(regex: &'a Regex, text: &'a str) -> impl Iterator<Item = String> + 'a {
    regex.find_iter(text).map(|m| m.as_str().to_lowercase())
}
