//! Document structures

use crate::input::ExtractedText;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOCALE: &str = "en";

/// A candidate handed to the engine by a library caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateInput {
    pub id: String,
    pub text: String,
}

impl CandidateInput {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Extracted text of one input, immutable once produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub locale: String,
    pub warnings: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            locale: DEFAULT_LOCALE.to_string(),
            warnings: Vec::new(),
        }
    }

    pub fn from_extracted(id: impl Into<String>, extracted: ExtractedText) -> Self {
        Self {
            warnings: extracted.warnings,
            ..Self::new(id, extracted.text)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<CandidateInput> for Document {
    fn from(input: CandidateInput) -> Self {
        Self::new(input.id, input.text)
    }
}

/// Candidate id for a file: its name without extension
pub fn candidate_id_for_path(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// One id per path, unique within the batch.
///
/// Ids are file stems. Colliding stems are qualified with their parent
/// directory (`a/resume`), then with the full extensionless path; ids that
/// still collide (the same file listed twice) get a `#n` suffix.
pub fn unique_candidate_ids(paths: &[PathBuf]) -> Vec<String> {
    let mut ids: Vec<String> = paths.iter().map(|path| candidate_id_for_path(path)).collect();

    for index in colliding(&ids) {
        let path = &paths[index];
        if let Some(parent) = path.parent().and_then(Path::file_name) {
            ids[index] = format!("{}/{}", parent.to_string_lossy(), candidate_id_for_path(path));
        }
    }

    for index in colliding(&ids) {
        ids[index] = paths[index].with_extension("").display().to_string();
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for id in &mut ids {
        let count = seen.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            *id = format!("{}#{}", id, count);
        }
    }

    ids
}

fn colliding(ids: &[String]) -> Vec<usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for id in ids {
        *counts.entry(id.as_str()).or_insert(0) += 1;
    }

    ids.iter()
        .enumerate()
        .filter(|(_, id)| counts[id.as_str()] > 1)
        .map(|(index, _)| index)
        .collect()
}
