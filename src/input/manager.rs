//! Input manager for handling different file types

use crate::error::{CvMatcherError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    ExtractedText, MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct InputManager {
    cache: HashMap<PathBuf, ExtractedText>,
    enable_cache: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Extract text, degrading to empty text with a warning on any failure
    pub async fn extract_text(&mut self, path: &Path) -> ExtractedText {
        if self.enable_cache {
            if let Some(cached) = self.cache.get(path) {
                info!("Using cached text for: {}", path.display());
                return cached.clone();
            }
        }

        let extracted = Self::read_document(path).await;

        if self.enable_cache {
            self.cache.insert(path.to_path_buf(), extracted.clone());
        }

        extracted
    }

    /// Strict variant: fails when the file is missing, unsupported, or yields no text
    pub async fn try_extract_text(&mut self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(CvMatcherError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        if !FileType::from_path(path).is_supported() {
            return Err(CvMatcherError::UnsupportedFormat(format!(
                "Unsupported file type for: {}",
                path.display()
            )));
        }

        let extracted = self.extract_text(path).await;
        if extracted.text.trim().is_empty() {
            let reason = extracted
                .warnings
                .last()
                .cloned()
                .unwrap_or_else(|| "document is empty".to_string());
            return Err(CvMatcherError::InvalidInput(format!(
                "No text extracted from {}: {}",
                path.display(),
                reason
            )));
        }

        Ok(extracted.text)
    }

    /// Uncached, never-failing extraction usable from concurrent workers
    pub async fn read_document(path: &Path) -> ExtractedText {
        let file_type = FileType::from_path(path);

        let result = match file_type {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(path).await
            }
            FileType::Unknown => {
                warn!("Unknown file type for {}, reading as plain text", path.display());
                PlainTextExtractor.extract(path).await.map(|mut extracted| {
                    extracted.warnings.insert(
                        0,
                        format!("Unrecognized file type for '{}'; read as plain text", path.display()),
                    );
                    extracted
                })
            }
        };

        match result {
            Ok(extracted) => {
                debug!("Extracted {} characters from {}", extracted.text.len(), path.display());
                extracted
            }
            Err(e) => ExtractedText::degraded(format!("Could not read '{}': {}", path.display(), e)),
        }
    }

    /// Expand directories into the supported documents they contain, sorted by path
    pub fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut documents = Vec::new();

        for path in paths {
            if path.is_dir() {
                let mut entries = Vec::new();
                for entry in std::fs::read_dir(path)? {
                    let entry_path = entry?.path();
                    if entry_path.is_file() && FileType::from_path(&entry_path).is_supported() {
                        entries.push(entry_path);
                    }
                }
                entries.sort();
                documents.extend(entries);
            } else {
                documents.push(path.clone());
            }
        }

        Ok(documents)
    }
}
