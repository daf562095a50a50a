//! Text extraction from various file formats
//!
//! Extractors degrade instead of failing: a PDF the parser cannot open yields
//! empty text plus a warning, undecodable text falls back to Latin-1. Only
//! I/O errors (missing or unreadable files) surface as `Err`.

use crate::error::{CvMatcherError, Result};
use log::warn;
use pulldown_cmark::{html, Parser};
use regex::Regex;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tokio::fs;

/// Text pulled out of a document together with any recoverable problems
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub warnings: Vec<String>,
}

impl ExtractedText {
    pub fn new(text: String) -> Self {
        Self {
            text,
            warnings: Vec::new(),
        }
    }

    /// Empty text carrying a single warning
    pub fn degraded(warning: String) -> Self {
        warn!("{}", warning);
        Self {
            text: String::new(),
            warnings: vec![warning],
        }
    }

    fn warn(&mut self, warning: String) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<ExtractedText>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let bytes = fs::read(path).await?;
        let label = path.display().to_string();

        tokio::task::spawn_blocking(move || pdf_text_from_bytes(&bytes, &label))
            .await
            .map_err(|e| CvMatcherError::PdfExtraction(format!("PDF worker failed: {}", e)))
    }
}

/// Extract PDF text page by page, keeping only pages that produced text.
///
/// Falls back to whole-document extraction when the per-page pass fails, and
/// to empty text when the parser cannot handle the file at all.
pub fn pdf_text_from_bytes(bytes: &[u8], label: &str) -> ExtractedText {
    let mut extracted = ExtractedText::default();

    // pdf-extract panics on some malformed inputs
    let by_pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }));

    match by_pages {
        Ok(Ok(pages)) => {
            extracted.text = join_pages(&pages);
            return extracted;
        }
        Ok(Err(e)) => extracted.warn(format!(
            "Per-page extraction failed for '{}': {}; retrying whole document",
            label, e
        )),
        Err(_) => extracted.warn(format!(
            "PDF parser panicked on '{}' during per-page extraction; retrying whole document",
            label
        )),
    }

    let whole = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));

    match whole {
        Ok(Ok(text)) => extracted.text = text.trim().to_string(),
        Ok(Err(e)) => extracted.warn(format!("Failed to extract text from PDF '{}': {}", label, e)),
        Err(_) => extracted.warn(format!("PDF parser could not open '{}'", label)),
    }

    extracted
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|page| !page.trim().is_empty())
        .map(|page| page.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let bytes = fs::read(path).await?;
        Ok(decode_text(bytes, &path.display().to_string()))
    }
}

/// Decode as UTF-8, falling back to Latin-1 where every byte maps to one code point
pub fn decode_text(bytes: Vec<u8>, label: &str) -> ExtractedText {
    match String::from_utf8(bytes) {
        Ok(text) => {
            let text = text.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(text);
            ExtractedText::new(text)
        }
        Err(e) => {
            let text: String = e.into_bytes().iter().map(|&b| b as char).collect();
            let mut extracted = ExtractedText::new(text);
            extracted.warn(format!("'{}' is not valid UTF-8; decoded as Latin-1", label));
            extracted
        }
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<ExtractedText> {
        let bytes = fs::read(path).await?;
        let mut extracted = decode_text(bytes, &path.display().to_string());

        let parser = Parser::new(&extracted.text);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        extracted.text = self.html_to_text(&html_output);
        Ok(extracted)
    }
}

impl MarkdownExtractor {
    fn html_to_text(&self, html: &str) -> String {
        let text = html
            .replace("<br>", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n")
            .replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'");

        let re = Regex::new(r"<[^>]*>").expect("Invalid tag regex");
        let clean_text = re.replace_all(&text, "").replace("&amp;", "&");

        let lines: Vec<String> = clean_text
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        lines.join("\n")
    }
}
