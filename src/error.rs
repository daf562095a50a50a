//! Error handling for the cv matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CvMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("Text processing error: {0}")]
    TextProcessing(String),

    #[error("Vectorization error: {0}")]
    Vectorization(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model loading error: {0}")]
    ModelLoading(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Candidate processing failed: {0}")]
    Candidate(String),

    #[error("Course catalogue error: {0}")]
    Catalogue(String),
}

pub type Result<T> = std::result::Result<T, CvMatcherError>;

/// Convert anyhow errors (raised by model2vec-rs) to our error type
impl From<anyhow::Error> for CvMatcherError {
    fn from(err: anyhow::Error) -> Self {
        CvMatcherError::ModelLoading(err.to_string())
    }
}
