//! Skill extraction, matching and ranking

pub mod document;
pub mod embeddings;
pub mod engine;
pub mod features;
pub mod phrase_extractor;
pub mod proficiency;
pub mod ranking;
pub mod recommendation;
pub mod similarity;
pub mod text_processor;
pub mod tfidf;
pub mod vocabulary;

pub use document::{CandidateInput, Document};
pub use engine::{JobProfile, ScreeningEngine};
pub use proficiency::ProficiencyLevel;
pub use ranking::MatchResult;
