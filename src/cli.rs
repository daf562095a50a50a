//! CLI interface for the cv matcher

use crate::config::{Config, OutputFormat, VocabularyMode};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cv-matcher")]
#[command(about = "Rank résumés against a job description by skill match")]
#[command(long_about = "Extract skill phrases from a job description and a batch of résumés, match them in a TF-IDF space, blend in semantic similarity and rank candidates with a skill-gap penalty")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank candidate résumés against a job description
    Rank(RankArgs),

    /// List the skills found in one document
    Skills(SkillsArgs),

    /// Recommend catalogue courses for skills
    Courses(CoursesArgs),

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Args)]
pub struct RankArgs {
    /// Path to the job description (PDF, TXT, MD)
    #[arg(short, long)]
    pub job: PathBuf,

    /// Résumé files or directories containing them
    #[arg(required = true)]
    pub resumes: Vec<PathBuf>,

    /// Similarity threshold for a job skill to count as matched (0-1)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Number of candidates to select
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Vocabulary mode: blocklist, lexicon, combined
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Newline-delimited known-skills lexicon
    #[arg(long)]
    pub lexicon: Option<PathBuf>,

    /// Newline-delimited blocklist replacing the built-in one
    #[arg(long)]
    pub blocklist: Option<PathBuf>,

    /// Model2Vec embedding model (local path or Hugging Face repo id)
    #[arg(short, long)]
    pub embedding: Option<String>,

    /// Minimum match score (0-100) for selection
    #[arg(long)]
    pub min_score: Option<f64>,

    /// Minimum number of matched skills for selection
    #[arg(long)]
    pub min_skills: Option<usize>,

    /// Only select candidates that matched this skill (repeatable)
    #[arg(long = "require")]
    pub required_skills: Vec<String>,

    /// Number of candidates processed in parallel
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// CSV course catalogue for recommending courses on missing skills
    #[arg(long)]
    pub courses: Option<PathBuf>,

    /// Courses recommended per missing skill
    #[arg(long)]
    pub courses_per_skill: Option<usize>,

    /// Output format: console, json, markdown
    #[arg(short, long)]
    pub output: Option<String>,

    /// Save output to a file, or into a directory under a generated name
    #[arg(short, long)]
    pub save: Option<PathBuf>,

    /// Show scores, proficiency and profile details per candidate
    #[arg(short, long)]
    pub detailed: bool,
}

#[derive(Args)]
pub struct SkillsArgs {
    /// Document to analyze (PDF, TXT, MD)
    pub file: PathBuf,

    /// Vocabulary mode: blocklist, lexicon, combined
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Newline-delimited known-skills lexicon
    #[arg(long)]
    pub lexicon: Option<PathBuf>,

    /// Newline-delimited blocklist replacing the built-in one
    #[arg(long)]
    pub blocklist: Option<PathBuf>,
}

#[derive(Args)]
pub struct CoursesArgs {
    /// Skills to find courses for
    #[arg(required = true)]
    pub skills: Vec<String>,

    /// CSV course catalogue (defaults to the configured one)
    #[arg(long)]
    pub catalogue: Option<PathBuf>,

    /// Courses per skill
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

impl RankArgs {
    /// Layer command-line overrides on top of the loaded configuration
    pub fn apply_to(&self, config: &mut Config) -> Result<(), String> {
        if let Some(threshold) = self.threshold {
            config.matching.similarity_threshold = threshold;
        }
        if let Some(mode) = &self.mode {
            config.matching.vocabulary_mode = parse_vocabulary_mode(mode)?;
        }
        if let Some(top_k) = self.top_k {
            config.selection.top_k = top_k;
        }
        if let Some(min_score) = self.min_score {
            config.selection.min_match_score = min_score;
        }
        if let Some(min_skills) = self.min_skills {
            config.selection.min_matched_skills = min_skills;
        }
        if let Some(workers) = self.workers {
            config.processing.workers = workers;
        }
        if let Some(lexicon) = &self.lexicon {
            config.vocabulary.lexicon_path = Some(lexicon.clone());
        }
        if let Some(blocklist) = &self.blocklist {
            config.vocabulary.blocklist_path = Some(blocklist.clone());
        }
        if let Some(embedding) = &self.embedding {
            config.models.embedding_model = Some(embedding.clone());
        }
        if let Some(courses) = &self.courses {
            config.recommendations.catalogue_path = Some(courses.clone());
        }
        if let Some(per_skill) = self.courses_per_skill {
            config.recommendations.courses_per_skill = per_skill;
        }
        if let Some(output) = &self.output {
            config.output.format = parse_output_format(output)?;
        }
        if self.detailed {
            config.output.detailed = true;
        }
        Ok(())
    }
}

impl SkillsArgs {
    pub fn apply_to(&self, config: &mut Config) -> Result<(), String> {
        if let Some(mode) = &self.mode {
            config.matching.vocabulary_mode = parse_vocabulary_mode(mode)?;
        }
        if let Some(lexicon) = &self.lexicon {
            config.vocabulary.lexicon_path = Some(lexicon.clone());
        }
        if let Some(blocklist) = &self.blocklist {
            config.vocabulary.blocklist_path = Some(blocklist.clone());
        }
        Ok(())
    }
}

impl CoursesArgs {
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(catalogue) = &self.catalogue {
            config.recommendations.catalogue_path = Some(catalogue.clone());
        }
        if let Some(limit) = self.limit {
            config.recommendations.courses_per_skill = limit;
        }
    }
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}

pub fn parse_vocabulary_mode(mode: &str) -> Result<VocabularyMode, String> {
    match mode.to_lowercase().as_str() {
        "blocklist" => Ok(VocabularyMode::Blocklist),
        "lexicon" => Ok(VocabularyMode::Lexicon),
        "combined" => Ok(VocabularyMode::Combined),
        _ => Err(format!("Invalid vocabulary mode: {}. Supported: blocklist, lexicon, combined", mode)),
    }
}
