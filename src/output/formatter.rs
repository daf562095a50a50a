//! Output formatters: console, JSON and Markdown renderings of a batch report

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::BatchReport;
use crate::processing::features::ProfileFeatures;
use crate::processing::proficiency::ProficiencyLevel;
use crate::processing::ranking::MatchResult;
use crate::processing::recommendation::CourseRecommendation;
use colored::{Color, Colorize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Colored terminal output
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// Structured output for other tools
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Picks the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let (badge, color) = match score {
            s if s >= 80.0 => ("STRONG", Color::Green),
            s if s >= 60.0 => ("GOOD", Color::BrightGreen),
            s if s >= 40.0 => ("FAIR", Color::Yellow),
            s if s >= 20.0 => ("WEAK", Color::Red),
            _ => ("POOR", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_skill_list(&self, skills: &BTreeSet<String>, color: Color) -> String {
        if skills.is_empty() {
            return self.colorize("none", Color::BrightBlack);
        }
        let joined = skills.iter().cloned().collect::<Vec<_>>().join(", ");
        self.colorize(&joined, color)
    }

    fn format_candidate(
        &self,
        position: usize,
        result: &MatchResult,
        selected: bool,
        courses: &[(&str, &CourseRecommendation)],
    ) -> String {
        let mut output = String::new();

        let marker = if selected {
            self.colorize("✔", Color::Green)
        } else {
            self.colorize("✘", Color::BrightBlack)
        };

        output.push_str(&format!(
            "{} {:>2}. {} {}\n",
            marker,
            position,
            self.colorize(&result.candidate_id, Color::White),
            self.format_score_badge(result.final_score)
        ));
        output.push_str(&format!(
            "      Rank: {:.2} | Match: {:.2}% | Penalty: {:.2} | Final: {:.2}\n",
            result.rank_score, result.match_score_percent, result.penalty, result.final_score
        ));
        output.push_str(&format!(
            "      Matched ({}): {}\n",
            result.matched_skills.len(),
            self.format_skill_list(&result.matched_skills, Color::Green)
        ));
        output.push_str(&format!(
            "      Missing ({}): {}\n",
            result.missing_skills.len(),
            self.format_skill_list(&result.missing_skills, Color::Yellow)
        ));

        if self.detailed {
            output.push_str(&format!(
                "      Lexical: {:.3} | Semantic: {:.3}\n",
                result.lexical_similarity, result.semantic_similarity
            ));

            let rated: Vec<String> = result
                .proficiency
                .iter()
                .filter(|(_, level)| **level > ProficiencyLevel::Unknown)
                .map(|(skill, level)| format!("{} {}", skill, level.stars()))
                .collect();
            if !rated.is_empty() {
                output.push_str(&format!("      Proficiency: {}\n", rated.join(", ")));
            }

            output.push_str(&format!("      Profile: {}\n", feature_line(&result.features)));
            if !result.features.emails.is_empty() {
                output.push_str(&format!("      Email: {}\n", result.features.emails.join(", ")));
            }
        }

        for (skill, course) in courses {
            output.push_str(&format!(
                "      {} {} → {} <{}>\n",
                self.colorize("Learn", Color::Cyan),
                skill,
                course.title,
                course.url
            ));
        }

        for warning in &result.warnings {
            output.push_str(&format!("      {} {}\n", self.colorize("⚠", Color::Yellow), warning));
        }

        output
    }

    /// Skills of one document with their estimated level
    pub fn format_skill_profile(&self, source: &str, profile: &BTreeMap<String, ProficiencyLevel>) -> String {
        let mut output = self.format_header(&format!("Skills in {}", source), 1);

        if profile.is_empty() {
            output.push_str(&format!("{}\n", self.colorize("No skills found", Color::BrightBlack)));
            return output;
        }

        let width = profile.keys().map(|skill| skill.chars().count()).max().unwrap_or(0);
        for (skill, level) in profile {
            let color = match level {
                ProficiencyLevel::Advanced => Color::Green,
                ProficiencyLevel::Intermediate => Color::Cyan,
                ProficiencyLevel::Beginner => Color::Yellow,
                ProficiencyLevel::Unknown => Color::BrightBlack,
            };
            output.push_str(&format!(
                "  • {:<width$}  {}\n",
                skill,
                self.colorize(&level.to_string(), color),
                width = width
            ));
        }
        output.push_str(&format!("\n{} skills\n", profile.len()));
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;

        output.push_str(&self.format_header("CANDIDATE SCREENING REPORT", 1));
        output.push_str(&format!(
            "Generated: {} | Job: {} | Embedder: {}\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.job_source,
            report.metadata.embedder
        ));

        output.push_str(&self.format_header(&format!("Job Skills ({})", report.job_skills.len()), 2));
        output.push_str(&format!("{}\n", self.format_skill_list(&report.job_skills, Color::Cyan)));

        output.push_str(&self.format_header("Ranking", 2));
        if report.results.is_empty() {
            output.push_str("No candidates were screened.\n");
        }
        for (index, result) in report.results.iter().enumerate() {
            output.push_str(&self.format_candidate(
                index + 1,
                result,
                report.is_selected(index),
                &report.recommendations_for(result),
            ));
        }

        output.push_str(&self.format_header("Summary", 2));
        output.push_str(&format!(
            "Candidates: {} | Selected: {} | Rejected: {}\n",
            summary.total_candidates,
            self.colorize(&summary.selected_count.to_string(), Color::Green),
            self.colorize(&summary.rejected_count.to_string(), Color::Red)
        ));
        let shortlist: Vec<&str> = report
            .selected_results()
            .iter()
            .map(|result| result.candidate_id.as_str())
            .collect();
        if !shortlist.is_empty() {
            output.push_str(&format!("Shortlist: {}\n", self.colorize(&shortlist.join(", "), Color::Green)));
        }
        output.push_str(&format!(
            "Average match: {:.2}% | Average final: {:.2} | Matching rate: {:.2}%\n",
            summary.average_match_score, summary.average_final_score, summary.matching_rate
        ));
        if summary.degraded_count > 0 {
            output.push_str(&format!(
                "{}\n",
                self.colorize(&format!("{} candidate(s) could not be fully processed", summary.degraded_count), Color::Yellow)
            ));
        }

        if !summary.top_matched_skills.is_empty() {
            output.push_str(&self.format_header("Most Common Skills", 3));
            for entry in &summary.top_matched_skills {
                output.push_str(&format!("  • {} ({})\n", self.colorize(&entry.skill, Color::Green), entry.count));
            }
        }

        if !summary.top_missing_skills.is_empty() {
            output.push_str(&self.format_header("Most Missing Skills", 3));
            for entry in &summary.top_missing_skills {
                output.push_str(&format!("  • {} ({})\n", self.colorize(&entry.skill, Color::Yellow), entry.count));
            }
        }

        if self.detailed && !summary.skill_coverage.is_empty() {
            output.push_str(&self.format_header("Skill Coverage", 3));
            for coverage in &summary.skill_coverage {
                output.push_str(&format!(
                    "  {:<30} {:>3} candidates  {:>6.2}%\n",
                    coverage.skill, coverage.candidates, coverage.percent
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn skills_cell(skills: &BTreeSet<String>) -> String {
        if skills.is_empty() {
            "-".to_string()
        } else {
            skills.iter().map(|s| escape_cell(s)).collect::<Vec<_>>().join(", ")
        }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let mut output = String::new();
        let summary = &report.summary;

        output.push_str("# Candidate Screening Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Job:** `{}` | **Embedder:** `{}`\n\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.job_source,
                report.metadata.embedder
            ));
        }

        output.push_str("## Job Skills\n\n");
        output.push_str(&format!("{}\n\n", Self::skills_cell(&report.job_skills)));

        output.push_str("## Ranking\n\n");
        output.push_str("| # | Candidate | Selected | Rank | Match % | Penalty | Final | Matched | Missing |\n");
        output.push_str("|---|-----------|----------|------|---------|---------|-------|---------|---------|\n");
        for (index, result) in report.results.iter().enumerate() {
            output.push_str(&format!(
                "| {} | {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {} | {} |\n",
                index + 1,
                escape_cell(&result.candidate_id),
                if report.is_selected(index) { "yes" } else { "no" },
                result.rank_score,
                result.match_score_percent,
                result.penalty,
                result.final_score,
                Self::skills_cell(&result.matched_skills),
                Self::skills_cell(&result.missing_skills)
            ));
        }
        output.push('\n');

        output.push_str("## Summary\n\n");
        output.push_str(&format!("- **Candidates:** {}\n", summary.total_candidates));
        output.push_str(&format!("- **Selected:** {}\n", summary.selected_count));
        output.push_str(&format!("- **Rejected:** {}\n", summary.rejected_count));
        output.push_str(&format!("- **Average match score:** {:.2}%\n", summary.average_match_score));
        output.push_str(&format!("- **Average final score:** {:.2}\n", summary.average_final_score));
        output.push_str(&format!("- **Matching rate:** {:.2}%\n\n", summary.matching_rate));

        if !summary.skill_coverage.is_empty() {
            output.push_str("### Skill Coverage\n\n");
            output.push_str("| Skill | Candidates | % of CVs |\n");
            output.push_str("|-------|------------|----------|\n");
            for coverage in &summary.skill_coverage {
                output.push_str(&format!(
                    "| {} | {} | {:.2} |\n",
                    escape_cell(&coverage.skill),
                    coverage.candidates,
                    coverage.percent
                ));
            }
            output.push('\n');
        }

        if !summary.top_missing_skills.is_empty() {
            output.push_str("### Most Missing Skills\n\n");
            for entry in &summary.top_missing_skills {
                output.push_str(&format!("- {} ({})\n", escape_cell(&entry.skill), entry.count));
            }
            output.push('\n');
        }

        if !report.recommendations.is_empty() {
            output.push_str("## Recommended Courses\n\n");
            output.push_str("| Skill | Course | Link |\n");
            output.push_str("|-------|--------|------|\n");
            for (skill, courses) in &report.recommendations {
                for course in courses {
                    output.push_str(&format!(
                        "| {} | {} | [link]({}) |\n",
                        escape_cell(skill),
                        escape_cell(&course.title),
                        course.url
                    ));
                }
            }
            output.push('\n');
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*Generated by cv-matcher v{} (threshold {:.2}, top {})*\n",
                report.metadata.tool_version,
                report.config.matching.similarity_threshold,
                report.config.selection.top_k
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &BatchReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn feature_line(features: &ProfileFeatures) -> String {
    let flag = |present: bool, name: &str| format!("{} {}", if present { "✓" } else { "✗" }, name);
    [
        flag(features.linkedin, "LinkedIn"),
        flag(features.github, "GitHub"),
        flag(features.email, "Email"),
        flag(features.phone, "Phone"),
        flag(features.portfolio, "Portfolio"),
        flag(features.experience, "Experience"),
    ]
    .join("  ")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, job_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(job_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_screening{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_screening{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_screening{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::processing::ranking::{sort_results, CandidateAssessment, CandidateFilter, RankingEngine};
    use crate::processing::recommendation::{Course, CourseCatalogue, CourseRecommender};
    use crate::processing::similarity::{DocumentScore, PhraseMatch};
    use tempfile::TempDir;

    fn sample_report() -> BatchReport {
        let engine = RankingEngine::default();
        let job: BTreeSet<String> = ["python", "sql"].iter().map(|s| s.to_string()).collect();

        let mut results = vec![
            engine.score(CandidateAssessment {
                candidate_id: "alice".to_string(),
                document: DocumentScore {
                    percent: 72.5,
                    ..DocumentScore::default()
                },
                phrases: PhraseMatch {
                    matched: job.clone(),
                    missing: BTreeSet::new(),
                },
                ..CandidateAssessment::default()
            }),
            engine.degraded("bob|smith".to_string(), &job, "unreadable".to_string()),
        ];
        sort_results(&mut results);

        BatchReport::new(results, job, &Config::default(), &CandidateFilter::default(), "job.md", "feature-hashing")
    }

    #[test]
    fn test_console_without_colors() {
        let output = ConsoleFormatter::new(false, true).format_report(&sample_report()).unwrap();
        assert!(output.contains("CANDIDATE SCREENING REPORT"));
        assert!(output.contains("alice"));
        assert!(output.contains("Matched (2): python, sql"));
        assert!(output.contains("⚠ unreadable"));
        assert!(!output.contains("\u{1b}["));
    }

    #[test]
    fn test_json_round_trips_results() {
        let output = JsonFormatter::new(true).format_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["results"][0]["candidate_id"], "alice");
        assert_eq!(value["results"][1]["degraded"], true);
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let output = MarkdownFormatter::new(true).format_report(&sample_report()).unwrap();
        assert!(output.contains("# Candidate Screening Report"));
        assert!(output.contains("bob\\|smith"));
        assert!(output.contains("| python | 1 | 50.00 |"));
    }

    #[test]
    fn test_course_recommendations_rendered() {
        let recommender = CourseRecommender::new(CourseCatalogue::new(vec![Course::new(
            "SQL Essentials",
            "https://courses.test/sql",
            "Queries and joins",
        )]));
        let report = sample_report().with_recommendations(&recommender, 1);

        let console = ConsoleFormatter::new(false, false).format_report(&report).unwrap();
        assert!(console.contains("Learn sql → SQL Essentials <https://courses.test/sql>"));
        assert!(console.contains("Shortlist: alice, bob|smith"));

        let markdown = MarkdownFormatter::new(false).format_report(&report).unwrap();
        assert!(markdown.contains("## Recommended Courses"));
        assert!(markdown.contains("| sql | SQL Essentials | [link](https://courses.test/sql) |"));
    }

    #[test]
    fn test_skill_profile_listing() {
        let mut profile = BTreeMap::new();
        profile.insert("python".to_string(), ProficiencyLevel::Advanced);
        let output = ConsoleFormatter::new(false, false).format_skill_profile("cv.txt", &profile);
        assert!(output.contains("Skills in cv.txt"));
        assert!(output.contains("Advanced"));
    }

    #[test]
    fn test_save_and_suggest_filename() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("report.md");
        save_report_to_file("# hi", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hi");

        assert_eq!(suggest_filename(OutputFormat::Json, "jobs/backend.pdf", false), "backend_screening.json");
    }
}
