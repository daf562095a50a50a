//! Integration tests for the cv matcher

use cv_matcher::config::{Config, VocabularyMode};
use cv_matcher::input::InputManager;
use cv_matcher::output::formatter::{JsonFormatter, OutputFormatter};
use cv_matcher::output::BatchReport;
use cv_matcher::processing::embeddings::HashingEmbedder;
use cv_matcher::processing::ranking::CandidateFilter;
use cv_matcher::processing::recommendation::{CourseCatalogue, CourseRecommender};
use cv_matcher::processing::vocabulary::{Blocklist, SkillLexicon, VocabularyFilter};
use cv_matcher::{CandidateInput, MatchResult, ProficiencyLevel, ScreeningEngine};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const JOB: &str = "Data Engineer\n\
    We need Python, SQL and Airflow.\n\
    Docker and Kubernetes are a plus.";

fn engine_with(config: &Config) -> ScreeningEngine {
    ScreeningEngine::new(config, VocabularyFilter::default(), Arc::new(HashingEmbedder::default()))
}

fn engine() -> ScreeningEngine {
    engine_with(&Config::default())
}

fn candidates() -> Vec<CandidateInput> {
    vec![
        CandidateInput::new(
            "alice",
            "Alice Smith\nalice@example.com\nExpert in Python. Advanced SQL. Airflow, Docker, Kubernetes.\nWork experience: Acme",
        ),
        CandidateInput::new("bob", "Bob Jones\nFamiliar with Python. Excel, PowerPoint."),
        CandidateInput::new("carol", "Carol White\nPastry chef. Croissants and baguettes."),
        CandidateInput::new("dan", "Dan Brown\nIntermediate SQL. Docker."),
    ]
}

fn write(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_final_score_formula_holds_for_every_candidate() {
    let results = engine().screen_texts(JOB, candidates()).await;
    assert_eq!(results.len(), 4);

    for result in &results {
        let expected_penalty = 2.5 * result.missing_skills.len() as f64;
        assert!((result.penalty - expected_penalty).abs() < 1e-9);

        let expected_final = ((result.match_score_percent - result.penalty).max(0.0) * 100.0).round() / 100.0;
        assert!((result.final_score - expected_final).abs() < 1e-9);
        assert!(result.final_score >= 0.0);
        assert!((0.0..=100.0).contains(&result.match_score_percent));
    }
}

#[tokio::test]
async fn test_matched_and_missing_partition_job_skills() {
    let engine = engine();
    let job_skills = engine.extract_skills(JOB);
    assert!(job_skills.contains("python"));
    assert!(job_skills.contains("sql"));

    let results = engine.screen_texts(JOB, candidates()).await;
    for result in &results {
        let union: BTreeSet<String> = result.matched_skills.union(&result.missing_skills).cloned().collect();
        assert_eq!(union, job_skills, "partition broken for {}", result.candidate_id);
        assert!(result.matched_skills.is_disjoint(&result.missing_skills));
    }
}

#[tokio::test]
async fn test_ranking_is_a_deterministic_total_order() {
    let results = engine().screen_texts(JOB, candidates()).await;

    for pair in results.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let ordered = a.rank_score > b.rank_score
            || (a.rank_score == b.rank_score && a.final_score > b.final_score)
            || (a.rank_score == b.rank_score && a.final_score == b.final_score && a.candidate_id < b.candidate_id);
        assert!(ordered, "{} should not precede {}", a.candidate_id, b.candidate_id);
    }

    assert_eq!(results[0].candidate_id, "alice");
}

#[tokio::test]
async fn test_identical_inputs_yield_identical_results() {
    let first = engine().screen_texts(JOB, candidates()).await;
    let mut reversed = candidates();
    reversed.reverse();
    let second = engine().screen_texts(JOB, reversed).await;

    assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
}

#[tokio::test]
async fn test_single_worker_matches_parallel_run() {
    let mut config = Config::default();
    config.processing.workers = 1;

    let sequential = engine_with(&config).screen_texts(JOB, candidates()).await;
    let parallel = engine().screen_texts(JOB, candidates()).await;
    assert_eq!(sequential, parallel);
}

#[tokio::test]
async fn test_empty_job_description() {
    let results = engine().screen_texts("", candidates()).await;

    for result in &results {
        assert!(result.matched_skills.is_empty());
        assert!(result.missing_skills.is_empty());
        assert_eq!(result.penalty, 0.0);
    }
}

#[tokio::test]
async fn test_no_candidates() {
    let results: Vec<MatchResult> = engine().screen_texts(JOB, Vec::new()).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_expert_cue_marks_matched_skill_advanced() {
    let results = engine().screen_texts(JOB, candidates()).await;
    let alice = results.iter().find(|r| r.candidate_id == "alice").unwrap();

    assert!(alice.matched_skills.contains("python"));
    assert_eq!(alice.proficiency.get("python"), Some(&ProficiencyLevel::Advanced));
    assert_eq!(alice.proficiency.get("sql"), Some(&ProficiencyLevel::Advanced));
    assert!(alice.features.email);
    assert!(alice.features.experience);
    assert_eq!(alice.features.emails, vec!["alice@example.com"]);

    let dan = results.iter().find(|r| r.candidate_id == "dan").unwrap();
    assert_eq!(dan.proficiency.get("sql"), Some(&ProficiencyLevel::Intermediate));
}

#[tokio::test]
async fn test_lexicon_mode_restricts_vocabulary() {
    let lexicon = SkillLexicon::new(["python", "sql"]);
    let filter = VocabularyFilter::new(VocabularyMode::Lexicon, Blocklist::default(), Some(lexicon));
    let engine = ScreeningEngine::new(&Config::default(), filter, Arc::new(HashingEmbedder::default()));

    let skills = engine.extract_skills(JOB);
    let expected: BTreeSet<String> = ["python", "sql"].iter().map(|s| s.to_string()).collect();
    assert_eq!(skills, expected);
}

#[tokio::test]
async fn test_screen_files_with_mixed_inputs() {
    let dir = TempDir::new().unwrap();
    let cvs = dir.path().join("cvs");
    std::fs::create_dir(&cvs).unwrap();

    std::fs::write(cvs.join("erin.txt"), "Expert in Python. SQL and Airflow.").unwrap();
    std::fs::write(cvs.join("frank.md"), "# Frank\n\n- **Docker**\n- Kubernetes\n").unwrap();
    // Latin-1 bytes are not valid UTF-8
    std::fs::write(cvs.join("gina.txt"), b"Gin\xe9\nSQL, Python").unwrap();
    std::fs::write(cvs.join("notes.csv"), "ignored").unwrap();
    let broken = write(&dir, "broken.pdf", b"%PDF-1.4 definitely not a pdf");

    let mut paths = InputManager::collect_documents(&[cvs]).unwrap();
    assert_eq!(paths.len(), 3);
    paths.push(broken);

    let engine = engine();
    let job = engine.job_profile(JOB);
    let results = engine.screen_files(&job, &paths, None).await;
    assert_eq!(results.len(), 4);

    let erin = results.iter().find(|r| r.candidate_id == "erin").unwrap();
    assert!(erin.matched_skills.contains("python"));
    assert!(!erin.degraded);

    let frank = results.iter().find(|r| r.candidate_id == "frank").unwrap();
    assert!(frank.matched_skills.contains("docker"));

    let gina = results.iter().find(|r| r.candidate_id == "gina").unwrap();
    assert!(gina.matched_skills.contains("sql"));
    assert!(!gina.warnings.is_empty());

    let pdf = results.iter().find(|r| r.candidate_id == "broken").unwrap();
    assert!(pdf.degraded);
    assert!(pdf.matched_skills.is_empty());
    assert_eq!(pdf.final_score, 0.0);
}

#[tokio::test]
async fn test_job_description_must_be_readable() {
    let dir = TempDir::new().unwrap();
    let mut manager = InputManager::new();

    assert!(manager.try_extract_text(&dir.path().join("missing.txt")).await.is_err());

    let empty = write(&dir, "empty.txt", b"   ");
    assert!(manager.try_extract_text(&empty).await.is_err());

    let job = write(&dir, "job.txt", JOB.as_bytes());
    assert!(manager.try_extract_text(&job).await.unwrap().contains("Airflow"));
}

#[tokio::test]
async fn test_batch_report_end_to_end() {
    let mut config = Config::default();
    config.selection.top_k = 2;

    let engine = engine_with(&config);
    let results = engine.screen_texts(JOB, candidates()).await;
    let job_skills = engine.extract_skills(JOB);

    let report = BatchReport::new(results, job_skills, &config, &CandidateFilter::default(), "job.txt", engine.embedder_name());

    assert_eq!(report.selected, vec![0, 1]);
    assert_eq!(report.selected_results()[0].candidate_id, "alice");
    assert_eq!(report.rejected_results().len(), 2);
    assert_eq!(report.summary.total_candidates, 4);

    let json = JsonFormatter::new(false).format_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["summary"]["selected_count"], 2);
    assert_eq!(value["results"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_same_file_name_in_two_folders_stays_two_candidates() {
    let dir = TempDir::new().unwrap();
    let mut folders = Vec::new();
    for (folder, text) in [("a", "Expert in Python. SQL, Airflow."), ("b", "Familiar with Python.")] {
        let path = dir.path().join(folder);
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("resume.txt"), text).unwrap();
        folders.push(path);
    }

    let paths = InputManager::collect_documents(&folders).unwrap();
    let engine = engine();
    let job = engine.job_profile(JOB);
    let results = engine.screen_files(&job, &paths, None).await;

    let ids: Vec<&str> = results.iter().map(|r| r.candidate_id.as_str()).collect();
    assert_eq!(ids, vec!["a/resume", "b/resume"]);

    let mut config = Config::default();
    config.selection.top_k = 1;
    let report = BatchReport::new(results, job.skills, &config, &CandidateFilter::default(), "job.txt", engine.embedder_name());

    assert_eq!(report.selected_results().len() + report.rejected_results().len(), 2);
    assert_eq!(report.selected_results()[0].candidate_id, "a/resume");
    assert_eq!(report.rejected_results()[0].candidate_id, "b/resume");
    assert_eq!(report.summary.rejected_count, 1);
}

#[tokio::test]
async fn test_report_recommends_courses_for_gaps() {
    let catalogue = CourseCatalogue::from_reader(
        "Course Title,Course URL,Course Short Intro\n\
         Kubernetes in Production,https://courses.test/k8s,Run clusters with Kubernetes\n\
         Airflow Pipelines,https://courses.test/airflow,Orchestrate data pipelines with Airflow\n"
            .as_bytes(),
    )
    .unwrap();
    let recommender = CourseRecommender::new(catalogue);

    let engine = engine();
    let results = engine.screen_texts(JOB, candidates()).await;
    let report = BatchReport::new(
        results,
        engine.extract_skills(JOB),
        &Config::default(),
        &CandidateFilter::default(),
        "job.txt",
        engine.embedder_name(),
    )
    .with_recommendations(&recommender, 1);

    assert_eq!(report.recommendations["kubernetes"][0].url, "https://courses.test/k8s");
    assert_eq!(report.recommendations["airflow"][0].url, "https://courses.test/airflow");

    let bob = report.results.iter().find(|r| r.candidate_id == "bob").unwrap();
    let for_bob: Vec<&str> = report.recommendations_for(bob).iter().map(|(skill, _)| *skill).collect();
    assert!(for_bob.contains(&"kubernetes"));
    assert!(!for_bob.contains(&"python"));
}
