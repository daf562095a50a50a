//! cv-matcher: rank résumés against a job description

use clap::Parser;
use colored::Colorize;
use cv_matcher::cli::{Cli, Commands, ConfigAction, CoursesArgs, RankArgs, SkillsArgs};
use cv_matcher::config::Config;
use cv_matcher::error::{CvMatcherError, Result};
use cv_matcher::input::InputManager;
use cv_matcher::output::formatter::{save_report_to_file, suggest_filename, ConsoleFormatter, ReportGenerator};
use cv_matcher::output::BatchReport;
use cv_matcher::processing::engine::ProgressCallback;
use cv_matcher::processing::ranking::{CandidateFilter, MatchResult};
use cv_matcher::processing::recommendation::{CourseCatalogue, CourseRecommender};
use cv_matcher::processing::ScreeningEngine;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config.as_deref()).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, config: Config, config_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Rank(args) => rank(args, config).await,
        Commands::Skills(args) => skills(args, config).await,
        Commands::Courses(args) => courses(args, config),
        Commands::Config { action } => manage_config(action, config, config_path),
    }
}

async fn rank(args: RankArgs, mut config: Config) -> Result<()> {
    args.apply_to(&mut config).map_err(CvMatcherError::InvalidInput)?;
    let config = config.validated();
    let start_time = Instant::now();

    let mut input_manager = InputManager::new().with_cache(config.processing.enable_caching);
    let job_text = input_manager.try_extract_text(&args.job).await?;
    info!("Job description: {} ({} characters)", args.job.display(), job_text.len());

    let candidates = InputManager::collect_documents(&args.resumes)?;
    if candidates.is_empty() {
        return Err(CvMatcherError::InvalidInput(
            "No candidate documents found in the given paths".to_string(),
        ));
    }

    let engine = ScreeningEngine::from_config(&config)?;
    let job = engine.job_profile(&job_text);

    let recommender = match &config.recommendations.catalogue_path {
        Some(path) => Some(CourseRecommender::new(CourseCatalogue::load(path)?)),
        None => None,
    };

    eprintln!(
        "{} Screening {} candidates against {} ({} workers)",
        "▶".cyan(),
        candidates.len(),
        args.job.display(),
        engine.workers()
    );

    let progress_bar = create_progress_bar(candidates.len());
    let bar = progress_bar.clone();
    let progress: ProgressCallback = Arc::new(move |result: &MatchResult| {
        bar.set_message(result.candidate_id.clone());
        bar.inc(1);
    });

    let results = engine.screen_files(&job, &candidates, Some(progress)).await;
    progress_bar.finish_and_clear();

    let degraded = results.iter().filter(|r| r.degraded).count();
    if degraded > 0 {
        warn!("{} candidate(s) were only partially processed", degraded);
    }

    let filter = CandidateFilter::from_config(&config.selection).with_required_skills(&args.required_skills);
    let mut report = BatchReport::new(
        results,
        job.skills,
        &config,
        &filter,
        args.job.display().to_string(),
        engine.embedder_name(),
    );
    if let Some(recommender) = &recommender {
        report = report.with_recommendations(recommender, config.recommendations.courses_per_skill);
    }

    let generator = ReportGenerator::with_options(
        config.output.color_output && args.save.is_none(),
        config.output.detailed,
        true,
        true,
    );
    let rendered = generator.generate_report(&report, config.output.format)?;

    match &args.save {
        Some(path) => {
            let path = if path.is_dir() {
                path.join(suggest_filename(
                    config.output.format,
                    &args.job.to_string_lossy(),
                    true,
                ))
            } else {
                path.clone()
            };
            save_report_to_file(&rendered, &path)?;
            eprintln!("{} Report saved to {}", "✔".green(), path.display());
        }
        None => println!("{}", rendered),
    }

    info!("Finished in {:.2?}", start_time.elapsed());
    Ok(())
}

async fn skills(args: SkillsArgs, mut config: Config) -> Result<()> {
    args.apply_to(&mut config).map_err(CvMatcherError::InvalidInput)?;
    let config = config.validated();

    let mut input_manager = InputManager::new().with_cache(false);
    let text = input_manager.try_extract_text(&args.file).await?;

    let engine = ScreeningEngine::from_config(&config)?;
    let profile = engine.skill_profile(&text);

    let formatter = ConsoleFormatter::new(config.output.color_output, false);
    println!("{}", formatter.format_skill_profile(&args.file.display().to_string(), &profile));
    Ok(())
}

fn courses(args: CoursesArgs, mut config: Config) -> Result<()> {
    args.apply_to(&mut config);
    let config = config.validated();

    let path = config.recommendations.catalogue_path.as_deref().ok_or_else(|| {
        CvMatcherError::InvalidInput(
            "No course catalogue given; pass --catalogue or set recommendations.catalogue_path".to_string(),
        )
    })?;
    let recommender = CourseRecommender::new(CourseCatalogue::load(path)?);
    let per_skill = config.recommendations.courses_per_skill;

    for skill in &args.skills {
        println!("{}", skill.bold());
        let found = recommender.recommend(&skill.to_lowercase(), per_skill);
        if found.is_empty() {
            println!("  {}", "no matching course".bright_black());
        }
        for course in found {
            println!("  • {} <{}> ({:.2})", course.title, course.url, course.similarity);
        }
    }

    Ok(())
}

fn manage_config(action: Option<ConfigAction>, config: Config, config_path: Option<&Path>) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::config_path);

    match action {
        Some(ConfigAction::Show) | None => {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| CvMatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;
            println!("# {}\n", path.display());
            println!("{}", rendered);
        }

        Some(ConfigAction::Reset) => {
            Config::default().save_to(&path)?;
            println!("{} Configuration reset: {}", "✔".green(), path.display());
        }

        Some(ConfigAction::Path) => {
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} candidates {msg}")
        .map(|style| style.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
