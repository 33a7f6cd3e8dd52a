use crate::config::AppConfig;
use crate::error::AppError;
use crate::telemetry;
use crate::workflows::bulletins::report::format_score;
use crate::workflows::bulletins::{BulletinPipeline, PipelineOptions, RunSummary};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "report-cards",
    about = "Generate PAES and Linova report cards from per-subject grade exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate every missing report card and the index page (default command)
    Generate(GenerateArgs),
    /// Print class statistics for each profile without writing documents
    Stats(StatsArgs),
}

#[derive(Args, Debug, Default)]
struct SourceArgs {
    /// Directory holding the per-subject and identity CSV exports
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Seed of the fallback score stream
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug, Default)]
struct GenerateArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Directory receiving the generated documents
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Write HTML only, skipping PDF conversion
    #[arg(long)]
    no_pdf: bool,
    /// Discard previously generated documents before the run
    #[arg(long)]
    reset: bool,
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Emit JSON instead of a text table
    #[arg(long)]
    json: bool,
}

pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(environment = ?config.environment, "report card generator starting");

    let command = cli
        .command
        .unwrap_or_else(|| Command::Generate(GenerateArgs::default()));

    match command {
        Command::Generate(args) => run_generate(args, config),
        Command::Stats(args) => run_stats(args, config),
    }
}

fn apply_source_overrides(options: &mut PipelineOptions, source: SourceArgs) {
    if let Some(data_dir) = source.data_dir {
        options.data_dir = data_dir;
    }
    if let Some(seed) = source.seed {
        options.seed = seed;
    }
}

fn run_generate(args: GenerateArgs, config: AppConfig) -> Result<(), AppError> {
    let GenerateArgs {
        source,
        output_dir,
        no_pdf,
        reset,
    } = args;

    let mut options = PipelineOptions::from_config(&config);
    apply_source_overrides(&mut options, source);
    if let Some(output_dir) = output_dir {
        options.output_dir = output_dir;
    }
    if no_pdf {
        options.pdf_command = None;
    }
    options.reset = reset;

    let summary = BulletinPipeline::new(options).run()?;
    render_run_summary(&summary);
    Ok(())
}

fn render_run_summary(summary: &RunSummary) {
    println!("Report card generation");
    println!("Students: {}", summary.students);

    for profile in &summary.profiles {
        println!(
            "- {}: {} generated, {} already present, {} failed",
            profile.kind.label(),
            profile.generated,
            profile.skipped,
            profile.failed.len()
        );
        for failure in &profile.failed {
            println!("    ! {}: {}", failure.student, failure.reason);
        }
    }

    println!("Index: {}", summary.index_path.display());
}

#[derive(Debug, Serialize)]
struct SubjectStatsView {
    subject: String,
    teacher: String,
    score_key: String,
    mean: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ProfileStatsView {
    profile: &'static str,
    overall_average: Option<f64>,
    subjects: Vec<SubjectStatsView>,
}

fn run_stats(args: StatsArgs, config: AppConfig) -> Result<(), AppError> {
    let mut options = PipelineOptions::from_config(&config);
    apply_source_overrides(&mut options, args.source);

    let pipeline = BulletinPipeline::new(options);
    let prepared = pipeline.prepare()?;

    let views: Vec<ProfileStatsView> = pipeline
        .profiles()
        .iter()
        .filter_map(|profile| {
            let stats = prepared.stats_for(profile.kind)?;
            Some(ProfileStatsView {
                profile: profile.kind.label(),
                overall_average: stats.overall_average,
                subjects: profile
                    .subjects
                    .iter()
                    .map(|subject| {
                        let entry = stats.subject(&subject.display_name);
                        SubjectStatsView {
                            subject: subject.display_name.clone(),
                            teacher: subject.teacher_name.clone(),
                            score_key: subject.score_key.clone(),
                            mean: entry.mean,
                            min: entry.min,
                            max: entry.max,
                        }
                    })
                    .collect(),
            })
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!("Class statistics ({} students)", prepared.students.len());
    for view in &views {
        println!(
            "\n{} (class average {})",
            view.profile,
            format_score(view.overall_average)
        );
        for subject in &view.subjects {
            println!(
                "- {} [{}]: mean {} | min {} | max {}",
                subject.subject,
                subject.teacher,
                format_score(subject.mean),
                format_score(subject.min),
                format_score(subject.max)
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "report-cards",
            "generate",
            "--data-dir",
            "exports",
            "--seed",
            "7",
            "--no-pdf",
            "--reset",
        ])
        .expect("arguments parse");

        match cli.command {
            Some(Command::Generate(args)) => {
                assert_eq!(args.source.data_dir, Some(PathBuf::from("exports")));
                assert_eq!(args.source.seed, Some(7));
                assert!(args.no_pdf);
                assert!(args.reset);
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_defaults_to_generate() {
        let cli = Cli::try_parse_from(["report-cards"]).expect("arguments parse");
        assert!(cli.command.is_none());
    }
}
