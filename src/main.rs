use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info_span};

use repo_insights::analysis::{self, AnalysisBundle, AnalysisOptions};
use repo_insights::config::Config;
use repo_insights::logging;
use repo_insights::pipeline::{self, normalize::NormalizeReport, PipelineOutcome};
use repo_insights::report;

#[derive(Parser)]
#[command(name = "repo_insights")]
#[command(about = "GitHub repository dataset cleaning and analysis")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean the raw dataset and write the normalized CSV
    Normalize {
        /// Raw dataset path (defaults to the configured input)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Where to write the normalized CSV (defaults to <out_dir>/normalized.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Normalize, then compute and write every analysis artifact
    Analyze {
        /// Raw dataset path (defaults to the configured input)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Directory artifacts are written into
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Run normalize and analyze sequentially
    Run {
        /// Raw dataset path (defaults to the configured input)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Directory artifacts are written into
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

fn main() {
    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("run failed: {e:#}");
        println!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Normalize { input, output } => {
            println!("🧹 Normalizing dataset...");
            let input = input.unwrap_or_else(|| config.input.path.clone());
            let output = output.unwrap_or_else(|| config.report.out_dir.join("normalized.csv"));

            let outcome = load_and_normalize(&input)?;
            report::write_normalized_csv(&outcome.table, &output)?;
            print_normalize_results(&outcome.report, &output);
        }
        Commands::Analyze { input, out_dir } => {
            println!("📊 Analyzing dataset...");
            let input = input.unwrap_or_else(|| config.input.path.clone());
            let out_dir = out_dir.unwrap_or_else(|| config.report.out_dir.clone());

            let outcome = load_and_normalize(&input)?;
            let bundle = analyze(&outcome, &config)?;
            let paths = report::write_all(&outcome.table, &bundle, &out_dir)?;
            print_analysis_results(&bundle, &paths);
        }
        Commands::Run { input, out_dir } => {
            println!("🚀 Running full pipeline (normalize + analyze)...");
            let input = input.unwrap_or_else(|| config.input.path.clone());
            let out_dir = out_dir.unwrap_or_else(|| config.report.out_dir.clone());

            println!("\n🧹 Step 1: Normalizing...");
            let outcome = load_and_normalize(&input)?;
            print_normalize_results(&outcome.report, &out_dir.join("normalized.csv"));

            println!("\n📊 Step 2: Analyzing...");
            let bundle = analyze(&outcome, &config)?;
            let paths = report::write_all(&outcome.table, &bundle, &out_dir)?;
            print_analysis_results(&bundle, &paths);

            println!("\n✅ Full pipeline completed successfully!");
        }
    }
    Ok(())
}

fn load_and_normalize(input: &Path) -> anyhow::Result<PipelineOutcome> {
    let span = info_span!("pipeline", input = %input.display());
    let _enter = span.enter();
    pipeline::load_and_normalize(input).with_context(|| format!("processing {}", input.display()))
}

fn analyze(outcome: &PipelineOutcome, config: &Config) -> anyhow::Result<AnalysisBundle> {
    let span = info_span!("analysis");
    let _enter = span.enter();
    let options = AnalysisOptions {
        top_repos: config.report.top_repos,
        top_tags: config.report.top_tags,
        popular_subset: config.report.popular_subset,
        top_owners: config.report.top_owners,
    };
    Ok(analysis::run(&outcome.table, &options)?)
}

fn print_normalize_results(report: &NormalizeReport, output: &Path) {
    let coerced_total: usize = report.coerced_nulls.iter().map(|(_, n)| n).sum();
    println!("\n📊 Normalize results:");
    println!("   Rows: {}", report.rows);
    println!("   Coerced to null: {}", coerced_total);
    for (column, coerced) in &report.coerced_nulls {
        if *coerced > 0 {
            println!("   - {}: {}", column, coerced);
        }
    }
    println!("   Output file: {}", output.display());
}

fn print_analysis_results(bundle: &AnalysisBundle, paths: &[PathBuf]) {
    println!("\n📊 Analysis results:");
    println!("   Rows: {}", bundle.summary.rows);
    println!("   Topics: {}", bundle.topic_means.len());
    if let Some(top) = bundle.top_starred.first() {
        println!(
            "   Most starred: {}/{} ({} stars)",
            top.user_name, top.repo_name, top.value
        );
    }
    if let Some(owner) = bundle.owners.first() {
        println!(
            "   Busiest owner: {} ({} repos)",
            owner.user_name, owner.repos
        );
    }
    if let Some(tag) = bundle.top_tags.first() {
        println!("   Top tag: {} ({} repos)", tag.tag, tag.count);
    }

    println!("\n✅ Wrote {} artifacts:", paths.len());
    for path in paths {
        println!("   - {}", path.display());
    }
}
