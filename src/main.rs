//! seoscan: batch SEO content quality scoring
//!
//! Scores pre-fetched web pages for cross-page duplicate content and
//! suggestive language, fusing both into a composite grade per URL.

use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use seoscan::{
    batch::{BatchOrchestrator, DocumentSource, FetchError, FetchedDocument, StaticSource},
    config::Config,
    quality::QualityAnalyzer,
    util::truncate_str,
    UrlOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "seoscan")]
#[command(about = "Batch SEO content quality scoring")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "seoscan.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a batch of pre-fetched documents
    Analyze {
        /// JSON file with an array of fetched documents
        /// ({url, paragraphs, fetch_succeeded?, error?})
        documents: PathBuf,

        /// Restrict analysis to these URLs (default: all in the file)
        #[arg(short, long)]
        url: Vec<String>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Override the pairwise similarity threshold
        #[arg(long)]
        similarity_threshold: Option<f32>,

        /// Override the worker pool size
        #[arg(short, long)]
        workers: Option<usize>,

        /// Whole-batch deadline in seconds
        #[arg(long)]
        deadline_secs: Option<u64>,
    },

    /// Write a starter configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Analyze {
            documents,
            url,
            format,
            similarity_threshold,
            workers,
            deadline_secs,
        } => {
            analyze(
                config,
                documents,
                url,
                format,
                similarity_threshold,
                workers,
                deadline_secs,
            )
            .await
        }
        Commands::Init { path } => init_config(path),
    }
}

/// Source wrapper that advances a progress bar as documents are delivered
struct ProgressSource {
    inner: StaticSource,
    bar: ProgressBar,
}

#[async_trait]
impl DocumentSource for ProgressSource {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let result = self.inner.fetch(url).await;
        self.bar.inc(1);
        result
    }
}

#[allow(clippy::too_many_arguments)]
async fn analyze(
    mut config: Config,
    documents: PathBuf,
    urls: Vec<String>,
    format: String,
    similarity_threshold: Option<f32>,
    workers: Option<usize>,
    deadline_secs: Option<u64>,
) -> Result<()> {
    if let Some(threshold) = similarity_threshold {
        config.analysis.similarity_threshold = threshold;
    }
    if let Some(workers) = workers {
        config.batch.max_workers = workers;
    }
    if let Some(deadline) = deadline_secs {
        config.batch.deadline_secs = Some(deadline);
    }

    let source = StaticSource::from_json_file(&documents)
        .map_err(|e| anyhow::anyhow!("Failed to load documents: {}", e))?;

    let mut urls = if urls.is_empty() { source.urls() } else { urls };
    urls.sort();

    info!("Analyzing {} URLs from {}", urls.len(), documents.display());

    let bar = ProgressBar::new(urls.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar.set_message("extracting");

    let progress_source = Arc::new(ProgressSource {
        inner: source,
        bar: bar.clone(),
    });

    let quality = QualityAnalyzer::from_config(&config.quality);
    let orchestrator = BatchOrchestrator::new(config, progress_source, quality)?;
    let report = orchestrator.run(&urls).await?;
    bar.finish_and_clear();

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            print_text_report(&urls, &report);
        }
    }

    Ok(())
}

fn print_text_report(urls: &[String], report: &seoscan::BatchReport) {
    println!("\nSEO Analysis Results");
    println!("====================");

    for url in urls {
        let Some(outcome) = report.results.get(url) else {
            continue;
        };
        match outcome {
            UrlOutcome::Completed(result) => {
                println!(
                    "\n{}  [{:.1} / {}]",
                    truncate_str(url, 70),
                    result.seo_score,
                    result.grade
                );
                println!(
                    "   duplicates: {:.1}% ({} of {} paragraphs)",
                    result.duplicate.duplicate_rate,
                    result.duplicate.duplicate_paragraphs.len(),
                    result.duplicate.total_paragraphs
                );
                println!(
                    "   language:   {} (raw {}, via {:?})",
                    result.quality.tier, result.quality.raw_score, result.quality.source
                );
                for rec in &result.recommendations {
                    println!("   - {}", rec);
                }
            }
            UrlOutcome::Failed { error } => {
                println!("\n{}  [failed]", truncate_str(url, 70));
                println!("   error: {}", error);
            }
        }
    }

    let stats = &report.stats;
    println!("\nBatch Summary");
    println!("=============");
    println!("Total URLs:          {}", stats.total_urls);
    println!("Succeeded:           {}", stats.succeeded_urls);
    println!("Failed:              {}", stats.failed_urls);
    println!("High duplicate:      {}", stats.high_duplicate_count);
    println!("Avg duplicate rate:  {:.1}%", stats.avg_duplicate_rate);
    println!("Avg SEO score:       {:.1}", stats.average_seo_score);
    if !stats.grade_distribution.is_empty() {
        let mut grades: Vec<(&String, &usize)> = stats.grade_distribution.iter().collect();
        grades.sort();
        println!("Grades:");
        for (grade, count) in grades {
            println!("  {}: {}", grade, count);
        }
    }
}

fn init_config(path: PathBuf) -> Result<()> {
    let config = Config::default();
    let config_path = path.join("seoscan.toml");

    let toml_content = format!(
        r#"# seoscan configuration

[analysis]
# Pairwise cosine cutoff for duplicate classification (inclusive)
similarity_threshold = {}
# Duplicate-rate alarm threshold (%)
duplicate_threshold = {}
# Fusion weights; must sum to 1.0
duplicate_weight = {}
quality_weight = {}
# Count same-page paragraph repetition toward that page's duplicate rate
count_intra_url = {}

[batch]
max_workers = {}
request_timeout_secs = {}
# deadline_secs = 120

[quality]
# Uncomment to enable the external model-backed scorer; without it only
# the keyword rule engine runs.
# endpoint = "https://api.openai.com/v1/chat/completions"
# api_key = ""
model = "{}"
timeout_secs = {}

[logging]
format = "text"
level = "info"
"#,
        config.analysis.similarity_threshold,
        config.analysis.duplicate_threshold,
        config.analysis.duplicate_weight,
        config.analysis.quality_weight,
        config.analysis.count_intra_url,
        config.batch.max_workers,
        config.batch.request_timeout_secs,
        config.quality.model,
        config.quality.timeout_secs,
    );

    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
