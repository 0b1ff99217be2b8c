//! CiliAI: literature mining for ciliary gene phenotypes.
//! Entry point for the `ciliai` binary.

mod config;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use ciliai_miner::export::write_csv;
use ciliai_miner::input::{detect_gene_in_question, parse_gene_list};
use ciliai_miner::{AnalysisMode, LiteratureMinerEngine, MinerProgress, RunReport};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "ciliai",
    about = "Mine PubMed and PMC for ciliary length and frequency phenotypes of a gene list",
    version
)]
struct Cli {
    /// Gene symbols, separated by spaces or commas
    genes: Vec<String>,

    /// Config file (default: $CILIAI_CONFIG or ./ciliai.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// literature, expert or hybrid
    #[arg(long)]
    mode: Option<AnalysisMode>,

    /// Maximum articles per gene and source
    #[arg(long)]
    articles: Option<usize>,

    /// JSON file of ciliary screen results keyed by gene
    #[arg(long)]
    screen_data: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a per-gene CSV summary
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Take the gene from a question such as "What does IFT88 do?"
    #[arg(short, long)]
    question: Option<String>,

    /// Log filter directive, e.g. "ciliai=trace"
    #[arg(long)]
    log: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_logging(cli: &Cli, logging: &config::LoggingConfig) {
    let filter = match &cli.log {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter)),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if cli.json_logs || logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn requested_genes(cli: &Cli) -> anyhow::Result<Vec<String>> {
    let mut genes = parse_gene_list(&cli.genes.join(" "));
    if genes.is_empty() {
        if let Some(question) = &cli.question {
            genes.extend(detect_gene_in_question(question));
        }
    }
    if genes.is_empty() {
        bail!("No gene symbols given. Pass genes as arguments or use --question.");
    }
    Ok(genes)
}

fn write_report(report: &RunReport, json_path: Option<&PathBuf>, csv_path: Option<&PathBuf>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match json_path {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            info!("JSON report written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }

    if let Some(path) = csv_path {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_csv(report, BufWriter::new(file)).with_context(|| format!("writing {}", path.display()))?;
        info!("CSV summary written to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    // Load configuration
    let config_path = config::Config::resolve_path(cli.config.as_deref(), std::env::var("CILIAI_CONFIG").ok());
    let loaded = config::Config::load(&config_path)?;
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();

    init_logging(&cli, &config.logging);

    info!("CiliAI starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    if found {
        info!("Configuration loaded from {}", config_path.display());
    } else {
        warn!("Config file not found: {}. Using defaults.", config_path.display());
    }

    config.apply_api_key(std::env::var("NCBI_API_KEY").ok());
    if let Some(mode) = cli.mode {
        config.miner.mode = mode;
    }
    if let Some(n) = cli.articles {
        config.miner.articles_per_gene = n;
    }
    if cli.screen_data.is_some() {
        config.miner.screen_data_path = cli.screen_data.clone();
    }

    let genes = requested_genes(&cli)?;
    info!("Mode: {}, genes: {}", config.miner.mode.as_str(), genes.join(", "));

    // Ctrl-C stops the run between genes; the partial report is still written
    let cancel = CancellationToken::new();
    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the current gene...");
            ctrl_c_token.cancel();
        }
    });

    let (progress_tx, mut progress_rx) = broadcast::channel::<MinerProgress>(64);
    tokio::spawn(async move {
        while let Ok(p) = progress_rx.recv().await {
            info!("[{}/{}] {}", p.index + 1, p.total, p.gene);
        }
    });

    let engine = LiteratureMinerEngine::from_config(config.miner.clone())
        .context("building mining engine")?
        .with_progress(progress_tx)
        .with_cancellation(cancel);

    let report = engine.process_genes(&genes).await;

    let failed = report.results.values().filter(|r| r.error.is_some()).count();
    info!(
        "Run finished: {} genes, {} failed, {} ms{}",
        report.metadata.gene_count,
        failed,
        report.metadata.duration_ms,
        if report.metadata.cancelled { " (cancelled)" } else { "" }
    );

    let json_path = cli.output.as_ref().or(config.output.json_path.as_ref());
    let csv_path = cli.csv.as_ref().or(config.output.csv_path.as_ref());
    write_report(&report, json_path, csv_path)
}
