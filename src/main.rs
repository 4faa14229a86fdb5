use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fleetmap::report::{summary, write_graph};
use fleetmap::{aggregate, DirectorySource, FileSource, ReportSource, Roster, Settings};

#[derive(Parser, Debug)]
#[command(name = "fleetmap")]
#[command(about = "Infer a cross-host process communication graph from connection traces")]
struct Args {
    /// Config file (TOML). Defaults to fleetmap.toml if present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory of persisted per-node artifacts (<dir>/<node>/breakfast.csv, top.txt)
    #[arg(short, long, conflicts_with = "submission")]
    results: Option<PathBuf>,

    /// Agent upload payload (JSON); repeat for each node
    #[arg(short, long)]
    submission: Vec<PathBuf>,

    /// Expected node; repeat for each node. Defaults to every node found
    #[arg(short, long = "node")]
    nodes: Vec<String>,

    /// Capture window length (e.g., "15s")
    #[arg(short, long)]
    window: Option<String>,

    /// Connection state codes that form edges (e.g., "-1,-2")
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    edge_states: Vec<i32>,

    /// Where to write the graph JSON
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let settings = apply_overrides(Settings::load(args.config.as_deref())?, &args);
    let engine = settings.engine()?;
    info!(
        window = ?engine.normalize.window,
        "aggregation settings loaded"
    );

    let mut source: Box<dyn ReportSource> = if args.submission.is_empty() {
        if settings.nodes.is_empty() {
            Box::new(DirectorySource::new(&settings.results_dir))
        } else {
            Box::new(DirectorySource::with_nodes(
                &settings.results_dir,
                settings.nodes.clone(),
            ))
        }
    } else {
        Box::new(FileSource::new(&args.submission))
    };

    let roster = if settings.nodes.is_empty() {
        Roster::open()
    } else {
        Roster::expecting(settings.nodes.iter().cloned())
    };

    let reports = roster
        .collect(
            source.as_mut(),
            Duration::from_millis(settings.poll_interval_ms),
        )
        .context("collection failed")?;
    let graph = aggregate(&reports, &engine).context("aggregation failed")?;

    write_graph(&graph, &settings.output)?;
    info!(
        output = %settings.output.display(),
        summary = %summary(&graph),
        "graph written"
    );
    Ok(())
}

/// Command-line flags take precedence over file and environment settings.
fn apply_overrides(mut settings: Settings, args: &Args) -> Settings {
    if let Some(results) = &args.results {
        settings.results_dir = results.clone();
    }
    if !args.nodes.is_empty() {
        settings.nodes = args.nodes.clone();
    }
    if let Some(window) = &args.window {
        settings.window = window.clone();
    }
    if !args.edge_states.is_empty() {
        settings.edge_states = args.edge_states.clone();
    }
    if let Some(output) = &args.output {
        settings.output = output.clone();
    }
    settings
}
