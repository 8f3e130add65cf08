//! # wps-cli
//!
//! Command-line front end for the WPS legacy transformer.
//!
//! Sniffs the vocabulary of documents, rewrites them between WPS 1.0.0 and
//! 2.0 and shows their canonical form.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use wps_ir::{Cursor, Version};
use wps_pipeline::{BatchConfig, BatchJob, BatchMode, LegacyTransformer, TransformerConfig};

#[derive(Parser)]
#[command(name = "wps")]
#[command(about = "Translate WPS documents between the 1.0.0 and 2.0 vocabularies")]
#[command(version)]
struct Cli {
    /// Path to a transformer configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report which vocabulary a document uses
    Sniff {
        /// Input file paths
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Print one JSON object per input
        #[arg(long)]
        json: bool,
    },

    /// Rewrite documents into another vocabulary
    Translate {
        /// Input file paths
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Vocabulary to write (legacy or current)
        #[arg(short, long)]
        to: Version,

        /// Directory receiving the rewritten documents
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Bind each document to the canonical model before writing it
        #[arg(long)]
        bind: bool,

        /// Maximum number of documents processed at once
        #[arg(short, long, default_value_t = 4)]
        jobs: usize,
    },

    /// Bind a document and write it in another vocabulary
    Convert {
        /// Input file path
        input: PathBuf,

        /// Output file path (stdout when omitted)
        output: Option<PathBuf>,

        /// Vocabulary to write (legacy or current)
        #[arg(short, long)]
        to: Version,
    },

    /// Show the canonical form of a document
    Show {
        /// Input file path
        input: PathBuf,

        /// Canonical element path to print, e.g. `Contents/ProcessSummary[1]/Identifier`
        #[arg(short, long)]
        path: Option<String>,

        /// Output format for the bound document
        #[arg(short, long, value_enum, default_value_t = ShowFormat::Json)]
        format: ShowFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ShowFormat {
    Json,
    Yaml,
}

#[derive(Serialize)]
struct SniffReport<'a> {
    path: &'a Path,
    version: Version,
    wire_version: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let transformer = load_transformer(cli.config.as_deref())?;

    match cli.command {
        Commands::Sniff { inputs, json } => sniff(&transformer, &inputs, json),
        Commands::Translate {
            inputs,
            to,
            out_dir,
            bind,
            jobs,
        } => {
            let mode = if bind {
                BatchMode::Convert
            } else {
                BatchMode::Translate
            };
            let config = BatchConfig {
                max_concurrency: jobs,
                target: to,
                mode,
            };
            translate(transformer, inputs, &out_dir, &config).await
        }
        Commands::Convert { input, output, to } => {
            convert(&transformer, &input, output.as_deref(), to)
        }
        Commands::Show {
            input,
            path,
            format,
        } => show(&transformer, &input, path.as_deref(), format),
    }
}

/// Log to stderr; `RUST_LOG` takes precedence over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_transformer(config: Option<&Path>) -> Result<LegacyTransformer> {
    let config = match config {
        Some(path) => TransformerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TransformerConfig::default(),
    };
    LegacyTransformer::from_config(config).context("failed to build transformer")
}

fn sniff(transformer: &LegacyTransformer, inputs: &[PathBuf], json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for path in inputs {
        let version = transformer
            .sniff_file(path)
            .with_context(|| format!("failed to sniff {}", path.display()))?;
        if json {
            let report = SniffReport {
                path,
                version,
                wire_version: version.wire_version(),
            };
            serde_json::to_writer(&mut out, &report)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}: {} ({})", path.display(), version, version.wire_version())?;
        }
    }
    Ok(())
}

async fn translate(
    transformer: LegacyTransformer,
    inputs: Vec<PathBuf>,
    out_dir: &Path,
    config: &BatchConfig,
) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let Some(name) = input.file_name() else {
            bail!("input {} has no file name", input.display());
        };
        let output = out_dir.join(name);
        jobs.push(BatchJob::new(input, output));
    }

    let result = wps_pipeline::run_batch(Arc::new(transformer), jobs, config).await?;
    for item in &result.items {
        match (&item.report, &item.error) {
            (Some(report), _) => println!(
                "{} -> {} ({} -> {}, {} elements renamed)",
                item.job.input.display(),
                item.job.output.display(),
                report.source,
                report.target,
                report.read.elements_renamed + report.written.elements_renamed
            ),
            (None, error) => eprintln!(
                "{}: {}",
                item.job.input.display(),
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    let totals = result.totals();
    info!(
        succeeded = result.succeeded(),
        failed = result.failed(),
        events = totals.events,
        renamed = totals.renamed(),
        elapsed_ms = result.processing_time.as_millis() as u64,
        "Batch finished"
    );

    if !result.is_success() {
        bail!("{} of {} documents failed", result.failed(), result.items.len());
    }
    Ok(())
}

fn convert(
    transformer: &LegacyTransformer,
    input: &Path,
    output: Option<&Path>,
    target: Version,
) -> Result<()> {
    let report = match output {
        Some(output) => transformer.convert_file(input, output, target),
        None => {
            let file = std::fs::File::open(input)
                .with_context(|| format!("failed to open {}", input.display()))?;
            let stdout = io::stdout();
            let report = transformer.convert(
                io::BufReader::new(file),
                BufWriter::new(stdout.lock()),
                target,
            );
            println!();
            report
        }
    }
    .with_context(|| format!("failed to convert {}", input.display()))?;

    debug!(
        source = %report.source,
        target = %report.target,
        renamed = report.written.elements_renamed,
        "Converted"
    );
    Ok(())
}

fn show(
    transformer: &LegacyTransformer,
    input: &Path,
    path: Option<&str>,
    format: ShowFormat,
) -> Result<()> {
    if let Some(path) = path {
        let tree = transformer
            .read_tree_file(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        let cursor = Cursor::new(&tree.root).navigate(path)?;
        match cursor.element().text() {
            Some(text) => println!("{text}"),
            None => println!("<{}>", cursor.path().join("/")),
        }
        return Ok(());
    }

    let read = transformer
        .read_file(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let rendered = match format {
        ShowFormat::Json => serde_json::to_string_pretty(&read.document)?,
        ShowFormat::Yaml => serde_yaml::to_string(&read.document)?,
    };
    println!("{rendered}");
    Ok(())
}
