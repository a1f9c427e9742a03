//! RCX CLI - Command-line interface
//!
//! Usage:
//!   rcx extract <input> [-o output] [--format csv|jsonl] [--append]
//!   rcx check <input>

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rc_core::{AlignmentPolicy, AppConfig, LoggingConfig, OutputFormat};
use rc_extractor::batch::load_inputs;
use rc_extractor::export::{append_records, write_records};
use rc_extractor::{BatchRunner, RunStats};
use rc_parser::TreeAdapter;
use tokio::io::BufWriter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rcx")]
#[command(about = "Relative clause extraction from parsed sentences")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract relative clauses from a JSON Lines file of parsed sentences
    Extract {
        /// Input file
        input: PathBuf,
        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output format (csv, jsonl)
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Append to an existing output file; CSV rows are written without a header
        #[arg(long)]
        append: bool,
        /// Sentences analyzed at once
        #[arg(long)]
        concurrency: Option<usize>,
        /// What to do with unusable constituency trees (strict, dependency-only)
        #[arg(long)]
        alignment: Option<AlignmentPolicy>,
    },
    /// Check that the parses of every sentence can be aligned
    Check {
        /// Input file
        input: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    Ok(config.with_env_override()?)
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_file(logging.include_location)
        .with_line_number(logging.include_location);

    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn extract(config: &AppConfig, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let inputs = load_inputs(input).await?;
    let runner = BatchRunner::from_config(config);
    let outcomes = runner.run(inputs).await;

    let records: Vec<_> = outcomes.iter().flat_map(|o| o.records()).collect();
    match output {
        Some(path) => {
            let existing = tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0);
            let format = config.output.format;
            if config.output.append && existing > 0 {
                let file = tokio::fs::OpenOptions::new()
                    .append(true)
                    .open(path)
                    .await
                    .with_context(|| format!("opening {}", path.display()))?;
                append_records(BufWriter::new(file), &records, format).await?;
            } else {
                let file = tokio::fs::File::create(path)
                    .await
                    .with_context(|| format!("creating {}", path.display()))?;
                write_records(BufWriter::new(file), &records, format).await?;
            }
            tracing::info!(records = records.len(), path = %path.display(), "wrote clauses");
        }
        None => {
            write_records(BufWriter::new(tokio::io::stdout()), &records, config.output.format)
                .await?;
        }
    }

    eprint!("{}", RunStats::from_outcomes(&outcomes).report());
    Ok(())
}

async fn check(config: &AppConfig, input: &Path) -> anyhow::Result<()> {
    let inputs = load_inputs(input).await?;
    let adapter = TreeAdapter::new(config.batch.alignment);

    let mut usable = 0;
    let mut failures: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (position, line) in inputs.iter().enumerate() {
        let result = match line {
            Ok(sentence) => adapter
                .adapt(
                    &sentence.text,
                    sentence.dependency_input(),
                    sentence.constituency.as_deref(),
                )
                .map(|adapted| adapted.degraded),
            Err(message) => {
                println!("{position}\tinvalid_input\t{message}");
                *failures.entry("invalid_input").or_default() += 1;
                continue;
            }
        };

        match result {
            Ok(None) => usable += 1,
            Ok(Some(err)) | Err(err) => {
                println!("{position}\t{}\t{err}", err.skip_reason());
                *failures.entry(err.skip_reason().as_str()).or_default() += 1;
            }
        }
    }

    println!("Sentences:  {}", inputs.len());
    println!("Aligned:    {usable}");
    for (reason, count) in &failures {
        println!("  {reason:<20} {count}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract {
            input,
            output,
            format,
            append,
            concurrency,
            alignment,
        } => {
            if let Some(format) = format {
                config.output.format = format;
            }
            if append {
                config.output.append = true;
            }
            if let Some(concurrency) = concurrency {
                config.batch.concurrency = concurrency;
            }
            if let Some(alignment) = alignment {
                config.batch.alignment = alignment;
            }
            init_tracing(&config.logging);
            extract(&config, &input, output.as_deref()).await?;
        }
        Commands::Check { input } => {
            init_tracing(&config.logging);
            check(&config, &input).await?;
        }
    }

    Ok(())
}
