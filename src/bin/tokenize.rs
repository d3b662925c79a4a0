//! leadsheet-tokenize - command-line front end
//!
//! Tokenizes every score under a dataset directory and writes the corpus
//! as JSON (to a file, or stdout when no output path is given). Logs go to
//! stderr; set `RUST_LOG` to adjust verbosity.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use leadsheet_tokens::{Config, Pipeline, TokenCorpus};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for leadsheet-tokenize
#[derive(Parser, Debug)]
#[command(name = "leadsheet-tokenize")]
#[command(about = "Encode lead sheets into token streams for sequence models")]
#[command(version)]
struct Args {
    /// Root folder containing score files
    #[arg(env = "LEADSHEET_DATASET")]
    dataset: PathBuf,

    /// Write the corpus here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// YAML configuration file
    #[arg(short, long, env = "LEADSHEET_CONFIG")]
    config: Option<PathBuf>,

    /// Accepted file extension (repeatable; replaces the configured list)
    #[arg(long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Keep tied notes as separate onsets
    #[arg(long)]
    no_merge_ties: bool,

    /// Skip files that fail to parse instead of aborting
    #[arg(long)]
    skip_unparsable: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Args {
    /// Configuration file (or defaults) with command-line overrides applied
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_yaml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        if !self.extensions.is_empty() {
            config.extensions = self.extensions.clone();
        }
        if self.no_merge_ties {
            config.merge_ties = false;
        }
        if self.skip_unparsable {
            config.skip_unparsable = true;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize tracing; library `log` records are bridged into it
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leadsheet_tokens=info,leadsheet_tokenize=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let config = args.config()?;
    log::debug!("configuration: {:?}", config);

    let corpus = Pipeline::new(config)
        .run(&args.dataset)
        .with_context(|| format!("Failed to tokenize {}", args.dataset.display()))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
            write_corpus(&corpus, BufWriter::new(file), args.pretty)?;
            log::info!("wrote {} segments to {}", corpus.len(), path.display());
        }
        None => write_corpus(&corpus, io::stdout().lock(), args.pretty)?,
    }

    Ok(())
}

fn write_corpus(corpus: &TokenCorpus, mut out: impl Write, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut out, corpus)?;
    } else {
        serde_json::to_writer(&mut out, corpus)?;
    }
    writeln!(out)?;
    out.flush().context("Failed to flush output")
}
