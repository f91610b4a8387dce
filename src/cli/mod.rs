//! Command-line interface wiring for pv-signals.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::{config::Settings, signals::Preset};

pub mod detect;
pub mod pair;
pub mod serve;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Pharmacovigilance disproportionality signal detection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Detect(args) => detect::run(args, settings).await,
            Commands::Pair(args) => pair::run(args, settings).await,
            Commands::Serve(args) => serve::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run batch signal detection over every observed drug–event pair.
    Detect(detect::Args),
    /// Compute the contingency table and signal record for one pair.
    Pair(pair::Args),
    /// Serve the JSON API.
    Serve(serve::Args),
}

/// Corpus and threshold options shared by the detection commands.
#[derive(Debug, Clone, clap::Args)]
pub struct CorpusArgs {
    /// Case file (CSV or parquet); defaults to CORPUS_PATH.
    #[arg(long)]
    pub corpus: Option<PathBuf>,
    /// Threshold preset: standard, strict or sensitive.
    #[arg(long)]
    pub preset: Option<Preset>,
}

impl CorpusArgs {
    pub fn corpus_path(&self, settings: &Settings) -> PathBuf {
        self.corpus
            .clone()
            .unwrap_or_else(|| settings.corpus_path.clone())
    }

    pub fn preset(&self, settings: &Settings) -> Preset {
        self.preset.unwrap_or(settings.preset)
    }
}
