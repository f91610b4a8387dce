//! CLI entry-point for the signal API.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{api, cli::CorpusArgs, config::Settings};

/// Serve on-demand detection over one corpus.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    // Corpus served by every request; the preset applies when a request names none.
    #[command(flatten)]
    pub corpus: CorpusArgs,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

impl Args {
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let addr = args.addr()?;
    let settings = Settings {
        corpus_path: args.corpus.corpus_path(&settings),
        preset: args.corpus.preset(&settings),
        ..settings
    };
    api::serve(settings, addr).await
}
