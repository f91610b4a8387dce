//! CLI entry-point for a single drug–event pair.

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    cli::CorpusArgs,
    config::Settings,
    data,
    signals::{self, ContingencyTable, MethodSelection, SignalRecord},
};

/// Args for the `pair` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,
    /// Normalised drug name.
    #[arg(long)]
    pub drug: String,
    /// Normalised reaction term.
    #[arg(long)]
    pub event: String,
    /// Methods to run: prr, ror, ic or all.
    #[arg(long, default_value = "all")]
    pub method: MethodSelection,
}

#[derive(Debug, Serialize)]
struct PairReport {
    table: ContingencyTable,
    total_cases: u64,
    record: SignalRecord,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let corpus_path = args.corpus.corpus_path(&settings);
    let preset = args.corpus.preset(&settings);
    let accessor = data::open_corpus(&corpus_path);

    let aggregates = data::fetch_aggregates(accessor, settings.corpus_timeout())
        .await
        .with_context(|| format!("reading {}", corpus_path.display()))?;

    let table = aggregates.table_for(&args.drug, &args.event)?;
    let record = signals::evaluate_pair(
        &args.drug,
        &args.event,
        &table,
        aggregates.pair_count(&args.drug, &args.event).serious,
        &preset.thresholds(),
        args.method,
        &settings.priority_policy(),
    )?;
    info!(
        drug = %args.drug,
        event = %args.event,
        priority = %record.priority,
        strength = %record.signal_strength,
        "evaluated pair"
    );

    let report = PairReport {
        table,
        total_cases: aggregates.total(),
        record,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
