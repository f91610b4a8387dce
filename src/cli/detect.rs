//! CLI entry-point for batch signal detection.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    cli::CorpusArgs,
    config::Settings,
    data,
    signals::{DetectionReport, MethodResult, MethodSelection, SignalRecord},
};

/// Args for the `detect` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    #[command(flatten)]
    pub corpus: CorpusArgs,
    /// Methods to run: prr, ror, ic or all.
    #[arg(long, default_value = "all")]
    pub method: MethodSelection,
    /// Only write pairs flagged by at least one method.
    #[arg(long)]
    pub flagged_only: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let corpus_path = args.corpus.corpus_path(&settings);
    let preset = args.corpus.preset(&settings);
    let accessor = data::open_corpus(&corpus_path);
    let mut detector = settings.detector(preset).with_methods(args.method);

    let mut report = detector
        .detect(accessor)
        .await
        .with_context(|| format!("detecting signals in {}", corpus_path.display()))?;
    if !report.skipped.is_empty() {
        warn!(skipped = report.skipped.len(), "some pairs were skipped");
    }
    if args.flagged_only {
        report.records.retain(|r| r.overall_is_signal);
    }
    report.records.sort_by(SignalRecord::review_order);

    write_csv(&report.records, &settings.join_output("signals.csv"))?;
    write_json(&report, &settings.join_output("signals.json"))?;
    info!(
        %preset,
        methods = %args.method,
        cases = report.total_cases,
        pairs = report.pairs_considered,
        signals = report.signal_count(),
        "detection complete"
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct SignalRow<'a> {
    drug: &'a str,
    event: &'a str,
    case_count: u64,
    serious_count: u64,
    prr: Option<f64>,
    prr_ci_lower: Option<f64>,
    prr_ci_upper: Option<f64>,
    prr_signal: Option<bool>,
    ror: Option<f64>,
    ror_ci_lower: Option<f64>,
    ror_ci_upper: Option<f64>,
    ror_signal: Option<bool>,
    ic: Option<f64>,
    ic025: Option<f64>,
    ic975: Option<f64>,
    ic_signal: Option<bool>,
    overall_is_signal: bool,
    signal_strength: String,
    methods_flagged: String,
    priority: String,
}

impl<'a> From<&'a SignalRecord> for SignalRow<'a> {
    fn from(record: &'a SignalRecord) -> Self {
        let split = |result: Option<MethodResult>| {
            (
                result.map(|r| r.value),
                result.map(|r| r.ci_lower),
                result.map(|r| r.ci_upper),
                result.map(|r| r.is_signal),
            )
        };
        let (prr, prr_ci_lower, prr_ci_upper, prr_signal) = split(record.prr);
        let (ror, ror_ci_lower, ror_ci_upper, ror_signal) = split(record.ror);
        let (ic, ic025, ic975, ic_signal) = split(record.ic);
        SignalRow {
            drug: &record.drug,
            event: &record.event,
            case_count: record.case_count,
            serious_count: record.serious_count,
            prr,
            prr_ci_lower,
            prr_ci_upper,
            prr_signal,
            ror,
            ror_ci_lower,
            ror_ci_upper,
            ror_signal,
            ic,
            ic025,
            ic975,
            ic_signal,
            overall_is_signal: record.overall_is_signal,
            signal_strength: record.signal_strength.to_string(),
            methods_flagged: record
                .methods_flagged
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            priority: record.priority.to_string(),
        }
    }
}

fn write_csv(records: &[SignalRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for record in records {
        writer.serialize(SignalRow::from(record))?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), "wrote signal table");
    Ok(())
}

fn write_json(report: &DetectionReport, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    info!(path = %path.display(), "wrote detection report");
    Ok(())
}
