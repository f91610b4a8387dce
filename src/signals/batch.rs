//! Batch detection over every observed drug–event pair.
//!
//! One accessor call builds the aggregate snapshot; each pair is then an independent
//! unit of work on the rayon pool with its own output slot.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    evaluate_pair, CorpusAggregates, MethodSelection, Preset, PriorityPolicy, SignalRecord,
    ThresholdConfig,
};
use crate::{
    data::{self, CorpusAccessor},
    error::SignalError,
};

/// Lifecycle of one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionState {
    Initialized,
    Aggregating,
    Computing,
    Done,
    Failed,
}

/// Shared flag a caller raises to abandon a run during `Computing`.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Pair left out of the output because its table could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPair {
    pub drug: String,
    pub event: String,
    pub reason: String,
}

/// Everything a detection run hands back to its caller. Records are unordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub records: Vec<SignalRecord>,
    pub skipped: Vec<SkippedPair>,
    pub cancelled: bool,
    pub pairs_considered: usize,
    pub total_cases: u64,
    pub preset: Option<Preset>,
    pub thresholds: ThresholdConfig,
    pub methods: MethodSelection,
    pub generated_at: DateTime<Utc>,
}

impl DetectionReport {
    pub fn signal_count(&self) -> usize {
        self.records.iter().filter(|r| r.overall_is_signal).count()
    }
}

#[derive(Debug, Clone, Copy)]
struct RunConfig {
    thresholds: ThresholdConfig,
    selection: MethodSelection,
    policy: PriorityPolicy,
    threads: usize,
}

enum PairOutcome {
    Record(SignalRecord),
    Skipped(SkippedPair),
    NotStarted,
}

struct ComputeOutput {
    records: Vec<SignalRecord>,
    skipped: Vec<SkippedPair>,
    cancelled: bool,
    pairs_considered: usize,
}

/// Called with `(completed, total)` after each pair finishes, from a worker thread.
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Drives `Initialized → Aggregating → Computing → Done` (or `Failed`).
#[derive(Clone)]
pub struct BatchDetector {
    preset: Option<Preset>,
    config: RunConfig,
    timeout: Duration,
    cancel: CancellationFlag,
    progress: Option<ProgressFn>,
    state: DetectionState,
}

impl fmt::Debug for BatchDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchDetector")
            .field("preset", &self.preset)
            .field("config", &self.config)
            .field("timeout", &self.timeout)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl BatchDetector {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self {
            preset: None,
            config: RunConfig {
                thresholds,
                selection: MethodSelection::All,
                policy: PriorityPolicy::default(),
                threads: 0,
            },
            timeout: Duration::from_secs(30),
            cancel: CancellationFlag::new(),
            progress: None,
            state: DetectionState::Initialized,
        }
    }

    pub fn from_preset(preset: Preset) -> Self {
        Self {
            preset: Some(preset),
            ..Self::new(preset.thresholds())
        }
    }

    pub fn with_methods(mut self, selection: MethodSelection) -> Self {
        self.config.selection = selection;
        self
    }

    pub fn with_policy(mut self, policy: PriorityPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Upper bound on the accessor call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Dedicated worker count; `0` uses the global rayon pool.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn state(&self) -> DetectionState {
        self.state
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        self.config.thresholds
    }

    pub fn methods(&self) -> MethodSelection {
        self.config.selection
    }

    /// Fetch the corpus once through `accessor`, then compute every observed pair.
    pub async fn detect(
        &mut self,
        accessor: Arc<dyn CorpusAccessor>,
    ) -> Result<DetectionReport, SignalError> {
        self.transition(DetectionState::Aggregating);
        let source = accessor.describe();
        info!(%source, timeout = ?self.timeout, "aggregating corpus");

        let aggregates = match data::fetch_aggregates(accessor, self.timeout).await {
            Ok(aggregates) => aggregates,
            Err(err) => return Err(self.fail(err)),
        };

        self.ensure_populated(&aggregates)?;
        self.transition(DetectionState::Computing);
        let config = self.config;
        let cancel = self.cancel.clone();
        let progress = self.progress.clone();
        let output = tokio::task::spawn_blocking(move || {
            let output = compute(&aggregates, config, &cancel, progress.as_ref());
            (output, aggregates.total())
        })
        .await;
        match output {
            Ok((output, total)) => Ok(self.finish(output, total)),
            Err(join_err) => Err(self.fail(SignalError::computation_failed(format!(
                "computation task failed: {join_err}"
            )))),
        }
    }

    /// Compute over an aggregate snapshot the caller already holds.
    pub fn run(&mut self, aggregates: &CorpusAggregates) -> Result<DetectionReport, SignalError> {
        self.transition(DetectionState::Aggregating);
        self.ensure_populated(aggregates)?;
        self.transition(DetectionState::Computing);
        let output = compute(aggregates, self.config, &self.cancel, self.progress.as_ref());
        Ok(self.finish(output, aggregates.total()))
    }

    fn ensure_populated(&mut self, aggregates: &CorpusAggregates) -> Result<(), SignalError> {
        if aggregates.is_empty() {
            return Err(self.fail(SignalError::EmptyCorpus));
        }
        debug!(
            cases = aggregates.total(),
            pairs = aggregates.pair_len(),
            "corpus snapshot aggregated"
        );
        Ok(())
    }

    fn finish(&mut self, output: ComputeOutput, total_cases: u64) -> DetectionReport {
        self.transition(DetectionState::Done);
        let report = DetectionReport {
            records: output.records,
            skipped: output.skipped,
            cancelled: output.cancelled,
            pairs_considered: output.pairs_considered,
            total_cases,
            preset: self.preset,
            thresholds: self.config.thresholds,
            methods: self.config.selection,
            generated_at: Utc::now(),
        };
        info!(
            records = report.records.len(),
            signals = report.signal_count(),
            skipped = report.skipped.len(),
            cancelled = report.cancelled,
            "signal detection finished"
        );
        report
    }

    fn fail(&mut self, err: SignalError) -> SignalError {
        warn!(code = err.code(), %err, "signal detection failed");
        self.transition(DetectionState::Failed);
        err
    }

    fn transition(&mut self, next: DetectionState) {
        debug!(from = ?self.state, to = ?next, "detector state change");
        self.state = next;
    }
}

fn compute(
    aggregates: &CorpusAggregates,
    config: RunConfig,
    cancel: &CancellationFlag,
    progress: Option<&ProgressFn>,
) -> ComputeOutput {
    let pairs: Vec<_> = aggregates.pairs().collect();
    let completed = AtomicUsize::new(0);
    let run = || -> Vec<PairOutcome> {
        pairs
            .par_iter()
            .map(|&(drug, event, count)| {
                if cancel.is_cancelled() {
                    return PairOutcome::NotStarted;
                }
                let outcome = aggregates
                    .synthesize(count.cases, aggregates.drug_total(drug), aggregates.event_total(event))
                    .and_then(|table| {
                        evaluate_pair(
                            drug,
                            event,
                            &table,
                            count.serious,
                            &config.thresholds,
                            config.selection,
                            &config.policy,
                        )
                    });
                if let Some(progress) = progress {
                    progress(completed.fetch_add(1, Ordering::SeqCst) + 1, pairs.len());
                }
                match outcome {
                    Ok(record) => PairOutcome::Record(record),
                    Err(err) => {
                        warn!(%drug, %event, %err, "skipping pair");
                        PairOutcome::Skipped(SkippedPair {
                            drug: drug.to_string(),
                            event: event.to_string(),
                            reason: err.to_string(),
                        })
                    }
                }
            })
            .collect()
    };

    let outcomes = if config.threads > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(err) => {
                warn!(%err, threads = config.threads, "falling back to global rayon pool");
                run()
            }
        }
    } else {
        run()
    };

    let mut output = ComputeOutput {
        records: Vec::with_capacity(outcomes.len()),
        skipped: Vec::new(),
        cancelled: false,
        pairs_considered: pairs.len(),
    };
    for outcome in outcomes {
        match outcome {
            PairOutcome::Record(record) => output.records.push(record),
            PairOutcome::Skipped(skipped) => output.skipped.push(skipped),
            PairOutcome::NotStarted => output.cancelled = true,
        }
    }
    output
}
