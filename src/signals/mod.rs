//! Disproportionality signal computation and classification.

pub mod aggregate;
pub mod batch;
pub mod contingency;
pub mod ic;
pub mod prr;
pub mod ror;
pub mod thresholds;
pub mod types;

pub use aggregate::{assess, Assessment, MethodResults};
pub use batch::{
    BatchDetector, CancellationFlag, DetectionReport, DetectionState, ProgressFn, SkippedPair,
};
pub use contingency::{ContingencyTable, CorpusAggregates, PairCount};
pub use thresholds::{Preset, PriorityPolicy, ThresholdConfig};
pub use types::{Method, MethodResult, MethodSelection, Priority, SignalRecord, SignalStrength};

use crate::error::SignalError;

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.96;

/// `exp(ln(estimate) ± 1.96·se)`.
pub(crate) fn log_normal_interval(estimate: f64, se: f64) -> (f64, f64) {
    let log_estimate = estimate.ln();
    (
        (log_estimate - Z_95 * se).exp(),
        (log_estimate + Z_95 * se).exp(),
    )
}

/// Run the selected calculators on one table.
pub fn evaluate_methods(
    table: &ContingencyTable,
    thresholds: &ThresholdConfig,
    selection: MethodSelection,
) -> MethodResults {
    MethodResults {
        prr: selection
            .includes(Method::Prr)
            .then(|| prr::evaluate(table, thresholds)),
        ror: selection
            .includes(Method::Ror)
            .then(|| ror::evaluate(table, thresholds)),
        ic: selection.includes(Method::Ic).then(|| ic::evaluate(table)),
    }
}

/// Calculators plus aggregator for a single pair.
pub fn evaluate_pair(
    drug: &str,
    event: &str,
    table: &ContingencyTable,
    serious_count: u64,
    thresholds: &ThresholdConfig,
    selection: MethodSelection,
    policy: &PriorityPolicy,
) -> Result<SignalRecord, SignalError> {
    let results = evaluate_methods(table, thresholds, selection);
    let case_count = i64::try_from(table.a)
        .map_err(|_| SignalError::invalid_table(format!("case count {} overflows i64", table.a)))?;
    let assessment = assess(&results, case_count, policy)?;
    Ok(SignalRecord {
        drug: drug.to_string(),
        event: event.to_string(),
        case_count: table.a,
        serious_count,
        prr: results.prr,
        ror: results.ror,
        ic: results.ic,
        overall_is_signal: assessment.overall_is_signal,
        signal_strength: assessment.signal_strength,
        methods_flagged: assessment.methods_flagged,
        priority: assessment.priority,
    })
}
