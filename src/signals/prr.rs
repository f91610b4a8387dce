//! Proportional reporting ratio computations.

use super::{log_normal_interval, ContingencyTable, MethodResult, ThresholdConfig};

/// Compute the PRR with its 95% confidence interval and standard error of ln(PRR).
///
/// Returns `None` when the ratio or its interval is undefined for the counts.
pub fn prr_with_ci(a: f64, b: f64, c: f64, d: f64) -> Option<(f64, f64, f64, f64)> {
    if a <= 0.0 || a + b <= 0.0 || c <= 0.0 || c + d <= 0.0 {
        return None;
    }
    let prr = (a / (a + b)) / (c / (c + d));
    let variance = (1.0 / a) - (1.0 / (a + b)) + (1.0 / c) - (1.0 / (c + d));
    let se = variance.max(0.0).sqrt();
    let (ci_low, ci_high) = log_normal_interval(prr, se);
    [prr, ci_low, ci_high]
        .iter()
        .all(|v| v.is_finite())
        .then_some((prr, ci_low, ci_high, se))
}

/// PRR method result under the given thresholds.
pub fn evaluate(table: &ContingencyTable, thresholds: &ThresholdConfig) -> MethodResult {
    let Some((prr, ci_lower, ci_upper, _)) =
        prr_with_ci(table.a as f64, table.b as f64, table.c as f64, table.d as f64)
    else {
        return MethodResult::undefined();
    };
    let is_signal =
        prr >= thresholds.prr_min && table.a >= thresholds.n_min && ci_lower > thresholds.ci_lower_min;
    MethodResult {
        value: prr,
        ci_lower,
        ci_upper,
        is_signal,
    }
}
