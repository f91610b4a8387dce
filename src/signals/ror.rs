//! Reporting odds ratio computations.

use super::{log_normal_interval, ContingencyTable, MethodResult, ThresholdConfig};

/// Compute the reporting odds ratio with 95% confidence interval and the variance of ln(ROR).
///
/// Zero cells make the ratio or its variance undefined; no continuity correction is applied.
pub fn ror_with_ci(a: f64, b: f64, c: f64, d: f64) -> Option<(f64, f64, f64, f64)> {
    if [a, b, c, d].iter().any(|&x| x <= 0.0) {
        return None;
    }
    let ror = (a * d) / (b * c);
    let variance = (1.0 / a) + (1.0 / b) + (1.0 / c) + (1.0 / d);
    let (ci_low, ci_high) = log_normal_interval(ror, variance.sqrt());
    [ror, ci_low, ci_high]
        .iter()
        .all(|v| v.is_finite())
        .then_some((ror, ci_low, ci_high, variance))
}

/// ROR method result under the given thresholds.
pub fn evaluate(table: &ContingencyTable, thresholds: &ThresholdConfig) -> MethodResult {
    let Some((ror, ci_lower, ci_upper, _)) =
        ror_with_ci(table.a as f64, table.b as f64, table.c as f64, table.d as f64)
    else {
        return MethodResult::undefined();
    };
    MethodResult {
        value: ror,
        ci_lower,
        ci_upper,
        is_signal: ror > thresholds.ror_min
            && ci_lower > thresholds.ci_lower_min
            && table.a >= thresholds.n_min,
    }
}
