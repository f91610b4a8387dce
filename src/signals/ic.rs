//! Information component (observed vs expected co-reporting on a log2 scale).
//!
//! The credibility bound is the simplified `ic - 1.96/sqrt(a)` approximation rather
//! than a BCPNN shrinkage estimate.

use super::{ContingencyTable, MethodResult, Z_95};

/// Returns `(ic, ic025, ic975)` or `None` when the expected count or `a` is zero.
pub fn ic_with_bounds(table: &ContingencyTable) -> Option<(f64, f64, f64)> {
    let n = table.total() as f64;
    let a = table.a as f64;
    if n <= 0.0 || a <= 0.0 {
        return None;
    }
    let expected = ((a + table.b as f64) * (a + table.c as f64)) / n;
    if expected <= 0.0 {
        return None;
    }
    let ic = (a / expected).log2();
    let half_width = Z_95 / a.sqrt();
    let bounds = (ic, ic - half_width, ic + half_width);
    (bounds.0.is_finite() && bounds.1.is_finite() && bounds.2.is_finite()).then_some(bounds)
}

/// IC method result; flags a signal when IC025 is above zero.
pub fn evaluate(table: &ContingencyTable) -> MethodResult {
    match ic_with_bounds(table) {
        Some((ic, ic025, ic975)) => MethodResult {
            value: ic,
            ci_lower: ic025,
            ci_upper: ic975,
            is_signal: ic025 > 0.0,
        },
        None => MethodResult::undefined(),
    }
}
