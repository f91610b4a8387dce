//! Shared DTOs for JSON responses.

use serde::Serialize;

use crate::signals::{
    DetectionReport, MethodSelection, Preset, SignalRecord, SkippedPair, ThresholdConfig,
};

#[derive(Debug, Clone, Serialize)]
pub struct SignalsResponse {
    pub preset: Option<Preset>,
    pub methods: MethodSelection,
    pub total_cases: u64,
    pub pairs_considered: usize,
    pub signal_count: usize,
    pub returned: usize,
    pub skipped: Vec<SkippedPair>,
    pub cancelled: bool,
    pub generated_at: String,
    pub signals: Vec<SignalRecord>,
}

impl SignalsResponse {
    /// Envelope around records already filtered and ordered by the route.
    pub fn new(report: &DetectionReport, signals: Vec<SignalRecord>) -> Self {
        Self {
            preset: report.preset,
            methods: report.methods,
            total_cases: report.total_cases,
            pairs_considered: report.pairs_considered,
            signal_count: report.signal_count(),
            returned: signals.len(),
            skipped: report.skipped.clone(),
            cancelled: report.cancelled,
            generated_at: report.generated_at.to_rfc3339(),
            signals,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PresetDto {
    pub name: Preset,
    #[serde(flatten)]
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDto {
    pub code: &'static str,
    pub message: String,
}
