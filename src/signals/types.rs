//! Value types shared by the calculators, the aggregator and the batch detector.

use std::{cmp::Ordering, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// Outcome of one disproportionality method for one drug–event pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    pub value: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub is_signal: bool,
}

impl MethodResult {
    /// Result used whenever the statistic is undefined for the table.
    pub const fn undefined() -> Self {
        Self {
            value: 0.0,
            ci_lower: 0.0,
            ci_upper: 0.0,
            is_signal: false,
        }
    }
}

/// Disproportionality methods known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Prr,
    Ror,
    Ic,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Prr, Method::Ror, Method::Ic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Prr => "PRR",
            Method::Ror => "ROR",
            Method::Ic => "IC",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which calculators a detection run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodSelection {
    Prr,
    Ror,
    Ic,
    #[default]
    All,
}

impl MethodSelection {
    pub fn includes(&self, method: Method) -> bool {
        match self {
            MethodSelection::All => true,
            MethodSelection::Prr => method == Method::Prr,
            MethodSelection::Ror => method == Method::Ror,
            MethodSelection::Ic => method == Method::Ic,
        }
    }

    pub fn methods(&self) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|method| self.includes(*method))
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MethodSelection::Prr => "prr",
            MethodSelection::Ror => "ror",
            MethodSelection::Ic => "ic",
            MethodSelection::All => "all",
        }
    }
}

impl FromStr for MethodSelection {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prr" => Ok(MethodSelection::Prr),
            "ror" => Ok(MethodSelection::Ror),
            "ic" => Ok(MethodSelection::Ic),
            "all" => Ok(MethodSelection::All),
            _ => Err(SignalError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for MethodSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of methods agreeing on a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalStrength {
    None,
    Weak,
    Moderate,
    Strong,
}

impl SignalStrength {
    pub fn from_flag_count(count: usize) -> Self {
        match count {
            0 => SignalStrength::None,
            1 => SignalStrength::Weak,
            2 => SignalStrength::Moderate,
            _ => SignalStrength::Strong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStrength::None => "none",
            SignalStrength::Weak => "weak",
            SignalStrength::Moderate => "moderate",
            SignalStrength::Strong => "strong",
        }
    }
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review priority; ordered so that `Critical` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully classified drug–event pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub drug: String,
    pub event: String,
    pub case_count: u64,
    pub serious_count: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub prr: Option<MethodResult>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ror: Option<MethodResult>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ic: Option<MethodResult>,
    pub overall_is_signal: bool,
    pub signal_strength: SignalStrength,
    pub methods_flagged: Vec<Method>,
    pub priority: Priority,
}

impl SignalRecord {
    pub fn result(&self, method: Method) -> Option<&MethodResult> {
        match method {
            Method::Prr => self.prr.as_ref(),
            Method::Ror => self.ror.as_ref(),
            Method::Ic => self.ic.as_ref(),
        }
    }

    /// Priority descending, then case count descending, then drug and event names.
    ///
    /// The detector never sorts; callers opt in with `records.sort_by(SignalRecord::review_order)`.
    pub fn review_order(left: &SignalRecord, right: &SignalRecord) -> Ordering {
        right
            .priority
            .cmp(&left.priority)
            .then_with(|| right.case_count.cmp(&left.case_count))
            .then_with(|| left.drug.cmp(&right.drug))
            .then_with(|| left.event.cmp(&right.event))
    }
}
