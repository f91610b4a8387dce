//! Combine per-method results into a strength and review priority.

use serde::{Deserialize, Serialize};

use super::{Method, MethodResult, Priority, PriorityPolicy, SignalStrength};
use crate::error::SignalError;

/// Method results for one pair; methods not run in the batch are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MethodResults {
    pub prr: Option<MethodResult>,
    pub ror: Option<MethodResult>,
    pub ic: Option<MethodResult>,
}

impl MethodResults {
    pub fn get(&self, method: Method) -> Option<&MethodResult> {
        match method {
            Method::Prr => self.prr.as_ref(),
            Method::Ror => self.ror.as_ref(),
            Method::Ic => self.ic.as_ref(),
        }
    }
}

/// Classification derived from the method results and the case count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub overall_is_signal: bool,
    pub signal_strength: SignalStrength,
    pub methods_flagged: Vec<Method>,
    pub priority: Priority,
}

/// Classify a pair. Only a negative case count is rejected.
pub fn assess(
    results: &MethodResults,
    case_count: i64,
    policy: &PriorityPolicy,
) -> Result<Assessment, SignalError> {
    let case_count = u64::try_from(case_count).map_err(|_| {
        SignalError::invalid_table(format!("case count is negative ({case_count})"))
    })?;

    let methods_flagged: Vec<Method> = Method::ALL
        .into_iter()
        .filter(|method| results.get(*method).is_some_and(|r| r.is_signal))
        .collect();
    let signal_strength = SignalStrength::from_flag_count(methods_flagged.len());

    Ok(Assessment {
        overall_is_signal: !methods_flagged.is_empty(),
        priority: priority_for(signal_strength, case_count, policy),
        signal_strength,
        methods_flagged,
    })
}

pub fn priority_for(strength: SignalStrength, case_count: u64, policy: &PriorityPolicy) -> Priority {
    match strength {
        SignalStrength::Strong => Priority::Critical,
        SignalStrength::Moderate if case_count > policy.high_volume_cases => Priority::Critical,
        SignalStrength::Moderate => Priority::High,
        SignalStrength::Weak => Priority::Medium,
        SignalStrength::None => Priority::Low,
    }
}
