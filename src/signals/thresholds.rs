//! Threshold presets and priority policy.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::SignalError;

/// Named threshold presets recognised by the configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Standard,
    Strict,
    Sensitive,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Standard, Preset::Strict, Preset::Sensitive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Standard => "standard",
            Preset::Strict => "strict",
            Preset::Sensitive => "sensitive",
        }
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        match self {
            Preset::Standard => ThresholdConfig {
                prr_min: 2.0,
                ror_min: 1.0,
                n_min: 3,
                ci_lower_min: 1.0,
            },
            Preset::Strict => ThresholdConfig {
                prr_min: 3.0,
                ror_min: 1.0,
                n_min: 5,
                ci_lower_min: 1.5,
            },
            Preset::Sensitive => ThresholdConfig {
                prr_min: 1.5,
                ror_min: 1.0,
                n_min: 2,
                ci_lower_min: 1.0,
            },
        }
    }
}

impl FromStr for Preset {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Preset::Standard),
            "strict" => Ok(Preset::Strict),
            "sensitive" => Ok(Preset::Sensitive),
            _ => Err(SignalError::UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cut-offs applied by the calculators' signal rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum PRR point estimate.
    pub prr_min: f64,
    /// ROR point estimate must exceed this value.
    pub ror_min: f64,
    /// Minimum number of co-reported cases (`a`).
    pub n_min: u64,
    /// Lower confidence bound must exceed this value.
    pub ci_lower_min: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Preset::Standard.thresholds()
    }
}

impl From<Preset> for ThresholdConfig {
    fn from(preset: Preset) -> Self {
        preset.thresholds()
    }
}

/// Escalation rule used when mapping signal strength to review priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityPolicy {
    /// A `moderate` signal with more cases than this is escalated to `CRITICAL`.
    pub high_volume_cases: u64,
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self {
            high_volume_cases: 10,
        }
    }
}
