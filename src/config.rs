//! Runtime configuration utilities for pv-signals.

use std::{
    env,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;

use crate::signals::{BatchDetector, Preset, PriorityPolicy};

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder for case files.
    pub data_dir: PathBuf,
    /// Root folder for detection outputs.
    pub outputs_dir: PathBuf,
    /// Case corpus used when a command does not name one (CSV or parquet).
    pub corpus_path: PathBuf,
    /// Threshold preset applied by default.
    pub preset: Preset,
    /// Case count above which a moderate signal becomes critical.
    pub high_volume_cases: u64,
    /// Seconds allowed for the single corpus read.
    pub corpus_timeout_secs: u64,
    /// Worker threads for the computing stage; 0 keeps the rayon default.
    pub signal_threads: usize,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let corpus_path = env::var("CORPUS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("cases.csv"));
        let preset = match env::var("SIGNAL_PRESET") {
            Ok(raw) => raw.parse().context("parsing SIGNAL_PRESET")?,
            Err(_) => Preset::Standard,
        };
        let high_volume_cases =
            parse_or("HIGH_VOLUME_CASES", PriorityPolicy::default().high_volume_cases)?;
        let corpus_timeout_secs = parse_or("CORPUS_TIMEOUT_SECS", 30)?;
        let signal_threads = parse_or("SIGNAL_THREADS", 0)?;

        std::fs::create_dir_all(&data_dir).context("creating data dir")?;
        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            data_dir,
            outputs_dir,
            corpus_path,
            preset,
            high_volume_cases,
            corpus_timeout_secs,
            signal_threads,
        })
    }

    pub fn priority_policy(&self) -> PriorityPolicy {
        PriorityPolicy {
            high_volume_cases: self.high_volume_cases,
        }
    }

    pub fn corpus_timeout(&self) -> Duration {
        Duration::from_secs(self.corpus_timeout_secs.max(1))
    }

    /// Batch detector carrying the configured policy, timeout and worker count.
    pub fn detector(&self, preset: Preset) -> BatchDetector {
        BatchDetector::from_preset(preset)
            .with_policy(self.priority_policy())
            .with_timeout(self.corpus_timeout())
            .with_threads(self.signal_threads)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

/// Unset keeps the default; a value that does not parse is an error.
fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("parsing {key}={raw:?}")),
        Err(_) => Ok(default),
    }
}
