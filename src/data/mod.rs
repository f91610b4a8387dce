//! Case corpus access: the read-only boundary between storage and the detection core.

pub mod csv_corpus;
pub mod memory;
pub mod parquet;

use std::{path::Path, sync::Arc, time::Duration};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{error::SignalError, signals::CorpusAggregates};

pub use csv_corpus::CsvCorpus;
pub use memory::InMemoryCorpus;
pub use parquet::ParquetCorpus;

/// One drug × reaction report row. Terms are already normalised upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(alias = "CASEID", alias = "primaryid")]
    pub case_id: String,
    #[serde(alias = "DRUGNAME", alias = "drug_name")]
    pub drug: String,
    #[serde(alias = "PT", alias = "reaction")]
    pub event: String,
    #[serde(default, alias = "SERIOUS", deserialize_with = "deserialize_flag")]
    pub serious: bool,
}

impl CaseRecord {
    pub fn new(
        case_id: impl Into<String>,
        drug: impl Into<String>,
        event: impl Into<String>,
        serious: bool,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            drug: drug.into(),
            event: event.into(),
            serious,
        }
    }
}

/// Seriousness as it appears in the wild: JSON booleans, 0/1 integers or FAERS `Y`/`N`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(flag)) => Ok(flag),
        Some(Flag::Int(0)) => Ok(false),
        Some(Flag::Int(1)) => Ok(true),
        Some(Flag::Int(other)) => Err(serde::de::Error::custom(format!(
            "unrecognised seriousness flag {other}"
        ))),
        Some(Flag::Text(raw)) => match raw.trim().to_ascii_lowercase().as_str() {
            "" | "0" | "false" | "n" | "no" => Ok(false),
            "1" | "true" | "y" | "yes" => Ok(true),
            other => Err(serde::de::Error::custom(format!(
                "unrecognised seriousness flag {other:?}"
            ))),
        },
    }
}

/// What the detector needs from the corpus: counts grouped by drug and event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationRequest {
    /// Also count serious reports per pair.
    pub include_serious: bool,
    /// Accessors able to group server-side should return [`CorpusSnapshot::Aggregated`].
    pub prefer_aggregated: bool,
}

impl Default for AggregationRequest {
    fn default() -> Self {
        Self {
            include_serious: true,
            prefer_aggregated: true,
        }
    }
}

/// A consistent view of the corpus taken at aggregation time.
#[derive(Debug, Clone)]
pub enum CorpusSnapshot {
    Records(Vec<CaseRecord>),
    Aggregated(CorpusAggregates),
}

impl CorpusSnapshot {
    pub fn into_aggregates(self) -> CorpusAggregates {
        match self {
            CorpusSnapshot::Records(records) => CorpusAggregates::from_records(&records),
            CorpusSnapshot::Aggregated(aggregates) => aggregates,
        }
    }
}

/// Read-only capability handed to the detector.
///
/// `fetch` may block; the detector runs it off the async runtime under a timeout.
pub trait CorpusAccessor: Send + Sync {
    /// Human-readable source description for logs.
    fn describe(&self) -> String;

    fn fetch(&self, request: &AggregationRequest) -> Result<CorpusSnapshot, SignalError>;
}

/// Run one blocking `fetch` off the async runtime, bounded by `timeout`.
///
/// On timeout the blocking call is left to finish on its own; its result is dropped.
pub async fn fetch_aggregates(
    accessor: Arc<dyn CorpusAccessor>,
    timeout: Duration,
) -> Result<CorpusAggregates, SignalError> {
    let source = accessor.describe();
    let request = AggregationRequest::default();
    let fetch = tokio::task::spawn_blocking(move || {
        accessor
            .fetch(&request)
            .map(CorpusSnapshot::into_aggregates)
    });
    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(SignalError::corpus_unavailable(format!(
            "corpus task for {source} failed: {join_err}"
        ))),
        Err(_) => Err(SignalError::corpus_unavailable(format!(
            "{source} did not respond within {timeout:?}"
        ))),
    }
}

/// Open a file-backed corpus, choosing the accessor from the file extension.
pub fn open_corpus(path: &Path) -> Arc<dyn CorpusAccessor> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("parquet") => Arc::new(ParquetCorpus::new(path)),
        _ => Arc::new(CsvCorpus::new(path)),
    }
}
