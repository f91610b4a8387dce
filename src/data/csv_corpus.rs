//! Flat CSV case files, either native (`case_id,drug,event,serious`) or FAERS extracts
//! (`CASEID,DRUGNAME,PT,...`).

use std::path::{Path, PathBuf};

use tracing::info;

use super::{AggregationRequest, CaseRecord, CorpusAccessor, CorpusSnapshot};
use crate::{error::SignalError, signals::CorpusAggregates};

#[derive(Debug, Clone)]
pub struct CsvCorpus {
    path: PathBuf,
}

impl CsvCorpus {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in file order.
    pub fn read_records(&self) -> Result<Vec<CaseRecord>, SignalError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|err| self.unavailable(err))?;
        let mut records = Vec::new();
        for (idx, result) in reader.deserialize::<CaseRecord>().enumerate() {
            let record = result.map_err(|err| {
                SignalError::corpus_unavailable(format!(
                    "{} row {}: {err}",
                    self.path.display(),
                    idx + 2
                ))
            })?;
            records.push(record);
        }
        info!(path = %self.path.display(), rows = records.len(), "loaded case records");
        Ok(records)
    }

    fn unavailable(&self, err: csv::Error) -> SignalError {
        SignalError::corpus_unavailable(format!("{}: {err}", self.path.display()))
    }
}

impl CorpusAccessor for CsvCorpus {
    fn describe(&self) -> String {
        format!("csv corpus {}", self.path.display())
    }

    fn fetch(&self, request: &AggregationRequest) -> Result<CorpusSnapshot, SignalError> {
        let records = self.read_records()?;
        if request.prefer_aggregated {
            Ok(CorpusSnapshot::Aggregated(CorpusAggregates::from_records(&records)))
        } else {
            Ok(CorpusSnapshot::Records(records))
        }
    }
}
