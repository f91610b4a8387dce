//! In-process corpus shared with an ingestion pipeline.

use std::sync::{Arc, RwLock};

use super::{AggregationRequest, CaseRecord, CorpusAccessor, CorpusSnapshot};
use crate::{error::SignalError, signals::CorpusAggregates};

/// Record list behind a lock; every fetch sees a consistent copy.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    records: Arc<RwLock<Vec<CaseRecord>>>,
}

impl InMemoryCorpus {
    pub fn new(records: Vec<CaseRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    pub fn push(&self, record: CaseRecord) -> Result<(), SignalError> {
        self.write()?.push(record);
        Ok(())
    }

    pub fn extend<I>(&self, records: I) -> Result<(), SignalError>
    where
        I: IntoIterator<Item = CaseRecord>,
    {
        self.write()?.extend(records);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<CaseRecord>>, SignalError> {
        self.records
            .write()
            .map_err(|_| SignalError::corpus_unavailable("in-memory corpus lock poisoned"))
    }
}

impl CorpusAccessor for InMemoryCorpus {
    fn describe(&self) -> String {
        format!("in-memory corpus ({} records)", self.len())
    }

    fn fetch(&self, request: &AggregationRequest) -> Result<CorpusSnapshot, SignalError> {
        let guard = self
            .records
            .read()
            .map_err(|_| SignalError::corpus_unavailable("in-memory corpus lock poisoned"))?;
        // Aggregate under the read lock instead of cloning every record.
        if request.prefer_aggregated {
            Ok(CorpusSnapshot::Aggregated(CorpusAggregates::from_records(&guard)))
        } else {
            Ok(CorpusSnapshot::Records(guard.clone()))
        }
    }
}
