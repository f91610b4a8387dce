//! Parquet case files with push-down aggregation through polars.

use std::{
    fs::File,
    path::{Path, PathBuf},
};

use polars::prelude::{col, len, DataFrame, DataType, IntoLazy, ParquetReader, SerReader};
use tracing::{debug, info};

use super::{AggregationRequest, CaseRecord, CorpusAccessor, CorpusSnapshot};
use crate::{
    error::SignalError,
    signals::{CorpusAggregates, PairCount},
};

/// Parquet-backed corpus. Grouping happens inside polars, so only one row per
/// observed (drug, event) pair crosses into the detector.
#[derive(Debug, Clone)]
pub struct ParquetCorpus {
    path: PathBuf,
    drug_column: String,
    event_column: String,
    serious_column: String,
    case_column: String,
}

impl ParquetCorpus {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            drug_column: "drug".to_string(),
            event_column: "event".to_string(),
            serious_column: "serious".to_string(),
            case_column: "case_id".to_string(),
        }
    }

    /// Override the column names used for drug, event and seriousness.
    pub fn with_columns(mut self, drug: &str, event: &str, serious: &str) -> Self {
        self.drug_column = drug.to_string();
        self.event_column = event.to_string();
        self.serious_column = serious.to_string();
        self
    }

    fn load(&self) -> Result<DataFrame, SignalError> {
        let file = File::open(&self.path)
            .map_err(|err| SignalError::corpus_unavailable(format!("{}: {err}", self.path.display())))?;
        ParquetReader::new(file).finish().map_err(|err| self.polars_err(err))
    }

    fn aggregate(&self, df: DataFrame, include_serious: bool) -> Result<CorpusAggregates, SignalError> {
        let with_serious = include_serious && df.column(&self.serious_column).is_ok();
        let mut aggs = vec![len().cast(DataType::Int64).alias("cases")];
        if with_serious {
            aggs.push(
                col(self.serious_column.as_str())
                    .cast(DataType::Boolean)
                    .cast(DataType::Int64)
                    .sum()
                    .alias("serious_cases"),
            );
        }
        let grouped = df
            .lazy()
            .group_by([col(self.drug_column.as_str()), col(self.event_column.as_str())])
            .agg(aggs)
            .collect()
            .map_err(|err| self.polars_err(err))?;
        debug!(groups = grouped.height(), "parquet group_by complete");

        let drug_col = grouped
            .column(&self.drug_column)
            .and_then(|s| s.str())
            .map_err(|err| self.polars_err(err))?;
        let event_col = grouped
            .column(&self.event_column)
            .and_then(|s| s.str())
            .map_err(|err| self.polars_err(err))?;
        let cases_col = grouped
            .column("cases")
            .and_then(|s| s.i64())
            .map_err(|err| self.polars_err(err))?;
        let serious_col = if with_serious {
            Some(
                grouped
                    .column("serious_cases")
                    .and_then(|s| s.i64())
                    .map_err(|err| self.polars_err(err))?,
            )
        } else {
            None
        };

        let mut pairs = Vec::with_capacity(grouped.height());
        for idx in 0..grouped.height() {
            let (Some(drug), Some(event), Some(cases)) =
                (drug_col.get(idx), event_col.get(idx), cases_col.get(idx))
            else {
                continue;
            };
            let serious = serious_col
                .and_then(|column| column.get(idx))
                .unwrap_or(0);
            pairs.push((
                (drug.to_string(), event.to_string()),
                PairCount {
                    cases: u64::try_from(cases).unwrap_or(0),
                    serious: u64::try_from(serious).unwrap_or(0),
                },
            ));
        }
        // group_by output order is not stable across runs.
        pairs.sort_by(|left, right| left.0.cmp(&right.0));
        Ok(CorpusAggregates::from_pair_counts(pairs))
    }

    fn records(&self, df: &DataFrame) -> Result<Vec<CaseRecord>, SignalError> {
        let drug_col = df
            .column(&self.drug_column)
            .and_then(|s| s.str())
            .map_err(|err| self.polars_err(err))?;
        let event_col = df
            .column(&self.event_column)
            .and_then(|s| s.str())
            .map_err(|err| self.polars_err(err))?;
        let case_col = df.column(&self.case_column).ok().and_then(|s| s.str().ok());
        // Same reading as the grouped path: any non-zero value is serious.
        let serious_flags = df
            .column(&self.serious_column)
            .ok()
            .map(|s| s.cast(&DataType::Boolean))
            .transpose()
            .map_err(|err| self.polars_err(err))?;
        let serious_col = serious_flags.as_ref().and_then(|s| s.bool().ok());

        let mut records = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let (Some(drug), Some(event)) = (drug_col.get(idx), event_col.get(idx)) else {
                continue;
            };
            let case_id = case_col
                .and_then(|column| column.get(idx))
                .map(str::to_string)
                .unwrap_or_else(|| idx.to_string());
            let serious = serious_col
                .and_then(|column| column.get(idx))
                .unwrap_or(false);
            records.push(CaseRecord::new(case_id, drug, event, serious));
        }
        Ok(records)
    }

    fn polars_err(&self, err: polars::error::PolarsError) -> SignalError {
        SignalError::corpus_unavailable(format!("{}: {err}", self.path.display()))
    }
}

impl CorpusAccessor for ParquetCorpus {
    fn describe(&self) -> String {
        format!("parquet corpus {}", self.path.display())
    }

    fn fetch(&self, request: &AggregationRequest) -> Result<CorpusSnapshot, SignalError> {
        let df = self.load()?;
        info!(path = %self.path.display(), rows = df.height(), "loaded parquet corpus");
        if request.prefer_aggregated {
            Ok(CorpusSnapshot::Aggregated(
                self.aggregate(df, request.include_serious)?,
            ))
        } else {
            Ok(CorpusSnapshot::Records(self.records(&df)?))
        }
    }
}
