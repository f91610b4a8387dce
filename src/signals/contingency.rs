//! 2×2 contingency tables and the single-pass corpus aggregates they are built from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{data::CaseRecord, error::SignalError};

/// Counts for one (drug, event) pair.
///
/// `a` drug and event, `b` drug without event, `c` event without drug, `d` neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub a: u64,
    pub b: u64,
    pub c: u64,
    pub d: u64,
}

impl ContingencyTable {
    /// Build a table from signed counts, rejecting any negative cell.
    pub fn from_counts(a: i64, b: i64, c: i64, d: i64) -> Result<Self, SignalError> {
        let cell = |name: &str, value: i64| {
            u64::try_from(value)
                .map_err(|_| SignalError::invalid_table(format!("cell {name} is negative ({value})")))
        };
        Ok(Self {
            a: cell("a", a)?,
            b: cell("b", b)?,
            c: cell("c", c)?,
            d: cell("d", d)?,
        })
    }

    /// Scan the corpus once for a single pair. Matching is exact on the stored terms.
    pub fn from_records(records: &[CaseRecord], drug: &str, event: &str) -> Result<Self, SignalError> {
        if records.is_empty() {
            return Err(SignalError::EmptyCorpus);
        }
        let (mut a, mut b, mut c) = (0u64, 0u64, 0u64);
        for record in records {
            match (record.drug == drug, record.event == event) {
                (true, true) => a += 1,
                (true, false) => b += 1,
                (false, true) => c += 1,
                (false, false) => {}
            }
        }
        let n = records.len() as u64;
        Ok(Self {
            a,
            b,
            c,
            d: n - a - b - c,
        })
    }

    pub fn total(&self) -> u64 {
        self.a + self.b + self.c + self.d
    }

    /// Case count for the pair.
    pub fn case_count(&self) -> u64 {
        self.a
    }
}

/// Marginal and per-pair counts collected in one pass over a corpus snapshot.
///
/// Keys keep first-seen order so repeated runs over the same corpus enumerate
/// pairs identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusAggregates {
    total: u64,
    drug_totals: IndexMap<String, u64>,
    event_totals: IndexMap<String, u64>,
    pairs: IndexMap<(String, String), PairCount>,
}

/// Co-report count for a pair plus how many of those reports were serious.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCount {
    pub cases: u64,
    pub serious: u64,
}

impl CorpusAggregates {
    pub fn from_records(records: &[CaseRecord]) -> Self {
        let mut aggregates = Self::default();
        for record in records {
            aggregates.observe(record);
        }
        aggregates
    }

    /// Aggregate a partitioned corpus with a parallel reduce over the partitions.
    pub fn from_partitions(partitions: &[Vec<CaseRecord>]) -> Self {
        use rayon::prelude::*;

        partitions
            .par_iter()
            .map(|partition| Self::from_records(partition))
            .reduce(Self::default, Self::merge)
    }

    /// Rebuild marginals from grouped pair counts.
    ///
    /// Every case record belongs to exactly one (drug, event) pair, so per-drug and
    /// per-event totals are sums over the pairs.
    pub fn from_pair_counts<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = ((String, String), PairCount)>,
    {
        let mut aggregates = Self::default();
        for ((drug, event), count) in pairs {
            aggregates.add(drug, event, count);
        }
        aggregates
    }

    /// Take explicit marginals from an accessor that aggregates server-side.
    ///
    /// Nothing is cross-checked here; inconsistent marginals surface as
    /// [`SignalError::InvalidTable`] when the affected pair's table is synthesized.
    pub fn from_parts(
        total: u64,
        drug_totals: IndexMap<String, u64>,
        event_totals: IndexMap<String, u64>,
        pairs: IndexMap<(String, String), PairCount>,
    ) -> Self {
        let pairs = pairs.into_iter().filter(|(_, count)| count.cases > 0).collect();
        Self {
            total,
            drug_totals,
            event_totals,
            pairs,
        }
    }

    /// Record a single case.
    pub fn observe(&mut self, record: &CaseRecord) {
        self.add(
            record.drug.clone(),
            record.event.clone(),
            PairCount {
                cases: 1,
                serious: u64::from(record.serious),
            },
        );
    }

    /// Fold another partial aggregate into this one.
    pub fn merge(mut self, other: Self) -> Self {
        for ((drug, event), count) in other.pairs {
            self.add(drug, event, count);
        }
        self
    }

    fn add(&mut self, drug: String, event: String, count: PairCount) {
        if count.cases == 0 {
            return;
        }
        self.total += count.cases;
        *self.drug_totals.entry(drug.clone()).or_insert(0) += count.cases;
        *self.event_totals.entry(event.clone()).or_insert(0) += count.cases;
        let entry = self.pairs.entry((drug, event)).or_default();
        entry.cases += count.cases;
        entry.serious += count.serious;
    }

    /// Total number of case records (`N`).
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn drug_total(&self, drug: &str) -> u64 {
        self.drug_totals.get(drug).copied().unwrap_or(0)
    }

    pub fn event_total(&self, event: &str) -> u64 {
        self.event_totals.get(event).copied().unwrap_or(0)
    }

    pub fn pair_count(&self, drug: &str, event: &str) -> PairCount {
        self.pairs
            .get(&(drug.to_string(), event.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn pair_len(&self) -> usize {
        self.pairs.len()
    }

    /// Observed pairs in first-seen order. Every yielded pair has `cases >= 1`.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, PairCount)> + '_ {
        self.pairs
            .iter()
            .map(|((drug, event), count)| (drug.as_str(), event.as_str(), *count))
    }

    /// Synthesize the table for a pair from the marginals in O(1).
    pub fn table_for(&self, drug: &str, event: &str) -> Result<ContingencyTable, SignalError> {
        if self.is_empty() {
            return Err(SignalError::EmptyCorpus);
        }
        let a = self.pair_count(drug, event).cases;
        self.synthesize(a, self.drug_total(drug), self.event_total(event))
    }

    pub(crate) fn synthesize(
        &self,
        a: u64,
        drug_total: u64,
        event_total: u64,
    ) -> Result<ContingencyTable, SignalError> {
        let as_signed = |value: u64| {
            i64::try_from(value)
                .map_err(|_| SignalError::invalid_table(format!("count {value} overflows i64")))
        };
        let (a, drug_total, event_total, n) = (
            as_signed(a)?,
            as_signed(drug_total)?,
            as_signed(event_total)?,
            as_signed(self.total)?,
        );
        let b = drug_total - a;
        let c = event_total - a;
        let d = n - a - b - c;
        ContingencyTable::from_counts(a, b, c, d)
    }
}
