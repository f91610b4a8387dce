use indexmap::IndexMap;
use pv_signals::{
    data::CaseRecord,
    signals::{ContingencyTable, CorpusAggregates, PairCount},
    SignalError,
};

fn corpus() -> Vec<CaseRecord> {
    vec![
        CaseRecord::new("1", "aspirin", "bleeding", true),
        CaseRecord::new("2", "aspirin", "bleeding", false),
        CaseRecord::new("3", "aspirin", "rash", false),
        CaseRecord::new("4", "warfarin", "bleeding", true),
        CaseRecord::new("5", "warfarin", "nausea", false),
        CaseRecord::new("6", "Aspirin", "bleeding", false),
        CaseRecord::new("7", "ibuprofen", "nausea", false),
    ]
}

#[test]
fn direct_scan_partitions_corpus() {
    let table = ContingencyTable::from_records(&corpus(), "aspirin", "bleeding").unwrap();
    assert_eq!(
        table,
        ContingencyTable {
            a: 2,
            b: 1,
            c: 2,
            d: 2
        }
    );
    assert_eq!(table.total(), 7);
    assert_eq!(table.case_count(), 2);
}

#[test]
fn matching_is_exact_on_terms() {
    let table = ContingencyTable::from_records(&corpus(), "Aspirin", "bleeding").unwrap();
    assert_eq!(table.a, 1);
    assert_eq!(table.b, 0);
}

#[test]
fn empty_corpus_has_no_table() {
    assert_eq!(
        ContingencyTable::from_records(&[], "aspirin", "bleeding"),
        Err(SignalError::EmptyCorpus)
    );
    assert_eq!(
        CorpusAggregates::default().table_for("aspirin", "bleeding"),
        Err(SignalError::EmptyCorpus)
    );
}

#[test]
fn negative_cells_are_rejected() {
    let err = ContingencyTable::from_counts(3, -1, 2, 10).unwrap_err();
    assert!(matches!(err, SignalError::InvalidTable { .. }));
}

#[test]
fn aggregates_synthesise_same_tables_as_direct_scan() {
    let records = corpus();
    let aggregates = CorpusAggregates::from_records(&records);
    assert_eq!(aggregates.total(), 7);
    assert_eq!(aggregates.drug_total("aspirin"), 3);
    assert_eq!(aggregates.event_total("bleeding"), 4);
    assert_eq!(aggregates.pair_count("aspirin", "bleeding").serious, 1);

    for (drug, event, count) in aggregates.pairs() {
        let synthesized = aggregates.table_for(drug, event).unwrap();
        let scanned = ContingencyTable::from_records(&records, drug, event).unwrap();
        assert_eq!(synthesized, scanned, "{drug}/{event}");
        assert_eq!(synthesized.a, count.cases);
        assert_eq!(synthesized.total(), aggregates.total());
    }
}

#[test]
fn unobserved_pair_still_gets_a_table() {
    let aggregates = CorpusAggregates::from_records(&corpus());
    let table = aggregates.table_for("ibuprofen", "bleeding").unwrap();
    assert_eq!(table.a, 0);
    assert_eq!(table.total(), 7);
}

#[test]
fn partitioned_aggregation_matches_single_pass() {
    let records = corpus();
    let partitions: Vec<Vec<CaseRecord>> = records.chunks(3).map(|c| c.to_vec()).collect();
    let merged = CorpusAggregates::from_partitions(&partitions);
    let sequential = CorpusAggregates::from_records(&records);
    assert_eq!(merged, sequential);
    let pairs: Vec<_> = merged.pairs().map(|(d, e, _)| (d.to_string(), e.to_string())).collect();
    let expected: Vec<_> = sequential
        .pairs()
        .map(|(d, e, _)| (d.to_string(), e.to_string()))
        .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn grouped_counts_rebuild_marginals() {
    let aggregates = CorpusAggregates::from_pair_counts(vec![
        (("a".to_string(), "x".to_string()), PairCount { cases: 4, serious: 1 }),
        (("a".to_string(), "y".to_string()), PairCount { cases: 2, serious: 0 }),
        (("b".to_string(), "x".to_string()), PairCount { cases: 6, serious: 6 }),
        (("c".to_string(), "z".to_string()), PairCount { cases: 0, serious: 0 }),
    ]);
    assert_eq!(aggregates.total(), 12);
    assert_eq!(aggregates.drug_total("a"), 6);
    assert_eq!(aggregates.event_total("x"), 10);
    assert_eq!(aggregates.pair_len(), 3);
    assert_eq!(
        aggregates.table_for("a", "x").unwrap(),
        ContingencyTable {
            a: 4,
            b: 2,
            c: 6,
            d: 0
        }
    );
}

#[test]
fn inconsistent_marginals_surface_as_invalid_table() {
    let drug_totals = IndexMap::from([("a".to_string(), 2u64)]);
    let event_totals = IndexMap::from([("x".to_string(), 5u64)]);
    let pairs = IndexMap::from([(
        ("a".to_string(), "x".to_string()),
        PairCount { cases: 3, serious: 0 },
    )]);
    let aggregates = CorpusAggregates::from_parts(5, drug_totals, event_totals, pairs);
    let err = aggregates.table_for("a", "x").unwrap_err();
    assert!(matches!(err, SignalError::InvalidTable { .. }));
}
