use pv_signals::SignalError;

#[test]
fn every_variant_has_a_distinct_code() {
    let errors = [
        SignalError::EmptyCorpus,
        SignalError::invalid_table("cell c is negative (-2)"),
        SignalError::corpus_unavailable("timed out"),
        SignalError::computation_failed("worker panicked"),
        SignalError::UnknownPreset("lenient".to_string()),
        SignalError::UnknownMethod("bcpnn".to_string()),
    ];
    let codes: Vec<&str> = errors.iter().map(SignalError::code).collect();
    assert_eq!(
        codes,
        vec![
            "EMPTY_CORPUS",
            "INVALID_TABLE",
            "CORPUS_UNAVAILABLE",
            "COMPUTATION_FAILED",
            "UNKNOWN_PRESET",
            "UNKNOWN_METHOD",
        ]
    );
}

#[test]
fn crashed_computation_is_not_reported_as_bad_counts() {
    let err = SignalError::computation_failed("task 3 panicked");
    assert!(!matches!(err, SignalError::InvalidTable { .. }));
    assert_eq!(err.to_string(), "signal computation failed: task 3 panicked");
}
