use pv_signals::{
    signals::{
        aggregate::{assess, priority_for, MethodResults},
        Method, MethodResult, Priority, PriorityPolicy, SignalStrength,
    },
    SignalError,
};

fn flagged(is_signal: bool) -> Option<MethodResult> {
    Some(MethodResult {
        value: 3.0,
        ci_lower: 1.5,
        ci_upper: 6.0,
        is_signal,
    })
}

#[test]
fn all_three_methods_make_a_strong_critical_signal() {
    let results = MethodResults {
        prr: flagged(true),
        ror: flagged(true),
        ic: flagged(true),
    };
    let assessment = assess(&results, 4, &PriorityPolicy::default()).unwrap();
    assert!(assessment.overall_is_signal);
    assert_eq!(assessment.signal_strength, SignalStrength::Strong);
    assert_eq!(assessment.methods_flagged, vec![Method::Prr, Method::Ror, Method::Ic]);
    assert_eq!(assessment.priority, Priority::Critical);
}

#[test]
fn moderate_signal_escalates_only_above_high_volume() {
    let results = MethodResults {
        prr: flagged(true),
        ror: flagged(false),
        ic: flagged(true),
    };
    let policy = PriorityPolicy {
        high_volume_cases: 10,
    };
    let at_threshold = assess(&results, 10, &policy).unwrap();
    assert_eq!(at_threshold.signal_strength, SignalStrength::Moderate);
    assert_eq!(at_threshold.methods_flagged, vec![Method::Prr, Method::Ic]);
    assert_eq!(at_threshold.priority, Priority::High);

    let above = assess(&results, 11, &policy).unwrap();
    assert_eq!(above.priority, Priority::Critical);
}

#[test]
fn single_method_is_weak_medium() {
    let results = MethodResults {
        prr: flagged(false),
        ror: flagged(true),
        ic: flagged(false),
    };
    let assessment = assess(&results, 500, &PriorityPolicy::default()).unwrap();
    assert_eq!(assessment.signal_strength, SignalStrength::Weak);
    assert_eq!(assessment.priority, Priority::Medium);
}

#[test]
fn no_flags_is_low_priority() {
    let results = MethodResults {
        prr: flagged(false),
        ror: flagged(false),
        ic: flagged(false),
    };
    let assessment = assess(&results, 0, &PriorityPolicy::default()).unwrap();
    assert!(!assessment.overall_is_signal);
    assert_eq!(assessment.signal_strength, SignalStrength::None);
    assert!(assessment.methods_flagged.is_empty());
    assert_eq!(assessment.priority, Priority::Low);
}

#[test]
fn unselected_methods_do_not_count() {
    let results = MethodResults {
        prr: flagged(true),
        ..MethodResults::default()
    };
    let assessment = assess(&results, 50, &PriorityPolicy::default()).unwrap();
    assert_eq!(assessment.signal_strength, SignalStrength::Weak);
    assert_eq!(assessment.methods_flagged, vec![Method::Prr]);
}

#[test]
fn negative_case_count_is_rejected() {
    let err = assess(&MethodResults::default(), -1, &PriorityPolicy::default()).unwrap_err();
    assert!(matches!(err, SignalError::InvalidTable { .. }));
}

#[test]
fn priority_table_matches_policy() {
    let policy = PriorityPolicy {
        high_volume_cases: 25,
    };
    assert_eq!(priority_for(SignalStrength::Strong, 1, &policy), Priority::Critical);
    assert_eq!(priority_for(SignalStrength::Moderate, 26, &policy), Priority::Critical);
    assert_eq!(priority_for(SignalStrength::Moderate, 25, &policy), Priority::High);
    assert_eq!(priority_for(SignalStrength::Weak, 1_000, &policy), Priority::Medium);
    assert_eq!(priority_for(SignalStrength::None, 1_000, &policy), Priority::Low);
}

#[test]
fn assessment_serialises_for_api_consumers() {
    let results = MethodResults {
        prr: flagged(true),
        ror: flagged(true),
        ic: flagged(false),
    };
    let assessment = assess(&results, 3, &PriorityPolicy::default()).unwrap();
    insta::assert_json_snapshot!(assessment, @r###"
    {
      "overall_is_signal": true,
      "signal_strength": "moderate",
      "methods_flagged": [
        "PRR",
        "ROR"
      ],
      "priority": "HIGH"
    }
    "###);
}
