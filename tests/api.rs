use std::{path::PathBuf, sync::Arc};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pv_signals::{
    api::{router, AppState},
    config::Settings,
    data::{CaseRecord, InMemoryCorpus},
    signals::Preset,
};
use serde_json::Value;
use tower::ServiceExt;

fn settings() -> Settings {
    Settings {
        data_dir: PathBuf::from("./data"),
        outputs_dir: PathBuf::from("./outputs"),
        corpus_path: PathBuf::from("./data/cases.csv"),
        preset: Preset::Standard,
        high_volume_cases: 10,
        corpus_timeout_secs: 5,
        signal_threads: 0,
    }
}

fn app(records: Vec<CaseRecord>) -> Router {
    router(AppState {
        settings: settings(),
        corpus: Arc::new(InMemoryCorpus::new(records)),
    })
}

fn fixture() -> Vec<CaseRecord> {
    let counts = [
        ("D1", "E1", 12),
        ("D1", "E2", 3),
        ("D2", "E1", 2),
        ("D2", "E2", 40),
        ("D3", "E3", 30),
        ("D2", "E3", 10),
    ];
    counts
        .iter()
        .flat_map(|&(drug, event, n)| (0..n).map(move |i| (drug, event, i)))
        .enumerate()
        .map(|(id, (drug, event, i))| CaseRecord::new(id.to_string(), drug, event, i % 2 == 0))
        .collect()
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn signals_are_ordered_for_review() {
    let (status, body) = get(app(fixture()), "/signals").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["preset"], "standard");
    assert_eq!(body["total_cases"], 97);
    assert_eq!(body["pairs_considered"], 6);
    assert_eq!(body["signal_count"], 3);
    assert_eq!(body["returned"], 6);

    let first = &body["signals"][0];
    assert_eq!(first["drug"], "D2");
    assert_eq!(first["event"], "E2");
    assert_eq!(first["priority"], "CRITICAL");
    assert_eq!(first["signal_strength"], "strong");
    assert_eq!(first["methods_flagged"], serde_json::json!(["PRR", "ROR", "IC"]));
}

#[tokio::test]
async fn flagged_only_and_limit_trim_the_listing() {
    let (status, body) = get(app(fixture()), "/signals?flagged_only=true&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["returned"], 2);
    assert_eq!(body["signal_count"], 3);
    let signals = body["signals"].as_array().unwrap();
    assert!(signals.iter().all(|s| s["overall_is_signal"] == true));
}

#[tokio::test]
async fn drug_route_filters_exactly() {
    let (status, body) = get(app(fixture()), "/signals/D1").await;
    assert_eq!(status, StatusCode::OK);
    let signals = body["signals"].as_array().unwrap();
    assert_eq!(signals.len(), 2);
    assert!(signals.iter().all(|s| s["drug"] == "D1"));

    let (_, body) = get(app(fixture()), "/signals/d1").await;
    assert_eq!(body["returned"], 0);
}

#[tokio::test]
async fn single_method_omits_other_results() {
    let (status, body) = get(app(fixture()), "/signals/D1?method=prr").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["methods"], "prr");
    let first = &body["signals"][0];
    assert!(first.get("prr").is_some());
    assert!(first.get("ror").is_none());
    assert!(first.get("ic").is_none());
}

#[tokio::test]
async fn unknown_preset_is_a_bad_request() {
    let (status, body) = get(app(fixture()), "/signals?preset=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_PRESET");

    let (status, body) = get(app(fixture()), "/signals?method=bcpnn").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "UNKNOWN_METHOD");
}

#[tokio::test]
async fn empty_corpus_is_unprocessable() {
    let (status, body) = get(app(Vec::new()), "/signals").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "EMPTY_CORPUS");
}

#[tokio::test]
async fn presets_are_listed_with_thresholds() {
    let (status, body) = get(app(Vec::new()), "/presets").await;
    assert_eq!(status, StatusCode::OK);
    let presets = body.as_array().unwrap();
    assert_eq!(presets.len(), 3);
    let strict = presets.iter().find(|p| p["name"] == "strict").unwrap();
    assert_eq!(strict["prr_min"], 3.0);
    assert_eq!(strict["n_min"], 5);
    assert_eq!(strict["ci_lower_min"], 1.5);
}
