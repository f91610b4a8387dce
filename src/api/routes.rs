//! HTTP route handlers for Axum.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::{
    api::types::{ErrorDto, PresetDto, SignalsResponse},
    error::SignalError,
    signals::{MethodSelection, Preset, SignalRecord},
};

use super::AppState;

const MAX_SIGNALS: usize = 200;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorDto>)>;

#[derive(Debug, Default, Deserialize)]
pub struct SignalQuery {
    pub preset: Option<String>,
    pub method: Option<String>,
    pub drug: Option<String>,
    #[serde(default)]
    pub flagged_only: bool,
    pub limit: Option<usize>,
}

pub async fn list_signals(
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> ApiResult<SignalsResponse> {
    detect(&state, query).await
}

pub async fn drug_signals(
    Path(drug): Path<String>,
    State(state): State<AppState>,
    Query(query): Query<SignalQuery>,
) -> ApiResult<SignalsResponse> {
    detect(
        &state,
        SignalQuery {
            drug: Some(drug),
            ..query
        },
    )
    .await
}

pub async fn list_presets() -> Json<Vec<PresetDto>> {
    Json(
        Preset::ALL
            .into_iter()
            .map(|preset| PresetDto {
                name: preset,
                thresholds: preset.thresholds(),
            })
            .collect(),
    )
}

async fn detect(state: &AppState, query: SignalQuery) -> ApiResult<SignalsResponse> {
    let preset = match query.preset.as_deref() {
        Some(raw) => raw.parse::<Preset>().map_err(reject)?,
        None => state.settings.preset,
    };
    let methods = match query.method.as_deref() {
        Some(raw) => raw.parse::<MethodSelection>().map_err(reject)?,
        None => MethodSelection::All,
    };

    let mut detector = state.settings.detector(preset).with_methods(methods);
    let report = detector
        .detect(state.corpus.clone())
        .await
        .map_err(reject)?;

    let mut signals: Vec<SignalRecord> = report
        .records
        .iter()
        .filter(|r| query.drug.as_deref().map_or(true, |drug| r.drug == drug))
        .filter(|r| !query.flagged_only || r.overall_is_signal)
        .cloned()
        .collect();
    signals.sort_by(SignalRecord::review_order);
    signals.truncate(query.limit.unwrap_or(MAX_SIGNALS).min(MAX_SIGNALS));
    Ok(Json(SignalsResponse::new(&report, signals)))
}

fn reject(err: SignalError) -> (StatusCode, Json<ErrorDto>) {
    let status = match &err {
        SignalError::UnknownPreset(_) | SignalError::UnknownMethod(_) => StatusCode::BAD_REQUEST,
        SignalError::EmptyCorpus => StatusCode::UNPROCESSABLE_ENTITY,
        SignalError::CorpusUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        SignalError::InvalidTable { .. } | SignalError::ComputationFailed { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    warn!(code = err.code(), %err, %status, "signal request failed");
    (
        status,
        Json(ErrorDto {
            code: err.code(),
            message: err.to_string(),
        }),
    )
}
