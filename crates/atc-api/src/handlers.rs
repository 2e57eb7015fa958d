use crate::{ApiError, ApiResult, AppState};
use atc_ai::explain_phrase;
use atc_core::{ExplainRequest, ExplanationBody};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use tracing::{error, info};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Relay one phrase to the provider and return its explanation.
pub async fn decode(
    State(state): State<AppState>,
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> ApiResult<Json<ExplanationBody>> {
    let Json(request) = payload.map_err(|rejection| {
        error!(reason = %rejection.body_text(), "Rejected undecodable decode request");
        ApiError::InvalidBody(rejection.body_text())
    })?;

    let phrase = request
        .phrase
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing 'phrase' in request body.".to_string()))?;

    info!(
        provider = state.provider.provider_name(),
        model = state.provider.model_name(),
        chars = phrase.chars().count(),
        "Explaining ATC phrase"
    );

    let explanation = explain_phrase(state.provider.as_ref(), &phrase, &state.generation)
        .await
        .map_err(|err| {
            let err = ApiError::from(err);
            error!(error = %err, "Explanation request failed");
            err
        })?;

    Ok(Json(ExplanationBody { explanation }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
