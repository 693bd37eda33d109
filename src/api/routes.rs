//! HTTP route handlers for Axum.

use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::{
    api::types::AnalyzeRequest,
    stats::{self, AnalysisOptions, StratifiedReport},
};

use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn analyze(
    state: State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<StratifiedReport> {
    let options = AnalysisOptions {
        pass_rule: request.pass,
        policy: request.policy.unwrap_or(state.settings.degenerate_policy),
        confidence: request.confidence.unwrap_or(state.settings.confidence),
    };
    let tables: Vec<_> = request
        .strata
        .into_iter()
        .enumerate()
        .map(|(idx, table)| {
            let label = table.label.clone().unwrap_or_else(|| idx.to_string());
            (label, table)
        })
        .collect();
    stats::analyze(&tables, &options).map(Json).map_err(|err| {
        warn!(%err, "analysis rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
    })
}
