use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::common::parse_id,
    models::justification::{ComplianceJustification, OverrideListQuery, RecordOverridePayload},
    state::AppState,
    types::JustificationId,
};

pub async fn record_override(
    State(state): State<AppState>,
    Json(payload): Json<RecordOverridePayload>,
) -> Result<(StatusCode, Json<ComplianceJustification>), AppError> {
    payload.validate()?;
    let justification = state.overrides().record_override(payload).await?;
    Ok((StatusCode::CREATED, Json(justification)))
}

pub async fn get_override(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ComplianceJustification>, AppError> {
    let id: JustificationId = parse_id(&id, "justification")?;
    Ok(Json(state.overrides().get(id).await?))
}

pub async fn list_overrides(
    State(state): State<AppState>,
    Query(query): Query<OverrideListQuery>,
) -> Result<Json<Vec<ComplianceJustification>>, AppError> {
    Ok(Json(state.overrides().list(query.rule).await?))
}
