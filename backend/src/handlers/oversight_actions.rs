use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::common::parse_id,
    models::{
        oversight_action::{OversightAction, OversightActionFilters, RecordOversightActionPayload},
        PaginatedResponse, PaginationQuery,
    },
    state::AppState,
    types::OversightActionId,
};

pub async fn record_oversight_action(
    State(state): State<AppState>,
    Json(payload): Json<RecordOversightActionPayload>,
) -> Result<(StatusCode, Json<OversightAction>), AppError> {
    payload.validate()?;
    let action = state.oversight().record(payload).await?;
    Ok((StatusCode::CREATED, Json(action)))
}

pub async fn get_oversight_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OversightAction>, AppError> {
    let id: OversightActionId = parse_id(&id, "oversight action")?;
    Ok(Json(state.oversight().get(id).await?))
}

pub async fn list_oversight_actions(
    State(state): State<AppState>,
    Query(filters): Query<OversightActionFilters>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<OversightAction>>, AppError> {
    Ok(Json(state.oversight().list(&filters, &page).await?))
}
