use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppError,
    handlers::common::parse_id,
    models::assignment::{
        AssignQualifierPayload, Assignment, AssignmentRemoval, CloseAssignmentPayload,
        RemoveAssignmentQuery, UpdateAssignmentPayload,
    },
    state::AppState,
    types::AssignmentId,
};

pub async fn assign_qualifier(
    State(state): State<AppState>,
    Json(payload): Json<AssignQualifierPayload>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    payload.validate()?;
    let assignment = state.relationships().assign_qualifier(payload).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn get_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Assignment>, AppError> {
    let id: AssignmentId = parse_id(&id, "assignment")?;
    Ok(Json(state.relationships().get_assignment(id).await?))
}

pub async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAssignmentPayload>,
) -> Result<Json<Assignment>, AppError> {
    payload.validate()?;
    let id: AssignmentId = parse_id(&id, "assignment")?;
    Ok(Json(state.relationships().update_assignment(id, payload).await?))
}

pub async fn close_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CloseAssignmentPayload>,
) -> Result<Json<Assignment>, AppError> {
    let id: AssignmentId = parse_id(&id, "assignment")?;
    Ok(Json(state.relationships().close_assignment(id, payload).await?))
}

pub async fn remove_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RemoveAssignmentQuery>,
) -> Result<Json<AssignmentRemoval>, AppError> {
    let id: AssignmentId = parse_id(&id, "assignment")?;
    let removal = state
        .relationships()
        .remove_assignment(id, query.justification_id)
        .await?;
    Ok(Json(removal))
}
