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
        assignment::{Assignment, AssignmentListQuery},
        qualifier::{Qualifier, QualifierCapacity, RegisterQualifierPayload, SetCapacityPayload},
    },
    state::AppState,
    types::QualifierId,
};

pub async fn register_qualifier(
    State(state): State<AppState>,
    Json(payload): Json<RegisterQualifierPayload>,
) -> Result<(StatusCode, Json<Qualifier>), AppError> {
    payload.validate()?;
    let qualifier = state.registry().register_qualifier(payload).await?;
    Ok((StatusCode::CREATED, Json(qualifier)))
}

pub async fn get_qualifier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Qualifier>, AppError> {
    let id: QualifierId = parse_id(&id, "qualifier")?;
    Ok(Json(state.registry().get_qualifier(id).await?))
}

pub async fn set_qualifier_capacity(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SetCapacityPayload>,
) -> Result<Json<Qualifier>, AppError> {
    payload.validate()?;
    let id: QualifierId = parse_id(&id, "qualifier")?;
    let qualifier = state
        .registry()
        .set_qualifier_capacity(id, payload.max_licenses_allowed)
        .await?;
    Ok(Json(qualifier))
}

/// Display-only snapshot; may lag concurrent writes.
pub async fn get_qualifier_capacity(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<QualifierCapacity>, AppError> {
    let id: QualifierId = parse_id(&id, "qualifier")?;
    Ok(Json(state.relationships().get_qualifier_capacity(id).await?))
}

pub async fn list_qualifier_assignments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AssignmentListQuery>,
) -> Result<Json<Vec<Assignment>>, AppError> {
    let id: QualifierId = parse_id(&id, "qualifier")?;
    let assignments = state
        .relationships()
        .list_for_qualifier(id, query.active_only)
        .await?;
    Ok(Json(assignments))
}

pub async fn deactivate_qualifier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Qualifier>, AppError> {
    let id: QualifierId = parse_id(&id, "qualifier")?;
    Ok(Json(state.registry().deactivate_qualifier(id).await?))
}
