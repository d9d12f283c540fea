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
        business::{LicensedBusiness, RegisterBusinessPayload, UpdateLicensePayload},
    },
    state::AppState,
    types::LicensedBusinessId,
};

pub async fn register_business(
    State(state): State<AppState>,
    Json(payload): Json<RegisterBusinessPayload>,
) -> Result<(StatusCode, Json<LicensedBusiness>), AppError> {
    payload.validate()?;
    let business = state.registry().register_business(payload).await?;
    Ok((StatusCode::CREATED, Json(business)))
}

pub async fn get_business(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LicensedBusiness>, AppError> {
    let id: LicensedBusinessId = parse_id(&id, "business")?;
    Ok(Json(state.registry().get_business(id).await?))
}

pub async fn update_license(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateLicensePayload>,
) -> Result<Json<LicensedBusiness>, AppError> {
    let id: LicensedBusinessId = parse_id(&id, "business")?;
    Ok(Json(state.registry().update_license(id, payload).await?))
}

pub async fn deactivate_business(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LicensedBusiness>, AppError> {
    let id: LicensedBusinessId = parse_id(&id, "business")?;
    Ok(Json(state.registry().deactivate_business(id).await?))
}

pub async fn list_business_assignments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<AssignmentListQuery>,
) -> Result<Json<Vec<Assignment>>, AppError> {
    let id: LicensedBusinessId = parse_id(&id, "business")?;
    let assignments = state
        .relationships()
        .list_for_business(id, query.active_only)
        .await?;
    Ok(Json(assignments))
}
