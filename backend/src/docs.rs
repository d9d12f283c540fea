#![allow(dead_code)] // OpenAPI doc stubs are only referenced by utoipa macros.

use crate::{
    error::{ConflictingBusiness, ErrorResponse},
    models::{
        assignment::{
            AssignQualifierPayload, Assignment, AssignmentListQuery, AssignmentRemoval,
            CloseAssignmentPayload, RelationshipKind, RemoveAssignmentQuery,
            UpdateAssignmentPayload,
        },
        business::{LicenseStatus, LicensedBusiness, RegisterBusinessPayload, UpdateLicensePayload},
        justification::{
            ComplianceJustification, OverrideListQuery, OverrideRule, RecordOverridePayload,
        },
        oversight_action::{
            OversightAction, OversightActionFilters, OversightActionType,
            RecordOversightActionPayload,
        },
        qualifier::{
            ActiveBusiness, Qualifier, QualifierCapacity, RegisterQualifierPayload,
            SetCapacityPayload,
        },
        PaginatedResponse, PaginationQuery,
    },
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        register_business_doc,
        get_business_doc,
        update_license_doc,
        deactivate_business_doc,
        list_business_assignments_doc,
        register_qualifier_doc,
        get_qualifier_doc,
        set_qualifier_capacity_doc,
        get_qualifier_capacity_doc,
        list_qualifier_assignments_doc,
        deactivate_qualifier_doc,
        assign_qualifier_doc,
        get_assignment_doc,
        update_assignment_doc,
        close_assignment_doc,
        remove_assignment_doc,
        record_oversight_action_doc,
        get_oversight_action_doc,
        list_oversight_actions_doc,
        record_override_doc,
        get_override_doc,
        list_overrides_doc
    ),
    components(
        schemas(
            ErrorResponse,
            ConflictingBusiness,
            // registry
            LicenseStatus,
            LicensedBusiness,
            RegisterBusinessPayload,
            UpdateLicensePayload,
            Qualifier,
            RegisterQualifierPayload,
            SetCapacityPayload,
            QualifierCapacity,
            ActiveBusiness,
            // assignments
            RelationshipKind,
            Assignment,
            AssignQualifierPayload,
            UpdateAssignmentPayload,
            CloseAssignmentPayload,
            AssignmentRemoval,
            // oversight
            OversightActionType,
            OversightAction,
            RecordOversightActionPayload,
            // overrides
            OverrideRule,
            ComplianceJustification,
            RecordOverridePayload
        )
    ),
    tags(
        (name = "Registry", description = "Licensed businesses and qualifiers"),
        (name = "Assignments", description = "Qualifier to business relationships under capacity enforcement"),
        (name = "Oversight", description = "Append-only oversight audit trail"),
        (name = "Overrides", description = "Compliance override ledger")
    )
)]
pub struct ApiDoc;

#[utoipa::path(
    post,
    path = "/api/businesses",
    request_body = RegisterBusinessPayload,
    responses(
        (status = 201, body = LicensedBusiness),
        (status = 400, body = ErrorResponse),
        (status = 409, description = "License number already registered", body = ErrorResponse)
    ),
    tag = "Registry"
)]
fn register_business_doc() {}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}",
    params(("id" = String, Path, description = "Business ID")),
    responses((status = 200, body = LicensedBusiness), (status = 404, body = ErrorResponse)),
    tag = "Registry"
)]
fn get_business_doc() {}

#[utoipa::path(
    put,
    path = "/api/businesses/{id}/license",
    params(("id" = String, Path, description = "Business ID")),
    request_body = UpdateLicensePayload,
    responses(
        (status = 200, body = LicensedBusiness),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse)
    ),
    tag = "Registry"
)]
fn update_license_doc() {}

#[utoipa::path(
    post,
    path = "/api/businesses/{id}/deactivate",
    params(("id" = String, Path, description = "Business ID")),
    responses(
        (status = 200, body = LicensedBusiness),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "Open assignments remain", body = ErrorResponse)
    ),
    tag = "Registry"
)]
fn deactivate_business_doc() {}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/assignments",
    params(("id" = String, Path, description = "Business ID"), AssignmentListQuery),
    responses((status = 200, body = [Assignment]), (status = 404, body = ErrorResponse)),
    tag = "Assignments"
)]
fn list_business_assignments_doc() {}

#[utoipa::path(
    post,
    path = "/api/qualifiers",
    request_body = RegisterQualifierPayload,
    responses(
        (status = 201, body = Qualifier),
        (status = 400, body = ErrorResponse),
        (status = 409, description = "Account already registered", body = ErrorResponse)
    ),
    tag = "Registry"
)]
fn register_qualifier_doc() {}

#[utoipa::path(
    get,
    path = "/api/qualifiers/{id}",
    params(("id" = String, Path, description = "Qualifier ID")),
    responses((status = 200, body = Qualifier), (status = 404, body = ErrorResponse)),
    tag = "Registry"
)]
fn get_qualifier_doc() {}

#[utoipa::path(
    put,
    path = "/api/qualifiers/{id}/capacity",
    params(("id" = String, Path, description = "Qualifier ID")),
    request_body = SetCapacityPayload,
    responses(
        (status = 200, body = Qualifier),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "New limit is below current concurrent assignments", body = ErrorResponse)
    ),
    tag = "Registry"
)]
fn set_qualifier_capacity_doc() {}

#[utoipa::path(
    get,
    path = "/api/qualifiers/{id}/capacity",
    params(("id" = String, Path, description = "Qualifier ID")),
    responses(
        (status = 200, description = "Display-only snapshot", body = QualifierCapacity),
        (status = 404, body = ErrorResponse)
    ),
    tag = "Assignments"
)]
fn get_qualifier_capacity_doc() {}

#[utoipa::path(
    get,
    path = "/api/qualifiers/{id}/assignments",
    params(("id" = String, Path, description = "Qualifier ID"), AssignmentListQuery),
    responses((status = 200, body = [Assignment]), (status = 404, body = ErrorResponse)),
    tag = "Assignments"
)]
fn list_qualifier_assignments_doc() {}

#[utoipa::path(
    post,
    path = "/api/qualifiers/{id}/deactivate",
    params(("id" = String, Path, description = "Qualifier ID")),
    responses(
        (status = 200, body = Qualifier),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "Open assignments remain", body = ErrorResponse)
    ),
    tag = "Registry"
)]
fn deactivate_qualifier_doc() {}

#[utoipa::path(
    post,
    path = "/api/assignments",
    request_body = AssignQualifierPayload,
    responses(
        (status = 201, body = Assignment),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "CAPACITY_EXCEEDED, DUPLICATE_ACTIVE_RELATIONSHIP or INVALID_TRANSITION", body = ErrorResponse)
    ),
    tag = "Assignments"
)]
fn assign_qualifier_doc() {}

#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    params(("id" = String, Path, description = "Assignment ID")),
    responses((status = 200, body = Assignment), (status = 404, body = ErrorResponse)),
    tag = "Assignments"
)]
fn get_assignment_doc() {}

#[utoipa::path(
    put,
    path = "/api/assignments/{id}",
    params(("id" = String, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentPayload,
    responses(
        (status = 200, body = Assignment),
        (status = 404, body = ErrorResponse),
        (status = 409, body = ErrorResponse)
    ),
    tag = "Assignments"
)]
fn update_assignment_doc() {}

#[utoipa::path(
    post,
    path = "/api/assignments/{id}/close",
    params(("id" = String, Path, description = "Assignment ID")),
    request_body = CloseAssignmentPayload,
    responses(
        (status = 200, body = Assignment),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "Already closed or end date before start date", body = ErrorResponse)
    ),
    tag = "Assignments"
)]
fn close_assignment_doc() {}

#[utoipa::path(
    delete,
    path = "/api/assignments/{id}",
    params(("id" = String, Path, description = "Assignment ID"), RemoveAssignmentQuery),
    responses(
        (status = 200, body = AssignmentRemoval),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "Justification already applied", body = ErrorResponse)
    ),
    tag = "Assignments"
)]
fn remove_assignment_doc() {}

#[utoipa::path(
    post,
    path = "/api/oversight-actions",
    request_body = RecordOversightActionPayload,
    responses(
        (status = 201, body = OversightAction),
        (status = 400, body = ErrorResponse),
        (status = 404, body = ErrorResponse),
        (status = 409, description = "CUTOFF_VIOLATION", body = ErrorResponse)
    ),
    tag = "Oversight"
)]
fn record_oversight_action_doc() {}

#[utoipa::path(
    get,
    path = "/api/oversight-actions/{id}",
    params(("id" = String, Path, description = "Oversight action ID")),
    responses((status = 200, body = OversightAction), (status = 404, body = ErrorResponse)),
    tag = "Oversight"
)]
fn get_oversight_action_doc() {}

#[utoipa::path(
    get,
    path = "/api/oversight-actions",
    params(OversightActionFilters, PaginationQuery),
    responses(
        (status = 200, body = PaginatedResponse<OversightAction>),
        (status = 400, body = ErrorResponse)
    ),
    tag = "Oversight"
)]
fn list_oversight_actions_doc() {}

#[utoipa::path(
    post,
    path = "/api/overrides",
    request_body = RecordOverridePayload,
    responses(
        (status = 201, body = ComplianceJustification),
        (status = 400, body = ErrorResponse)
    ),
    tag = "Overrides"
)]
fn record_override_doc() {}

#[utoipa::path(
    get,
    path = "/api/overrides/{id}",
    params(("id" = String, Path, description = "Justification ID")),
    responses((status = 200, body = ComplianceJustification), (status = 404, body = ErrorResponse)),
    tag = "Overrides"
)]
fn get_override_doc() {}

#[utoipa::path(
    get,
    path = "/api/overrides",
    params(OverrideListQuery),
    responses((status = 200, body = [ComplianceJustification])),
    tag = "Overrides"
)]
fn list_overrides_doc() {}
