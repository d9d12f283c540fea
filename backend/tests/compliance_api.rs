use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use compliance_backend::{middleware::request_id::REQUEST_ID_HEADER, routes::build_router};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

mod support;

use support::{fresh_pool, integration_guard, test_state};

fn app(pool: &PgPool) -> Router {
    build_router(test_state(pool))
}

async fn send(pool: &PgPool, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");
    app(pool).oneshot(request).await.expect("call router")
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

async fn create(pool: &PgPool, uri: &str, body: Value) -> Value {
    let response = send(pool, Method::POST, uri, Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {}", uri);
    json_body(response).await
}

async fn business(pool: &PgPool, name: &str) -> Value {
    create(
        pool,
        "/api/businesses",
        json!({
            "name": name,
            "license_number": format!("LIC-{}", &Uuid::new_v4().simple().to_string()[..10]),
        }),
    )
    .await
}

async fn qualifier(pool: &PgPool, max: i32) -> Value {
    create(
        pool,
        "/api/qualifiers",
        json!({ "account_id": Uuid::new_v4(), "max_licenses_allowed": max }),
    )
    .await
}

#[tokio::test]
async fn capacity_rejection_reports_conflicting_businesses() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = qualifier(&pool, 1).await;
    let a = business(&pool, "Alder Construction").await;
    let b = business(&pool, "Birch Builders").await;

    let first = create(
        &pool,
        "/api/assignments",
        json!({
            "qualifier_id": qualifier["id"],
            "business_id": a["id"],
            "start_date": "2024-01-01",
        }),
    )
    .await;
    assert!(first["assignment_code"]
        .as_str()
        .is_some_and(|code| code.starts_with("ASN-")));

    let response = send(
        &pool,
        Method::POST,
        "/api/assignments",
        Some(json!({
            "qualifier_id": qualifier["id"],
            "business_id": b["id"],
            "start_date": "2024-03-01",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body = json_body(response).await;
    assert_eq!(body["code"], "CAPACITY_EXCEEDED");
    assert_eq!(body["details"]["current_count"], 1);
    assert_eq!(body["details"]["max_allowed"], 1);
    assert_eq!(
        body["details"]["conflicting_businesses"][0]["business_id"],
        a["id"]
    );

    let capacity = send(
        &pool,
        Method::GET,
        &format!("/api/qualifiers/{}/capacity", qualifier["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(capacity.status(), StatusCode::OK);
    let capacity = json_body(capacity).await;
    assert_eq!(capacity["current_count"], 1);
    assert_eq!(capacity["at_capacity"], true);
}

#[tokio::test]
async fn duplicate_pair_and_late_action_map_to_rule_codes() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = qualifier(&pool, 2).await;
    let a = business(&pool, "Alder Construction").await;
    let assignment = create(
        &pool,
        "/api/assignments",
        json!({
            "qualifier_id": qualifier["id"],
            "business_id": a["id"],
            "start_date": "2024-03-01",
        }),
    )
    .await;

    let duplicate = send(
        &pool,
        Method::POST,
        "/api/assignments",
        Some(json!({
            "qualifier_id": qualifier["id"],
            "business_id": a["id"],
            "start_date": "2024-05-01",
        })),
    )
    .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(duplicate).await["code"], "DUPLICATE_ACTIVE_RELATIONSHIP");

    let assignment_id = assignment["id"].as_str().unwrap().to_string();
    let closed = send(
        &pool,
        Method::POST,
        &format!("/api/assignments/{}/close", assignment_id),
        Some(json!({ "end_date": "2025-01-01", "cutoff_date": "2025-01-15" })),
    )
    .await;
    assert_eq!(closed.status(), StatusCode::OK);

    let late = send(
        &pool,
        Method::POST,
        "/api/oversight-actions",
        Some(json!({
            "project_id": Uuid::new_v4(),
            "business_id": a["id"],
            "qualifier_id": qualifier["id"],
            "assignment_id": assignment_id,
            "action_type": "site_visit",
            "action_date": "2025-01-20",
            "created_by": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(late.status(), StatusCode::CONFLICT);
    let body = json_body(late).await;
    assert_eq!(body["code"], "CUTOFF_VIOLATION");
    assert_eq!(body["details"]["cutoff_date"], "2025-01-15");

    let reclose = send(
        &pool,
        Method::POST,
        &format!("/api/assignments/{}/close", assignment_id),
        Some(json!({ "end_date": "2025-02-01" })),
    )
    .await;
    assert_eq!(reclose.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(reclose).await["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn malformed_input_is_rejected_before_enforcement() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let bad_id = send(&pool, Method::GET, "/api/assignments/not-a-uuid", None).await;
    assert_eq!(bad_id.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(bad_id).await["code"], "BAD_REQUEST");

    let missing = send(
        &pool,
        Method::GET,
        &format!("/api/qualifiers/{}", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let blank_reason = send(
        &pool,
        Method::POST,
        "/api/overrides",
        Some(json!({
            "rule_violated": "capacity_limit",
            "reason": "short",
            "approver_id": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(blank_reason.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(blank_reason).await["code"], "VALIDATION_ERROR");

    let qualifier = qualifier(&pool, 2).await;
    let a = business(&pool, "Alder Construction").await;
    let inverted = send(
        &pool,
        Method::POST,
        "/api/assignments",
        Some(json!({
            "qualifier_id": qualifier["id"],
            "business_id": a["id"],
            "start_date": "2024-06-01",
            "end_date": "2024-01-01",
        })),
    )
    .await;
    assert_eq!(inverted.status(), StatusCode::BAD_REQUEST);
    let body = json_body(inverted).await;
    assert_eq!(body["details"]["errors"][0], "end_date: before_start_date");
}

#[tokio::test]
async fn removal_through_the_api_needs_a_retention_justification() {
    let _guard = integration_guard().await;
    let pool = fresh_pool().await;

    let qualifier = qualifier(&pool, 2).await;
    let a = business(&pool, "Alder Construction").await;
    let assignment = create(
        &pool,
        "/api/assignments",
        json!({
            "qualifier_id": qualifier["id"],
            "business_id": a["id"],
            "start_date": "2024-01-01",
        }),
    )
    .await;
    let assignment_id = assignment["id"].as_str().unwrap().to_string();

    let justification = create(
        &pool,
        "/api/overrides",
        json!({
            "rule_violated": "assignment_history_retention",
            "reason": "Entered against the wrong business by mistake",
            "approver_id": Uuid::new_v4(),
        }),
    )
    .await;
    let justification_id = justification["id"].as_str().unwrap().to_string();

    let without = send(
        &pool,
        Method::DELETE,
        &format!("/api/assignments/{}", assignment_id),
        None,
    )
    .await;
    assert_eq!(without.status(), StatusCode::BAD_REQUEST);

    let removed = send(
        &pool,
        Method::DELETE,
        &format!(
            "/api/assignments/{}?justification_id={}",
            assignment_id, justification_id
        ),
        None,
    )
    .await;
    assert_eq!(removed.status(), StatusCode::OK);
    let body = json_body(removed).await;
    assert_eq!(body["justification_id"], justification_id.as_str());
    assert_eq!(body["detached_actions"], 0);

    let gone = send(
        &pool,
        Method::GET,
        &format!("/api/assignments/{}", assignment_id),
        None,
    )
    .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);

    let overrides = send(
        &pool,
        Method::GET,
        "/api/overrides?rule=assignment_history_retention",
        None,
    )
    .await;
    assert_eq!(overrides.status(), StatusCode::OK);
    let listed = json_body(overrides).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}
