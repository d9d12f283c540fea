use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs::ApiDoc,
    handlers,
    middleware::{log_error_responses, request_id, request_span},
    state::AppState,
};

/// Builds the full HTTP surface with shared layers and state.
pub fn build_router(state: AppState) -> Router {
    let registry_routes = Router::new()
        .route("/api/businesses", post(handlers::businesses::register_business))
        .route("/api/businesses/{id}", get(handlers::businesses::get_business))
        .route(
            "/api/businesses/{id}/license",
            put(handlers::businesses::update_license),
        )
        .route(
            "/api/businesses/{id}/deactivate",
            post(handlers::businesses::deactivate_business),
        )
        .route("/api/qualifiers", post(handlers::qualifiers::register_qualifier))
        .route("/api/qualifiers/{id}", get(handlers::qualifiers::get_qualifier))
        .route(
            "/api/qualifiers/{id}/capacity",
            get(handlers::qualifiers::get_qualifier_capacity)
                .put(handlers::qualifiers::set_qualifier_capacity),
        )
        .route(
            "/api/qualifiers/{id}/deactivate",
            post(handlers::qualifiers::deactivate_qualifier),
        );

    let assignment_routes = Router::new()
        .route("/api/assignments", post(handlers::assignments::assign_qualifier))
        .route(
            "/api/assignments/{id}",
            get(handlers::assignments::get_assignment)
                .put(handlers::assignments::update_assignment)
                .delete(handlers::assignments::remove_assignment),
        )
        .route(
            "/api/assignments/{id}/close",
            post(handlers::assignments::close_assignment),
        )
        .route(
            "/api/qualifiers/{id}/assignments",
            get(handlers::qualifiers::list_qualifier_assignments),
        )
        .route(
            "/api/businesses/{id}/assignments",
            get(handlers::businesses::list_business_assignments),
        );

    let compliance_routes = Router::new()
        .route(
            "/api/oversight-actions",
            get(handlers::oversight_actions::list_oversight_actions)
                .post(handlers::oversight_actions::record_oversight_action),
        )
        .route(
            "/api/oversight-actions/{id}",
            get(handlers::oversight_actions::get_oversight_action),
        )
        .route(
            "/api/overrides",
            get(handlers::overrides::list_overrides).post(handlers::overrides::record_override),
        )
        .route("/api/overrides/{id}", get(handlers::overrides::get_override));

    Router::new()
        .merge(registry_routes)
        .merge(assignment_routes)
        .merge(compliance_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(axum_middleware::from_fn(log_error_responses))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .with_state(state)
}
