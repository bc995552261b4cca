//! Router configuration for the layouts API.

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app_state::AppState;
use crate::handlers::{health, layouts};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(title = "Layouts API", version = "1.0.0"),
    paths(
        health::health_check,
        layouts::create_layout,
        layouts::get_layout,
        layouts::list_layouts,
        layouts::set_default_layout,
    )
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let request_timeout = std::time::Duration::from_secs(app_state.config.request_timeout);

    let layouts = Router::new()
        .route("/", post(layouts::create_layout).get(layouts::list_layouts))
        .route("/{id}", get(layouts::get_layout))
        .route("/{id}/default", post(layouts::set_default_layout));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/v1/layouts", layouts)
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}
