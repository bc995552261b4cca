//! Layouts Handler
//!
//! Create, read, list, and set-default endpoints for the layout
//! resource.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use uuid::Uuid;

use crate::AppState;
use crate::error::{Result, handle_rejection};
use crate::handlers::extractors::{PaginationParams, ScopeContext};
use crate::handlers::response::{Created, DataResponse, PaginatedResponse};
use crate::models::layout::LayoutResponse;

/// Create a new layout
/// POST /v1/layouts
#[utoipa::path(
    post,
    path = "/v1/layouts",
    tag = "layouts",
    request_body = crate::models::layout::CreateLayoutRequest,
    responses(
        (status = 201, description = "Layout created", body = DataResponse<LayoutResponse>),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing scope context"),
        (status = 409, description = "Concurrent default promotion conflict")
    )
)]
pub async fn create_layout(
    State(state): State<AppState>,
    ScopeContext(scope): ScopeContext,
    payload: std::result::Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Created<LayoutResponse>> {
    let Json(payload) = payload.map_err(handle_rejection)?;
    let record = state.layout_service.create_layout(scope, payload).await?;
    Ok(Created(record.into()))
}

/// Fetch a layout by id
/// GET /v1/layouts/:id
#[utoipa::path(
    get,
    path = "/v1/layouts/{id}",
    tag = "layouts",
    params(("id" = Uuid, Path, description = "Layout ID")),
    responses(
        (status = 200, description = "Layout", body = DataResponse<LayoutResponse>),
        (status = 401, description = "Missing scope context"),
        (status = 404, description = "Layout not found")
    )
)]
pub async fn get_layout(
    State(state): State<AppState>,
    ScopeContext(scope): ScopeContext,
    Path(id): Path<Uuid>,
) -> Result<Json<DataResponse<LayoutResponse>>> {
    let record = state.layout_service.get_layout(scope, id).await?;
    Ok(Json(DataResponse::new(record.into())))
}

/// List the scope's layouts
/// GET /v1/layouts
#[utoipa::path(
    get,
    path = "/v1/layouts",
    tag = "layouts",
    params(
        ("page" = Option<u32>, Query, description = "Page number, 1-based"),
        ("pageSize" = Option<u32>, Query, description = "Page size, max 100")
    ),
    responses(
        (status = 200, description = "Layouts in scope", body = PaginatedResponse<LayoutResponse>),
        (status = 401, description = "Missing scope context")
    )
)]
pub async fn list_layouts(
    State(state): State<AppState>,
    ScopeContext(scope): ScopeContext,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<LayoutResponse>>> {
    let (items, total) = state
        .layout_service
        .list_layouts(scope, pagination.page(), pagination.page_size())
        .await?;

    Ok(Json(PaginatedResponse::new(
        items.into_iter().map(LayoutResponse::from).collect(),
        pagination.page(),
        pagination.page_size(),
        total,
    )))
}

/// Promote a layout to the scope default
/// POST /v1/layouts/:id/default
#[utoipa::path(
    post,
    path = "/v1/layouts/{id}/default",
    tag = "layouts",
    params(("id" = Uuid, Path, description = "Layout ID")),
    responses(
        (status = 200, description = "Layout promoted", body = DataResponse<LayoutResponse>),
        (status = 401, description = "Missing scope context"),
        (status = 404, description = "Layout or scope not found"),
        (status = 409, description = "Concurrent default promotion conflict")
    )
)]
pub async fn set_default_layout(
    State(state): State<AppState>,
    ScopeContext(scope): ScopeContext,
    Path(id): Path<Uuid>,
) -> Result<Json<DataResponse<LayoutResponse>>> {
    let record = state.layout_service.set_default(scope, id).await?;
    Ok(Json(DataResponse::new(record.into())))
}
