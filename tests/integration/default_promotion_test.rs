//! End-to-end tests for default promotion, scope isolation, and the
//! read endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use layouts_api::app_state::AppState;
use layouts_api::config::Config;
use layouts_api::database::memory::InMemoryLayoutStore;
use layouts_api::database::store::{LayoutStore, StoreError};
use layouts_api::models::layout::{LayoutRecord, NewLayout, ScopeKey};
use layouts_api::router::build_router;

const BASE_PATH: &str = "/v1/layouts";

fn test_app() -> (Router, ScopeKey) {
    let store = Arc::new(InMemoryLayoutStore::new());
    let app = build_router(AppState::new(store, Config::for_tests()));
    let scope = ScopeKey::new(Uuid::new_v4(), Uuid::new_v4());
    (app, scope)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    scope: &ScopeKey,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-organization-id", scope.organization_id.to_string())
        .header("x-environment-id", scope.environment_id.to_string());

    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_layout(app: &Router, scope: &ScopeKey, name: &str, is_default: bool) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        BASE_PATH,
        scope,
        Some(json!({
            "name": name,
            "content": "<html><body>{{body}}</body></html>",
            "isDefault": is_default
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn set_default_endpoint_promotes_and_demotes() {
    let (app, scope) = test_app();

    let first = create_layout(&app, &scope, "first", true).await;
    let second = create_layout(&app, &scope, "second", false).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{BASE_PATH}/{second}/default"),
        &scope,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isDefault"], true);

    let (_, body) = send(&app, Method::GET, &format!("{BASE_PATH}/{first}"), &scope, None).await;
    assert_eq!(body["data"]["isDefault"], false);
}

#[tokio::test]
async fn set_default_on_empty_scope_is_not_found() {
    let (app, scope) = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{BASE_PATH}/{}/default", Uuid::new_v4()),
        &scope,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
}

#[tokio::test]
async fn set_default_on_foreign_layout_is_not_found() {
    let (app, scope_a) = test_app();
    let scope_b = ScopeKey::new(Uuid::new_v4(), Uuid::new_v4());

    let foreign = create_layout(&app, &scope_b, "foreign", false).await;
    // Scope A has layouts of its own; the candidate still must belong
    // to it.
    create_layout(&app, &scope_a, "local", false).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("{BASE_PATH}/{foreign}/default"),
        &scope_a,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_is_isolated_per_scope() {
    let (app, scope_a) = test_app();
    let scope_b = ScopeKey::new(Uuid::new_v4(), Uuid::new_v4());

    let id = create_layout(&app, &scope_a, "mine", false).await;

    let (status, _) = send(&app, Method::GET, &format!("{BASE_PATH}/{id}"), &scope_b, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_layout_is_not_found() {
    let (app, scope) = test_app();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("{BASE_PATH}/{}", Uuid::new_v4()),
        &scope,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn missing_scope_headers_are_unauthorized() {
    let (app, _scope) = test_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri(BASE_PATH)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_paginates_in_creation_order() {
    let (app, scope) = test_app();

    for i in 0..5 {
        create_layout(&app, &scope, &format!("layout-{i}"), false).await;
    }

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("{BASE_PATH}?page=2&pageSize=2"),
        &scope,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 5);
    assert_eq!(body["page"], 2);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["layout-2", "layout-3"]);
}

/// Store wrapper whose atomic default operations always lose to a
/// competing writer, so the retry budget is exhausted end to end.
struct ContendedStore {
    inner: InMemoryLayoutStore,
}

#[async_trait]
impl LayoutStore for ContendedStore {
    async fn get(&self, id: Uuid) -> Result<Option<LayoutRecord>, StoreError> {
        self.inner.get(id).await
    }

    async fn list_by_scope(&self, scope: &ScopeKey) -> Result<Vec<LayoutRecord>, StoreError> {
        self.inner.list_by_scope(scope).await
    }

    async fn count_by_scope(&self, scope: &ScopeKey) -> Result<i64, StoreError> {
        self.inner.count_by_scope(scope).await
    }

    async fn insert(&self, layout: NewLayout) -> Result<LayoutRecord, StoreError> {
        self.inner.insert(layout).await
    }

    async fn insert_as_default(&self, _layout: NewLayout) -> Result<LayoutRecord, StoreError> {
        Err(StoreError::Conflict)
    }

    async fn promote_default(
        &self,
        _scope: &ScopeKey,
        _candidate: Uuid,
    ) -> Result<LayoutRecord, StoreError> {
        Err(StoreError::Conflict)
    }
}

#[tokio::test]
async fn persistent_contention_surfaces_as_conflict() {
    let store = Arc::new(ContendedStore {
        inner: InMemoryLayoutStore::new(),
    });
    let app = build_router(AppState::new(store, Config::for_tests()));
    let scope = ScopeKey::new(Uuid::new_v4(), Uuid::new_v4());

    let id = create_layout(&app, &scope, "contended", false).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{BASE_PATH}/{id}/default"),
        &scope,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let (app, _scope) = test_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
}
