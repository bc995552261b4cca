//! Layout service: request validation plus delegation to the default
//! invariant enforcer and the entity store.

pub mod enforcer;

use std::sync::Arc;

use serde_json::Value;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::database::store::LayoutStore;
use crate::error::ApiError;
use crate::models::layout::{CreateLayoutRequest, LayoutRecord, NewLayout, ScopeKey};
use enforcer::DefaultLayoutEnforcer;

#[derive(Clone)]
pub struct LayoutService {
    store: Arc<dyn LayoutStore>,
    enforcer: DefaultLayoutEnforcer,
}

impl LayoutService {
    pub fn new(store: Arc<dyn LayoutStore>) -> Self {
        let enforcer = DefaultLayoutEnforcer::new(store.clone());
        Self { store, enforcer }
    }

    /// Validate a raw create payload and persist the layout.
    ///
    /// Validation runs against the untyped JSON first so that missing
    /// and mistyped required fields produce the per-field messages the
    /// clients consume, before serde gets a chance to reject the body
    /// wholesale. Nothing is persisted when validation fails.
    pub async fn create_layout(
        &self,
        scope: ScopeKey,
        payload: Value,
    ) -> Result<LayoutRecord, ApiError> {
        let request = parse_create_request(payload)?;

        let record = self
            .enforcer
            .create_with_default(NewLayout {
                scope,
                name: request.name,
                description: request.description,
                content: request.content,
                variables: request.variables,
                is_default: request.is_default,
            })
            .await?;

        info!(
            layout_id = %record.id,
            organization_id = %scope.organization_id,
            is_default = record.is_default,
            "Layout created"
        );

        Ok(record)
    }

    /// Fetch a layout by id, scoped to the caller's partition. Ids from
    /// other scopes read as not found.
    pub async fn get_layout(&self, scope: ScopeKey, id: Uuid) -> Result<LayoutRecord, ApiError> {
        match self.store.get(id).await? {
            Some(record) if record.scope == scope => Ok(record),
            _ => Err(ApiError::NotFound("Layout".to_string())),
        }
    }

    /// List the scope's layouts, oldest first, with offset pagination.
    pub async fn list_layouts(
        &self,
        scope: ScopeKey,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<LayoutRecord>, i64), ApiError> {
        let all = self.store.list_by_scope(&scope).await?;
        let total = all.len() as i64;
        let offset = (page.saturating_sub(1) as usize) * (page_size as usize);
        let items = all
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();
        Ok((items, total))
    }

    /// Promote an existing layout to the scope default.
    pub async fn set_default(&self, scope: ScopeKey, id: Uuid) -> Result<LayoutRecord, ApiError> {
        let record = self.enforcer.promote(&scope, id).await?;
        info!(
            layout_id = %id,
            organization_id = %scope.organization_id,
            "Layout set as scope default"
        );
        Ok(record)
    }
}

/// Required-field validation over the raw payload, then deserialization
/// into the typed request. The message strings are part of the API
/// contract and must not change.
fn parse_create_request(payload: Value) -> Result<CreateLayoutRequest, ApiError> {
    let mut messages = Vec::new();

    let name = payload.get("name");
    if name.is_none() || name.is_some_and(Value::is_null) {
        messages.push("name should not be null or undefined".to_string());
    }
    if !name.is_some_and(Value::is_string) {
        messages.push("name must be a string".to_string());
    }

    let content = payload.get("content");
    if content.is_none() || content.is_some_and(Value::is_null) {
        messages.push("content should not be null or undefined".to_string());
    }

    if !messages.is_empty() {
        return Err(ApiError::Validation(messages));
    }

    let request: CreateLayoutRequest = serde_json::from_value(payload)
        .map_err(|e| ApiError::Validation(vec![format!("request body is malformed: {e}")]))?;

    request.validate().map_err(|errors| {
        let messages = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        ApiError::Validation(messages)
    })?;

    Ok(request)
}
