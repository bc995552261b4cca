//! Common extractors for API handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::layout::ScopeKey;

pub const ORGANIZATION_HEADER: &str = "x-organization-id";
pub const ENVIRONMENT_HEADER: &str = "x-environment-id";

/// The caller's (organization, environment) scope, taken from the
/// request headers populated by the session layer upstream of this
/// service. Default exclusivity is enforced within this partition.
#[derive(Debug, Clone, Copy)]
pub struct ScopeContext(pub ScopeKey);

impl<S> FromRequestParts<S> for ScopeContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let organization_id = header_uuid(parts, ORGANIZATION_HEADER)?;
        let environment_id = header_uuid(parts, ENVIRONMENT_HEADER)?;
        Ok(ScopeContext(ScopeKey::new(organization_id, environment_id)))
    }
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Uuid, ApiError> {
    let value = parts
        .headers
        .get(name)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {name} header")))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized(format!("invalid {name} header")))?;

    Uuid::parse_str(value).map_err(|_| ApiError::Unauthorized(format!("invalid {name} header")))
}

/// Pagination parameters with defaults.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_page_size", rename = "pageSize")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl PaginationParams {
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.clamp(1, 100)
    }
}
