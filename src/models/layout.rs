//! Layout Models
//!
//! Data structures for the layout resource: records, content blocks,
//! template variables, and the request/response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// The (organization, environment) partition within which default
/// exclusivity is enforced. Scopes are fully independent units of
/// concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScopeKey {
    pub organization_id: Uuid,
    pub environment_id: Uuid,
}

impl ScopeKey {
    pub fn new(organization_id: Uuid, environment_id: Uuid) -> Self {
        Self {
            organization_id,
            environment_id,
        }
    }
}

/// Layout content: either a raw markup string or an ordered list of
/// structured content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum LayoutContent {
    Markup(String),
    Blocks(Vec<ContentBlock>),
}

/// A single structured content block, discriminated by its `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text {
        content: String,
    },
    Button {
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
}

/// Type of a template variable declared by a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TemplateVariableType {
    String,
    Array,
    Boolean,
}

/// A variable declaration referencing placeholders usable inside the
/// layout content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: TemplateVariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(default)]
    pub required: bool,
}

/// A persisted layout record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRecord {
    pub id: Uuid,
    pub scope: ScopeKey,
    pub name: String,
    pub description: Option<String>,
    pub content: LayoutContent,
    pub variables: Vec<TemplateVariable>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a layout to be persisted. The id and timestamps are
/// assigned by the store.
#[derive(Debug, Clone)]
pub struct NewLayout {
    pub scope: ScopeKey,
    pub name: String,
    pub description: Option<String>,
    pub content: LayoutContent,
    pub variables: Vec<TemplateVariable>,
    pub is_default: bool,
}

/// Typed create-layout request, deserialized only after required-field
/// validation has passed.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLayoutRequest {
    #[validate(length(min = 1, message = "name should not be empty"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: LayoutContent,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
    #[serde(default)]
    pub is_default: bool,
}

/// Layout as serialized on the wire. The id field keeps the `_id` name
/// clients already depend on.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub environment_id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: LayoutContent,
    pub variables: Vec<TemplateVariable>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LayoutRecord> for LayoutResponse {
    fn from(record: LayoutRecord) -> Self {
        Self {
            id: record.id,
            organization_id: record.scope.organization_id,
            environment_id: record.scope.environment_id,
            name: record.name,
            description: record.description,
            content: record.content,
            variables: record.variables,
            is_default: record.is_default,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
