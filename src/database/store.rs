//! Entity store contract for layout persistence.
//!
//! Each backend owns its transaction boundary: the multi-row operations
//! (`insert_as_default`, `promote_default`) must commit as a single
//! atomic unit so that no intermediate state, two defaults or zero
//! defaults mid-swap, is observable to concurrent readers.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::layout::{LayoutRecord, NewLayout, ScopeKey};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// Another write to the same scope committed first. Transient;
    /// callers retry.
    #[error("concurrent modification of scope")]
    Conflict,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence contract for layout records.
#[async_trait]
pub trait LayoutStore: Send + Sync {
    /// Fetch a single layout by id.
    async fn get(&self, id: Uuid) -> Result<Option<LayoutRecord>, StoreError>;

    /// List every layout in a scope, oldest first.
    async fn list_by_scope(&self, scope: &ScopeKey) -> Result<Vec<LayoutRecord>, StoreError>;

    /// Count layouts in a scope.
    async fn count_by_scope(&self, scope: &ScopeKey) -> Result<i64, StoreError>;

    /// Persist a new non-default layout. Existing defaults in the scope
    /// are left untouched.
    async fn insert(&self, layout: NewLayout) -> Result<LayoutRecord, StoreError>;

    /// Persist a new layout as the scope default, demoting any current
    /// default in the same atomic unit as the insert.
    async fn insert_as_default(&self, layout: NewLayout) -> Result<LayoutRecord, StoreError>;

    /// Atomically clear the default flag on every other record in the
    /// scope, then set it on `candidate`. Returns `NotFound` when the
    /// candidate is not a member of the scope.
    async fn promote_default(
        &self,
        scope: &ScopeKey,
        candidate: Uuid,
    ) -> Result<LayoutRecord, StoreError>;
}
