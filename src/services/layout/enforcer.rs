//! Default-layout invariant enforcer.
//!
//! Guarantees that at most one layout per (organization, environment)
//! scope carries the default flag, across concurrent creates and
//! promotions. The store owns the transaction boundary; this layer owns
//! the error taxonomy and the bounded retry on transient conflicts.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::store::{LayoutStore, StoreError};
use crate::error::ApiError;
use crate::models::layout::{LayoutRecord, NewLayout, ScopeKey};

/// Retry budget for promotions that lose a race. Past this the caller
/// gets a conflict and decides whether to retry.
const MAX_PROMOTE_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct DefaultLayoutEnforcer {
    store: Arc<dyn LayoutStore>,
}

impl DefaultLayoutEnforcer {
    pub fn new(store: Arc<dyn LayoutStore>) -> Self {
        Self { store }
    }

    /// Promote `candidate` to the scope default, demoting the current
    /// default in the same atomic unit.
    ///
    /// Fails with `ScopeNotFound` when the scope has no layouts at all,
    /// `CandidateNotFound` when the candidate is not a member of the
    /// scope, and `Conflict` when competing promotions exhaust the
    /// retry budget.
    pub async fn promote(
        &self,
        scope: &ScopeKey,
        candidate: Uuid,
    ) -> Result<LayoutRecord, ApiError> {
        if self.store.count_by_scope(scope).await? == 0 {
            return Err(ApiError::ScopeNotFound(*scope));
        }

        for attempt in 1..=MAX_PROMOTE_ATTEMPTS {
            match self.store.promote_default(scope, candidate).await {
                Ok(record) => {
                    debug!(
                        layout_id = %candidate,
                        organization_id = %scope.organization_id,
                        environment_id = %scope.environment_id,
                        "Layout promoted to scope default"
                    );
                    return Ok(record);
                }
                Err(StoreError::NotFound) => {
                    return Err(ApiError::CandidateNotFound(candidate));
                }
                Err(StoreError::Conflict) => {
                    warn!(
                        layout_id = %candidate,
                        attempt,
                        "Concurrent default promotion detected, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ApiError::Conflict)
    }

    /// Persist a new layout, promoting it to scope default inside the
    /// insert's atomic unit when requested.
    ///
    /// A non-default create never touches sibling records: a scope with
    /// zero defaults stays at zero defaults.
    pub async fn create_with_default(&self, layout: NewLayout) -> Result<LayoutRecord, ApiError> {
        if !layout.is_default {
            return Ok(self.store.insert(layout).await?);
        }

        for attempt in 1..=MAX_PROMOTE_ATTEMPTS {
            match self.store.insert_as_default(layout.clone()).await {
                Ok(record) => return Ok(record),
                Err(StoreError::Conflict) => {
                    warn!(
                        layout_name = %layout.name,
                        attempt,
                        "Concurrent default creation detected, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ApiError::Conflict)
    }
}
