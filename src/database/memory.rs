//! In-memory layout store.
//!
//! Backs the service when `TEST_MODE` is set and the tests. A single
//! `RwLock` over the record list gives the same atomicity the Postgres
//! backend gets from its transactions: readers never observe a
//! half-finished default swap. Records keep insertion order, which is
//! also creation order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::store::{LayoutStore, StoreError};
use crate::models::layout::{LayoutRecord, NewLayout, ScopeKey};

#[derive(Clone, Default)]
pub struct InMemoryLayoutStore {
    records: Arc<RwLock<Vec<LayoutRecord>>>,
}

impl InMemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn materialize(layout: NewLayout, is_default: bool) -> LayoutRecord {
        let now = Utc::now();
        LayoutRecord {
            id: Uuid::new_v4(),
            scope: layout.scope,
            name: layout.name,
            description: layout.description,
            content: layout.content,
            variables: layout.variables,
            is_default,
            created_at: now,
            updated_at: now,
        }
    }
}

#[async_trait]
impl LayoutStore for InMemoryLayoutStore {
    async fn get(&self, id: Uuid) -> Result<Option<LayoutRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn list_by_scope(&self, scope: &ScopeKey) -> Result<Vec<LayoutRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.scope == *scope)
            .cloned()
            .collect())
    }

    async fn count_by_scope(&self, scope: &ScopeKey) -> Result<i64, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|record| record.scope == *scope)
            .count() as i64)
    }

    async fn insert(&self, layout: NewLayout) -> Result<LayoutRecord, StoreError> {
        let record = Self::materialize(layout, false);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn insert_as_default(&self, layout: NewLayout) -> Result<LayoutRecord, StoreError> {
        let record = Self::materialize(layout, true);
        let mut records = self.records.write().await;
        for existing in records.iter_mut() {
            if existing.scope == record.scope && existing.is_default {
                existing.is_default = false;
                existing.updated_at = record.updated_at;
            }
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn promote_default(
        &self,
        scope: &ScopeKey,
        candidate: Uuid,
    ) -> Result<LayoutRecord, StoreError> {
        let mut records = self.records.write().await;

        if !records
            .iter()
            .any(|record| record.id == candidate && record.scope == *scope)
        {
            return Err(StoreError::NotFound);
        }

        let now = Utc::now();
        for existing in records.iter_mut() {
            if existing.scope == *scope && existing.is_default && existing.id != candidate {
                existing.is_default = false;
                existing.updated_at = now;
            }
        }

        let record = records
            .iter_mut()
            .find(|record| record.id == candidate)
            .ok_or(StoreError::NotFound)?;
        record.is_default = true;
        record.updated_at = now;
        Ok(record.clone())
    }
}
