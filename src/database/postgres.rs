//! PostgreSQL-backed layout store.
//!
//! Multi-row default-flag operations run inside a transaction with
//! `FOR UPDATE` row locks on the scope partition, so concurrent
//! promotions for the same scope serialize on the locked rows. The
//! partial unique index on `(organization_id, environment_id) WHERE
//! is_default` backs the exclusivity invariant at the storage layer;
//! violations surface as `StoreError::Conflict` and are retried by the
//! enforcer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::store::{LayoutStore, StoreError};
use crate::models::layout::{LayoutContent, LayoutRecord, NewLayout, ScopeKey, TemplateVariable};

const LAYOUT_COLUMNS: &str = "id, organization_id, environment_id, name, description, \
     content, variables, is_default, created_at, updated_at";

#[derive(Clone)]
pub struct PgLayoutStore {
    db: PgPool,
}

impl PgLayoutStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Raw row shape; content and variables live in JSONB columns.
#[derive(sqlx::FromRow)]
struct LayoutRow {
    id: Uuid,
    organization_id: Uuid,
    environment_id: Uuid,
    name: String,
    description: Option<String>,
    content: serde_json::Value,
    variables: serde_json::Value,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LayoutRow> for LayoutRecord {
    type Error = StoreError;

    fn try_from(row: LayoutRow) -> Result<Self, Self::Error> {
        let content: LayoutContent = serde_json::from_value(row.content).map_err(decode_err)?;
        let variables: Vec<TemplateVariable> =
            serde_json::from_value(row.variables).map_err(decode_err)?;
        Ok(LayoutRecord {
            id: row.id,
            scope: ScopeKey::new(row.organization_id, row.environment_id),
            name: row.name,
            description: row.description,
            content,
            variables,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn decode_err(err: serde_json::Error) -> StoreError {
    StoreError::Database(sqlx::Error::Decode(Box::new(err)))
}

fn map_db_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            // serialization_failure, deadlock_detected, or the partial
            // unique index on the default flag: all transient races.
            Some("40001") | Some("40P01") | Some("23505") => return StoreError::Conflict,
            _ => {}
        }
    }
    StoreError::Database(err)
}

fn encode_content(content: &LayoutContent) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(content)
        .map_err(|e| StoreError::Database(sqlx::Error::Encode(Box::new(e))))
}

fn encode_variables(variables: &[TemplateVariable]) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(variables)
        .map_err(|e| StoreError::Database(sqlx::Error::Encode(Box::new(e))))
}

#[async_trait]
impl LayoutStore for PgLayoutStore {
    async fn get(&self, id: Uuid) -> Result<Option<LayoutRecord>, StoreError> {
        let row = sqlx::query_as::<_, LayoutRow>(&format!(
            "SELECT {LAYOUT_COLUMNS} FROM layouts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(map_db_err)?;

        row.map(LayoutRecord::try_from).transpose()
    }

    async fn list_by_scope(&self, scope: &ScopeKey) -> Result<Vec<LayoutRecord>, StoreError> {
        let rows = sqlx::query_as::<_, LayoutRow>(&format!(
            "SELECT {LAYOUT_COLUMNS} FROM layouts \
             WHERE organization_id = $1 AND environment_id = $2 \
             ORDER BY created_at ASC"
        ))
        .bind(scope.organization_id)
        .bind(scope.environment_id)
        .fetch_all(&self.db)
        .await
        .map_err(map_db_err)?;

        rows.into_iter().map(LayoutRecord::try_from).collect()
    }

    async fn count_by_scope(&self, scope: &ScopeKey) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM layouts WHERE organization_id = $1 AND environment_id = $2",
        )
        .bind(scope.organization_id)
        .bind(scope.environment_id)
        .fetch_one(&self.db)
        .await
        .map_err(map_db_err)?;

        Ok(count)
    }

    async fn insert(&self, layout: NewLayout) -> Result<LayoutRecord, StoreError> {
        let row = sqlx::query_as::<_, LayoutRow>(&format!(
            "INSERT INTO layouts (organization_id, environment_id, name, description, \
                                  content, variables, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, false) \
             RETURNING {LAYOUT_COLUMNS}"
        ))
        .bind(layout.scope.organization_id)
        .bind(layout.scope.environment_id)
        .bind(&layout.name)
        .bind(&layout.description)
        .bind(encode_content(&layout.content)?)
        .bind(encode_variables(&layout.variables)?)
        .fetch_one(&self.db)
        .await
        .map_err(map_db_err)?;

        row.try_into()
    }

    async fn insert_as_default(&self, layout: NewLayout) -> Result<LayoutRecord, StoreError> {
        let mut tx = self.db.begin().await.map_err(map_db_err)?;

        // Lock the scope's current default rows before demoting them so
        // a competing promotion cannot interleave.
        sqlx::query(
            "UPDATE layouts SET is_default = false, updated_at = now() \
             WHERE id IN (SELECT id FROM layouts \
                          WHERE organization_id = $1 AND environment_id = $2 \
                            AND is_default = true FOR UPDATE)",
        )
        .bind(layout.scope.organization_id)
        .bind(layout.scope.environment_id)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        let row = sqlx::query_as::<_, LayoutRow>(&format!(
            "INSERT INTO layouts (organization_id, environment_id, name, description, \
                                  content, variables, is_default) \
             VALUES ($1, $2, $3, $4, $5, $6, true) \
             RETURNING {LAYOUT_COLUMNS}"
        ))
        .bind(layout.scope.organization_id)
        .bind(layout.scope.environment_id)
        .bind(&layout.name)
        .bind(&layout.description)
        .bind(encode_content(&layout.content)?)
        .bind(encode_variables(&layout.variables)?)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        row.try_into()
    }

    async fn promote_default(
        &self,
        scope: &ScopeKey,
        candidate: Uuid,
    ) -> Result<LayoutRecord, StoreError> {
        let mut tx = self.db.begin().await.map_err(map_db_err)?;

        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM layouts \
             WHERE id = $1 AND organization_id = $2 AND environment_id = $3 FOR UPDATE",
        )
        .bind(candidate)
        .bind(scope.organization_id)
        .bind(scope.environment_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_err)?;

        if locked.is_none() {
            return Err(StoreError::NotFound);
        }

        sqlx::query(
            "UPDATE layouts SET is_default = false, updated_at = now() \
             WHERE id IN (SELECT id FROM layouts \
                          WHERE organization_id = $1 AND environment_id = $2 \
                            AND is_default = true AND id <> $3 FOR UPDATE)",
        )
        .bind(scope.organization_id)
        .bind(scope.environment_id)
        .bind(candidate)
        .execute(&mut *tx)
        .await
        .map_err(map_db_err)?;

        let row = sqlx::query_as::<_, LayoutRow>(&format!(
            "UPDATE layouts SET is_default = true, updated_at = now() \
             WHERE id = $1 RETURNING {LAYOUT_COLUMNS}"
        ))
        .bind(candidate)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        row.try_into()
    }
}
