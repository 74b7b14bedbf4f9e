//! Audit log repository.

use async_trait::async_trait;
use domain::error::StoreResult;
use domain::models::AuditEntry;
use domain::store::AuditSink;
use sqlx::PgPool;

use super::store_error;
use crate::metrics::QueryTimer;

/// Append-only writer for the audit_logs table.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for AuditLogRepository {
    async fn record(&self, entry: &AuditEntry) -> StoreResult<()> {
        let timer = QueryTimer::new("insert_audit_log");
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (id, user_id, action, resource_type, resource_id,
                                    details, success, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(&entry.resource_id)
        .bind(&entry.details)
        .bind(entry.success)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map_err(store_error)?;
        Ok(())
    }
}
