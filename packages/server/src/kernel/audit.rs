//! Audit sink implementations.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::common::AuditEventId;
use crate::kernel::traits::{AuditEvent, BaseAuditSink};

/// Appends audit events to the `audit_events` table.
///
/// Write failures are logged and swallowed; the primary operation has
/// already committed by the time this runs.
pub struct PgAuditSink {
    pool: PgPool,
}

impl PgAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseAuditSink for PgAuditSink {
    async fn record(&self, event: AuditEvent) {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_events (id, actor_id, action, entity_id, old_snapshot, new_snapshot)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(AuditEventId::new())
        .bind(event.actor_id)
        .bind(&event.action)
        .bind(event.entity_id)
        .bind(&event.old_snapshot)
        .bind(&event.new_snapshot)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(
                action = %event.action,
                entity_id = %event.entity_id,
                error = %e,
                "Failed to record audit event"
            );
        }
    }
}

/// Emits audit events as structured log lines only. Used where no audit
/// store is available (local development, some tests).
pub struct LoggingAuditSink;

#[async_trait]
impl BaseAuditSink for LoggingAuditSink {
    async fn record(&self, event: AuditEvent) {
        tracing::info!(
            actor_id = %event.actor_id,
            action = %event.action,
            entity_id = %event.entity_id,
            "audit"
        );
    }
}
