//! Audit logging helpers for admin operations.
//!
//! Audit writes are best-effort: a failing sink is logged and discarded so
//! it never blocks or rolls back the operation being audited.

use crate::models::{AuditAction, CreateAuditEntry, FieldChange};
use crate::store::AuditSink;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

/// Builder for creating audit log entries with a fluent API.
#[derive(Debug, Clone)]
pub struct AuditLogBuilder {
    input: CreateAuditEntry,
}

impl AuditLogBuilder {
    /// Create a builder for an action performed by `user_id`, if known.
    pub fn user_action(user_id: Option<Uuid>, action: AuditAction) -> Self {
        let mut input = CreateAuditEntry::new(action);
        input.user_id = user_id;
        Self { input }
    }

    /// Set the id of the resource being acted upon.
    pub fn on_resource(mut self, resource_id: impl Into<String>) -> Self {
        self.input.resource_id = Some(resource_id.into());
        self
    }

    /// Add a single field change with JSON values.
    pub fn with_json_change(
        mut self,
        field: impl Into<String>,
        old: Option<serde_json::Value>,
        new: Option<serde_json::Value>,
    ) -> Self {
        let changes = self.input.changes.get_or_insert_with(HashMap::new);
        changes.insert(field.into(), FieldChange::new(old, new));
        self
    }

    /// Attach free-form details.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.input.details = Some(details);
        self
    }

    /// Mark the audited operation as failed.
    pub fn failed(mut self) -> Self {
        self.input.success = false;
        self
    }

    pub fn build(self) -> CreateAuditEntry {
        self.input
    }
}

/// Write an audit entry, logging and discarding any sink failure.
pub async fn record_best_effort(sink: &dyn AuditSink, input: CreateAuditEntry) {
    let entry = input.into_entry();
    if let Err(err) = sink.record(&entry).await {
        tracing::warn!(
            action = %entry.action,
            resource_id = ?entry.resource_id,
            error = %err,
            "Failed to write audit log entry"
        );
    }
}

/// Convenience functions for common audit log patterns.
pub mod audit_helpers {
    use super::*;

    pub fn setting_changed(
        action: AuditAction,
        user_id: Option<Uuid>,
        key: &str,
        old: Option<serde_json::Value>,
        new: Option<serde_json::Value>,
    ) -> CreateAuditEntry {
        AuditLogBuilder::user_action(user_id, action)
            .on_resource(key)
            .with_json_change("value", old, new)
            .build()
    }

    pub fn content_version(
        action: AuditAction,
        user_id: Option<Uuid>,
        element_id: &str,
        version_id: Uuid,
        version_number: i32,
    ) -> CreateAuditEntry {
        AuditLogBuilder::user_action(user_id, action)
            .on_resource(element_id)
            .with_details(json!({
                "versionId": version_id,
                "versionNumber": version_number,
            }))
            .build()
    }

    pub fn media_event(
        action: AuditAction,
        user_id: Option<Uuid>,
        media_id: Uuid,
        details: serde_json::Value,
    ) -> CreateAuditEntry {
        AuditLogBuilder::user_action(user_id, action)
            .on_resource(media_id.to_string())
            .with_details(details)
            .build()
    }
}
