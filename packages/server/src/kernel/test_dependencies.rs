// TestDependencies - mock implementations for testing
//
// Provides sinks that can be injected into effects in tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::traits::{AuditEvent, BaseAuditSink};

// =============================================================================
// Recording Audit Sink
// =============================================================================

/// Captures every audit event so tests can assert on what was emitted.
#[derive(Default)]
pub struct RecordingAuditSink {
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl RecordingAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, in emission order.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Whether an event with the given action was recorded for the entity.
    pub fn recorded(&self, action: &str, entity_id: uuid::Uuid) -> bool {
        self.events
            .lock()
            .unwrap()
            .iter()
            .any(|e| e.action == action && e.entity_id == entity_id)
    }
}

#[async_trait]
impl BaseAuditSink for RecordingAuditSink {
    async fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A sink whose writes always fail internally. It still upholds the
/// non-propagating contract, so operations using it must succeed.
pub struct FailingAuditSink;

#[async_trait]
impl BaseAuditSink for FailingAuditSink {
    async fn record(&self, event: AuditEvent) {
        tracing::warn!(
            action = %event.action,
            entity_id = %event.entity_id,
            "FailingAuditSink dropped audit event (simulated sink outage)"
        );
    }
}
