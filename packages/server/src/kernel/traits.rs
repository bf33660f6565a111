// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Naming convention: Base* for trait names (e.g., BaseAuditSink)

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// One recorded lifecycle mutation: who did what to which entity, with a
/// snapshot of the mutated fields before and after.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub actor_id: Uuid,
    pub action: String,
    pub entity_id: Uuid,
    pub old_snapshot: JsonValue,
    pub new_snapshot: JsonValue,
}

// =============================================================================
// Audit Sink Trait (Infrastructure - accountability side channel)
// =============================================================================

/// Fire-and-forget recorder of lifecycle mutations.
///
/// The contract is non-propagating: `record` never returns an error, and the
/// core calls it only after the primary write has committed. Implementations
/// swallow and log their own failures; a broken sink must never fail or roll
/// back the operation that triggered it.
#[async_trait]
pub trait BaseAuditSink: Send + Sync {
    async fn record(&self, event: AuditEvent);
}
