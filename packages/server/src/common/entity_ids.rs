//! Typed ID definitions for the directory's domain entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for establishment listings.
pub struct EstablishmentEntity;

/// Marker type for partner accounts (listing owners).
pub struct PartnerEntity;

/// Marker type for moderator accounts.
pub struct ModeratorEntity;

/// Marker type for audit events.
pub struct AuditEventEntity;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for establishments.
pub type EstablishmentId = Id<EstablishmentEntity>;

/// Typed ID for partners.
pub type PartnerId = Id<PartnerEntity>;

/// Typed ID for moderators.
pub type ModeratorId = Id<ModeratorEntity>;

/// Typed ID for audit events.
pub type AuditEventId = Id<AuditEventEntity>;
