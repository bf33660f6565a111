// Lifecycle operations for establishments.
//
// Each mutation follows the same shape: fetch, let the machine decide,
// execute one atomic compare-and-set statement, then emit an audit event.
// The CAS is the only concurrency control; the loser of a race gets
// StaleState and must re-fetch (the core never retries on its own).

use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use sqlx::PgPool;
use std::collections::HashMap;

use crate::common::{
    DirectoryError, DirectoryResult, EstablishmentId, ModeratorId, Page, PageRequest, PartnerId,
};
use crate::domains::establishments::machines::{decide, Actor, LifecycleAction};
use crate::domains::establishments::models::establishment::{Establishment, EstablishmentStatus};
use crate::domains::establishments::models::inputs::{EstablishmentPatch, NewEstablishment};
use crate::kernel::traits::{AuditEvent, BaseAuditSink};

/// Moderator verdict on a pending listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approve,
    Reject,
}

/// Create a listing in draft. The insert and the initial status are one
/// statement.
pub async fn create_establishment(
    partner_id: PartnerId,
    input: NewEstablishment,
    audit: &dyn BaseAuditSink,
    pool: &PgPool,
) -> DirectoryResult<Establishment> {
    let input = input.validated()?;

    let establishment = Establishment::create(
        EstablishmentId::new(),
        partner_id,
        input.name,
        input.description,
        input.city,
        input.address,
        input.latitude,
        input.longitude,
        input.categories,
        input.cuisines,
        input.price_range,
        input.working_hours.unwrap_or_else(|| json!({})),
        input.special_hours,
        input.attributes.unwrap_or_else(|| json!({})),
        pool,
    )
    .await?;

    audit
        .record(AuditEvent {
            actor_id: partner_id.into_uuid(),
            action: "establishment.create".to_string(),
            entity_id: establishment.id.into_uuid(),
            old_snapshot: JsonValue::Null,
            new_snapshot: snapshot(&establishment),
        })
        .await;

    Ok(establishment)
}

/// Partial field update by the owning partner, allowed in draft and
/// rejected only. Cannot touch status.
pub async fn update_establishment(
    id: EstablishmentId,
    partner_id: PartnerId,
    patch: EstablishmentPatch,
    audit: &dyn BaseAuditSink,
    pool: &PgPool,
) -> DirectoryResult<Establishment> {
    let patch = patch.validated()?;

    let current = Establishment::find_by_id(id, pool)
        .await?
        .ok_or(DirectoryError::NotFound)?;

    if current.partner_id != partner_id {
        return Err(DirectoryError::Forbidden(
            "only the owning partner may edit a listing".to_string(),
        ));
    }

    let status = current.current_status()?;
    if !matches!(
        status,
        EstablishmentStatus::Draft | EstablishmentStatus::Rejected
    ) {
        return Err(DirectoryError::IllegalTransition {
            from: status.to_string(),
            action: "update".to_string(),
        });
    }

    let row = Establishment::update_fields(
        id,
        status.as_str(),
        patch.name,
        patch.description,
        patch.city,
        patch.address,
        patch.latitude,
        patch.longitude,
        patch.categories,
        patch.cuisines,
        patch.price_range,
        patch.working_hours,
        patch.special_hours,
        patch.attributes,
        pool,
    )
    .await?;
    let updated = cas_outcome(row, id, pool).await?;

    audit
        .record(AuditEvent {
            actor_id: partner_id.into_uuid(),
            action: "establishment.update".to_string(),
            entity_id: id.into_uuid(),
            old_snapshot: snapshot(&current),
            new_snapshot: snapshot(&updated),
        })
        .await;

    Ok(updated)
}

/// draft|rejected -> pending by the owning partner. Requires the listing to
/// be submission-complete; on resubmission the old moderation notes move to
/// the history list.
pub async fn submit_for_moderation(
    id: EstablishmentId,
    partner_id: PartnerId,
    audit: &dyn BaseAuditSink,
    pool: &PgPool,
) -> DirectoryResult<Establishment> {
    let current = Establishment::find_by_id(id, pool)
        .await?
        .ok_or(DirectoryError::NotFound)?;

    let actor = Actor::Partner(partner_id);
    decide(&current, LifecycleAction::Submit, &actor)?;

    let row = Establishment::mark_pending(id, &current.status, pool).await?;
    let updated = cas_outcome(row, id, pool).await?;

    record_transition(audit, &actor, LifecycleAction::Submit, &current, &updated).await;

    Ok(updated)
}

/// pending -> active|rejected by a moderator. Rejection without at least
/// one per-field note is a validation error.
pub async fn moderate(
    id: EstablishmentId,
    moderator_id: ModeratorId,
    action: ModerationAction,
    notes: HashMap<String, String>,
    audit: &dyn BaseAuditSink,
    pool: &PgPool,
) -> DirectoryResult<Establishment> {
    if action == ModerationAction::Reject && notes.is_empty() {
        return Err(DirectoryError::validation(
            "rejection requires at least one moderation note",
        ));
    }

    let current = Establishment::find_by_id(id, pool)
        .await?
        .ok_or(DirectoryError::NotFound)?;

    let actor = Actor::Moderator(moderator_id);
    let lifecycle_action = match action {
        ModerationAction::Approve => LifecycleAction::Approve,
        ModerationAction::Reject => LifecycleAction::Reject,
    };
    let target = decide(&current, lifecycle_action, &actor)?;

    let notes_json = serde_json::to_value(&notes).map_err(anyhow::Error::from)?;
    let row =
        Establishment::mark_moderated(id, target.as_str(), moderator_id, &notes_json, pool).await?;
    let updated = cas_outcome(row, id, pool).await?;

    record_transition(audit, &actor, lifecycle_action, &current, &updated).await;

    Ok(updated)
}

/// active -> suspended by a moderator or the owning partner, with a
/// mandatory reason.
pub async fn suspend(
    id: EstablishmentId,
    actor: Actor,
    reason: String,
    audit: &dyn BaseAuditSink,
    pool: &PgPool,
) -> DirectoryResult<Establishment> {
    if reason.trim().is_empty() {
        return Err(DirectoryError::validation("a suspension reason is required"));
    }

    let current = Establishment::find_by_id(id, pool)
        .await?
        .ok_or(DirectoryError::NotFound)?;

    decide(&current, LifecycleAction::Suspend, &actor)?;

    let row = Establishment::mark_suspended(id, reason.trim(), pool).await?;
    let updated = cas_outcome(row, id, pool).await?;

    record_transition(audit, &actor, LifecycleAction::Suspend, &current, &updated).await;

    Ok(updated)
}

/// suspended -> active by a moderator or the owning partner.
pub async fn unsuspend(
    id: EstablishmentId,
    actor: Actor,
    audit: &dyn BaseAuditSink,
    pool: &PgPool,
) -> DirectoryResult<Establishment> {
    let current = Establishment::find_by_id(id, pool)
        .await?
        .ok_or(DirectoryError::NotFound)?;

    decide(&current, LifecycleAction::Unsuspend, &actor)?;

    let row = Establishment::mark_unsuspended(id, pool).await?;
    let updated = cas_outcome(row, id, pool).await?;

    record_transition(audit, &actor, LifecycleAction::Unsuspend, &current, &updated).await;

    Ok(updated)
}

/// any live state -> archived, by a moderator. Soft tombstone; there is no
/// hard delete.
pub async fn archive(
    id: EstablishmentId,
    moderator_id: ModeratorId,
    audit: &dyn BaseAuditSink,
    pool: &PgPool,
) -> DirectoryResult<Establishment> {
    let current = Establishment::find_by_id(id, pool)
        .await?
        .ok_or(DirectoryError::NotFound)?;

    let actor = Actor::Moderator(moderator_id);
    decide(&current, LifecycleAction::Archive, &actor)?;

    let row = Establishment::mark_archived(id, &current.status, pool).await?;
    let updated = cas_outcome(row, id, pool).await?;

    record_transition(audit, &actor, LifecycleAction::Archive, &current, &updated).await;

    Ok(updated)
}

/// Public read. Archived listings resolve as NotFound.
pub async fn get_establishment(
    id: EstablishmentId,
    pool: &PgPool,
) -> DirectoryResult<Establishment> {
    let establishment = Establishment::find_by_id(id, pool)
        .await?
        .ok_or(DirectoryError::NotFound)?;

    if establishment.current_status()? == EstablishmentStatus::Archived {
        return Err(DirectoryError::NotFound);
    }

    Ok(establishment)
}

/// A partner's own listings across all live states, newest first.
pub async fn list_by_partner(
    partner_id: PartnerId,
    page: PageRequest,
    pool: &PgPool,
) -> DirectoryResult<Page<Establishment>> {
    let items = Establishment::find_by_partner(partner_id, page.limit, page.offset, pool).await?;
    let total = Establishment::count_by_partner(partner_id, pool).await?;
    let has_more = page.offset + (items.len() as i64) < total;
    Ok(Page {
        items,
        total,
        has_more,
    })
}

/// The moderation queue, oldest submission first.
pub async fn list_pending_moderation(
    page: PageRequest,
    pool: &PgPool,
) -> DirectoryResult<Page<Establishment>> {
    let items = Establishment::find_pending(page.limit, page.offset, pool).await?;
    let total = Establishment::count_pending(pool).await?;
    let has_more = page.offset + (items.len() as i64) < total;
    Ok(Page {
        items,
        total,
        has_more,
    })
}

// =============================================================================
// Helpers
// =============================================================================

/// Snapshot of the mutable fields, used for audit old/new pairs.
fn snapshot(establishment: &Establishment) -> JsonValue {
    json!({
        "status": establishment.status,
        "name": establishment.name,
        "description": establishment.description,
        "city": establishment.city,
        "address": establishment.address,
        "latitude": establishment.latitude,
        "longitude": establishment.longitude,
        "categories": establishment.categories,
        "cuisines": establishment.cuisines,
        "price_range": establishment.price_range,
        "moderation_notes": establishment.moderation_notes,
        "suspension_reason": establishment.suspension_reason,
        "published_at": establishment.published_at,
    })
}

async fn record_transition(
    audit: &dyn BaseAuditSink,
    actor: &Actor,
    action: LifecycleAction,
    old: &Establishment,
    new: &Establishment,
) {
    audit
        .record(AuditEvent {
            actor_id: actor.id(),
            action: format!("establishment.{action}"),
            entity_id: new.id.into_uuid(),
            old_snapshot: snapshot(old),
            new_snapshot: snapshot(new),
        })
        .await;
}

/// Distinguishes the two reasons a compare-and-set can match zero rows.
/// The record was just fetched, so a miss almost always means a lost race.
async fn cas_outcome(
    row: Option<Establishment>,
    id: EstablishmentId,
    pool: &PgPool,
) -> DirectoryResult<Establishment> {
    match row {
        Some(establishment) => Ok(establishment),
        None => match Establishment::find_by_id(id, pool).await? {
            Some(_) => Err(DirectoryError::StaleState),
            None => Err(DirectoryError::NotFound),
        },
    }
}
