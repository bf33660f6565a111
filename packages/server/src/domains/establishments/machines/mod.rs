//! Establishment lifecycle state machine.
//!
//! Pure decision logic - NO IO. The transition table below is the single
//! place status legality is derived; effects execute whatever `decide`
//! returns with one atomic compare-and-set statement.

use uuid::Uuid;

use crate::common::{geo, DirectoryError, DirectoryResult, ModeratorId, PartnerId};
use crate::domains::establishments::models::establishment::{Establishment, EstablishmentStatus};

/// The named status-changing operations. The generic field-update path is
/// deliberately not an action: it can never touch `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Submit,
    Approve,
    Reject,
    Suspend,
    Unsuspend,
    Archive,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Submit => "submit",
            LifecycleAction::Approve => "approve",
            LifecycleAction::Reject => "reject",
            LifecycleAction::Suspend => "suspend",
            LifecycleAction::Unsuspend => "unsuspend",
            LifecycleAction::Archive => "archive",
        }
    }
}

impl std::fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is asking for a mutation. Identity is established upstream; the core
/// only checks it against ownership and the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Partner(PartnerId),
    Moderator(ModeratorId),
}

impl Actor {
    pub fn id(&self) -> Uuid {
        match self {
            Actor::Partner(id) => id.into_uuid(),
            Actor::Moderator(id) => id.into_uuid(),
        }
    }
}

/// Who may perform a given transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRule {
    Owner,
    Moderator,
    OwnerOrModerator,
}

/// (from, action) -> (to, who may do it). Anything absent is illegal.
const TRANSITIONS: &[(
    EstablishmentStatus,
    LifecycleAction,
    EstablishmentStatus,
    ActorRule,
)] = &[
    (
        EstablishmentStatus::Draft,
        LifecycleAction::Submit,
        EstablishmentStatus::Pending,
        ActorRule::Owner,
    ),
    (
        EstablishmentStatus::Rejected,
        LifecycleAction::Submit,
        EstablishmentStatus::Pending,
        ActorRule::Owner,
    ),
    (
        EstablishmentStatus::Pending,
        LifecycleAction::Approve,
        EstablishmentStatus::Active,
        ActorRule::Moderator,
    ),
    (
        EstablishmentStatus::Pending,
        LifecycleAction::Reject,
        EstablishmentStatus::Rejected,
        ActorRule::Moderator,
    ),
    (
        EstablishmentStatus::Active,
        LifecycleAction::Suspend,
        EstablishmentStatus::Suspended,
        ActorRule::OwnerOrModerator,
    ),
    (
        EstablishmentStatus::Suspended,
        LifecycleAction::Unsuspend,
        EstablishmentStatus::Active,
        ActorRule::OwnerOrModerator,
    ),
    (
        EstablishmentStatus::Draft,
        LifecycleAction::Archive,
        EstablishmentStatus::Archived,
        ActorRule::Moderator,
    ),
    (
        EstablishmentStatus::Pending,
        LifecycleAction::Archive,
        EstablishmentStatus::Archived,
        ActorRule::Moderator,
    ),
    (
        EstablishmentStatus::Active,
        LifecycleAction::Archive,
        EstablishmentStatus::Archived,
        ActorRule::Moderator,
    ),
    (
        EstablishmentStatus::Suspended,
        LifecycleAction::Archive,
        EstablishmentStatus::Archived,
        ActorRule::Moderator,
    ),
    (
        EstablishmentStatus::Rejected,
        LifecycleAction::Archive,
        EstablishmentStatus::Archived,
        ActorRule::Moderator,
    ),
];

/// Look up the transition table. `None` means the pair is illegal.
pub fn target_status(
    from: EstablishmentStatus,
    action: LifecycleAction,
) -> Option<(EstablishmentStatus, ActorRule)> {
    TRANSITIONS
        .iter()
        .find(|(f, a, _, _)| *f == from && *a == action)
        .map(|(_, _, to, rule)| (*to, *rule))
}

/// Decide whether `actor` may apply `action` to `establishment`, and what
/// the target status is.
///
/// Checks, in order: the transition table (`IllegalTransition`), the actor
/// rule (`Forbidden`), then the action's precondition on entity state
/// (`ValidationError`). Performs no writes.
pub fn decide(
    establishment: &Establishment,
    action: LifecycleAction,
    actor: &Actor,
) -> DirectoryResult<EstablishmentStatus> {
    let from = establishment.current_status()?;

    let Some((to, rule)) = target_status(from, action) else {
        return Err(DirectoryError::IllegalTransition {
            from: from.to_string(),
            action: action.to_string(),
        });
    };

    authorize(rule, actor, establishment.partner_id)?;

    if action == LifecycleAction::Submit {
        submission_complete(establishment)?;
    }

    Ok(to)
}

fn authorize(rule: ActorRule, actor: &Actor, owner: PartnerId) -> DirectoryResult<()> {
    let allowed = match rule {
        ActorRule::Owner => matches!(actor, Actor::Partner(id) if *id == owner),
        ActorRule::Moderator => matches!(actor, Actor::Moderator(_)),
        ActorRule::OwnerOrModerator => match actor {
            Actor::Partner(id) => *id == owner,
            Actor::Moderator(_) => true,
        },
    };

    if allowed {
        Ok(())
    } else {
        let needed = match rule {
            ActorRule::Owner => "the owning partner",
            ActorRule::Moderator => "a moderator",
            ActorRule::OwnerOrModerator => "the owning partner or a moderator",
        };
        Err(DirectoryError::Forbidden(format!(
            "this operation requires {needed}"
        )))
    }
}

/// The fields a listing must carry before it can leave draft (or be
/// resubmitted after rejection).
pub fn submission_complete(establishment: &Establishment) -> DirectoryResult<()> {
    let mut missing: Vec<&str> = Vec::new();

    if establishment.name.trim().is_empty() {
        missing.push("name");
    }
    if establishment.city.trim().is_empty() {
        missing.push("city");
    }
    if establishment
        .address
        .as_deref()
        .map(|a| a.trim().is_empty())
        .unwrap_or(true)
    {
        missing.push("address");
    }
    match (establishment.latitude, establishment.longitude) {
        (Some(lat), Some(lon)) if geo::in_region(lat, lon) => {}
        _ => missing.push("coordinates"),
    }
    if establishment.categories.is_empty() {
        missing.push("categories");
    }
    if establishment.cuisines.is_empty() {
        missing.push("cuisines");
    }
    if !establishment
        .working_hours
        .as_object()
        .map(|map| !map.is_empty())
        .unwrap_or(false)
    {
        missing.push("working_hours");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DirectoryError::Validation(format!(
            "not ready for moderation, missing or invalid: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    use crate::common::EstablishmentId;

    fn establishment(status: EstablishmentStatus, owner: PartnerId) -> Establishment {
        Establishment {
            id: EstablishmentId::new(),
            partner_id: owner,
            name: "Lyavon".to_string(),
            description: None,
            city: "minsk".to_string(),
            address: Some("pl. Svabody 4".to_string()),
            latitude: Some(53.9036),
            longitude: Some(27.5563),
            categories: vec!["cafe".to_string()],
            cuisines: vec!["belarusian".to_string()],
            price_range: "budget".to_string(),
            working_hours: json!({"monday": {"open": "09:00", "close": "21:00"}}),
            special_hours: None,
            attributes: json!({}),
            status: status.to_string(),
            moderation_notes: json!({}),
            moderation_note_history: json!([]),
            moderated_by: None,
            moderated_at: None,
            suspension_reason: None,
            view_count: 0,
            favorite_count: 0,
            review_count: 0,
            average_rating: 0.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            published_at: None,
        }
    }

    #[test]
    fn legal_transitions_reach_their_targets() {
        let owner = PartnerId::new();
        let partner = Actor::Partner(owner);
        let moderator = Actor::Moderator(ModeratorId::new());

        let cases = [
            (EstablishmentStatus::Draft, LifecycleAction::Submit, &partner, EstablishmentStatus::Pending),
            (EstablishmentStatus::Rejected, LifecycleAction::Submit, &partner, EstablishmentStatus::Pending),
            (EstablishmentStatus::Pending, LifecycleAction::Approve, &moderator, EstablishmentStatus::Active),
            (EstablishmentStatus::Pending, LifecycleAction::Reject, &moderator, EstablishmentStatus::Rejected),
            (EstablishmentStatus::Active, LifecycleAction::Suspend, &partner, EstablishmentStatus::Suspended),
            (EstablishmentStatus::Active, LifecycleAction::Suspend, &moderator, EstablishmentStatus::Suspended),
            (EstablishmentStatus::Suspended, LifecycleAction::Unsuspend, &partner, EstablishmentStatus::Active),
            (EstablishmentStatus::Rejected, LifecycleAction::Archive, &moderator, EstablishmentStatus::Archived),
        ];

        for (from, action, actor, expected) in cases {
            let est = establishment(from, owner);
            let to = decide(&est, action, actor)
                .unwrap_or_else(|e| panic!("{from} --{action}--> failed: {e}"));
            assert_eq!(to, expected);
        }
    }

    #[test]
    fn draft_cannot_go_straight_to_active() {
        let owner = PartnerId::new();
        let est = establishment(EstablishmentStatus::Draft, owner);
        let err = decide(&est, LifecycleAction::Approve, &Actor::Moderator(ModeratorId::new()))
            .unwrap_err();
        assert!(matches!(err, DirectoryError::IllegalTransition { .. }));
    }

    #[test]
    fn approve_requires_moderator() {
        let owner = PartnerId::new();
        let est = establishment(EstablishmentStatus::Pending, owner);
        let err = decide(&est, LifecycleAction::Approve, &Actor::Partner(owner)).unwrap_err();
        assert!(matches!(err, DirectoryError::Forbidden(_)));
    }

    #[test]
    fn submit_requires_owner() {
        let owner = PartnerId::new();
        let est = establishment(EstablishmentStatus::Draft, owner);

        let other = Actor::Partner(PartnerId::new());
        assert!(matches!(
            decide(&est, LifecycleAction::Submit, &other).unwrap_err(),
            DirectoryError::Forbidden(_)
        ));

        let moderator = Actor::Moderator(ModeratorId::new());
        assert!(matches!(
            decide(&est, LifecycleAction::Submit, &moderator).unwrap_err(),
            DirectoryError::Forbidden(_)
        ));
    }

    #[test]
    fn suspend_allows_owner_but_not_other_partners() {
        let owner = PartnerId::new();
        let est = establishment(EstablishmentStatus::Active, owner);

        assert!(decide(&est, LifecycleAction::Suspend, &Actor::Partner(owner)).is_ok());
        assert!(matches!(
            decide(&est, LifecycleAction::Suspend, &Actor::Partner(PartnerId::new())).unwrap_err(),
            DirectoryError::Forbidden(_)
        ));
    }

    #[test]
    fn archive_is_moderator_only_and_total_over_live_states() {
        let owner = PartnerId::new();
        let moderator = Actor::Moderator(ModeratorId::new());

        for from in [
            EstablishmentStatus::Draft,
            EstablishmentStatus::Pending,
            EstablishmentStatus::Active,
            EstablishmentStatus::Suspended,
            EstablishmentStatus::Rejected,
        ] {
            let est = establishment(from, owner);
            assert_eq!(
                decide(&est, LifecycleAction::Archive, &moderator).unwrap(),
                EstablishmentStatus::Archived
            );
            assert!(matches!(
                decide(&est, LifecycleAction::Archive, &Actor::Partner(owner)).unwrap_err(),
                DirectoryError::Forbidden(_)
            ));
        }
    }

    #[test]
    fn archived_is_terminal() {
        let owner = PartnerId::new();
        let est = establishment(EstablishmentStatus::Archived, owner);
        for action in [
            LifecycleAction::Submit,
            LifecycleAction::Approve,
            LifecycleAction::Reject,
            LifecycleAction::Suspend,
            LifecycleAction::Unsuspend,
            LifecycleAction::Archive,
        ] {
            let actor = Actor::Moderator(ModeratorId::new());
            assert!(matches!(
                decide(&est, action, &actor).unwrap_err(),
                DirectoryError::IllegalTransition { .. } | DirectoryError::Forbidden(_)
            ));
        }
    }

    #[test]
    fn submission_requires_complete_fields() {
        let owner = PartnerId::new();
        let partner = Actor::Partner(owner);

        let mut est = establishment(EstablishmentStatus::Draft, owner);
        est.address = None;
        assert!(matches!(
            decide(&est, LifecycleAction::Submit, &partner).unwrap_err(),
            DirectoryError::Validation(_)
        ));

        let mut est = establishment(EstablishmentStatus::Draft, owner);
        est.latitude = None;
        assert!(decide(&est, LifecycleAction::Submit, &partner).is_err());

        let mut est = establishment(EstablishmentStatus::Draft, owner);
        est.working_hours = json!({});
        assert!(decide(&est, LifecycleAction::Submit, &partner).is_err());

        // A complete draft passes.
        let est = establishment(EstablishmentStatus::Draft, owner);
        assert!(decide(&est, LifecycleAction::Submit, &partner).is_ok());
    }
}
