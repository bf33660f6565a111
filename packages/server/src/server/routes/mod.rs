pub mod establishments;
pub mod health;
pub mod search;

pub use establishments::{
    archive_handler, create_establishment_handler, get_establishment_handler,
    list_own_establishments_handler, moderate_handler, moderation_queue_handler, submit_handler,
    suspend_handler, unsuspend_handler, update_establishment_handler,
};
pub use health::health_handler;
pub use search::{bounds_search_handler, radius_search_handler};

use axum::http::HeaderMap;
use uuid::Uuid;

use crate::common::{DirectoryError, ModeratorId, PartnerId};
use crate::domains::establishments::machines::Actor;
use crate::server::error::ApiError;

// Actor identity is established by the upstream gateway and passed down in
// headers; the core only checks it against ownership and roles.

pub(crate) fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    let id = headers
        .get("x-actor-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| forbidden("missing or invalid X-Actor-Id header"))?;

    let role = headers
        .get("x-actor-role")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| forbidden("missing X-Actor-Role header"))?;

    match role {
        "partner" => Ok(Actor::Partner(PartnerId::from_uuid(id))),
        "moderator" => Ok(Actor::Moderator(ModeratorId::from_uuid(id))),
        other => Err(forbidden(format!("unknown actor role: {other}"))),
    }
}

pub(crate) fn partner_from_headers(headers: &HeaderMap) -> Result<PartnerId, ApiError> {
    match actor_from_headers(headers)? {
        Actor::Partner(id) => Ok(id),
        Actor::Moderator(_) => Err(forbidden("this operation requires a partner identity")),
    }
}

pub(crate) fn moderator_from_headers(headers: &HeaderMap) -> Result<ModeratorId, ApiError> {
    match actor_from_headers(headers)? {
        Actor::Moderator(id) => Ok(id),
        Actor::Partner(_) => Err(forbidden("this operation requires a moderator identity")),
    }
}

fn forbidden(msg: impl Into<String>) -> ApiError {
    ApiError(DirectoryError::Forbidden(msg.into()))
}
