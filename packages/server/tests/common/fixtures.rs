//! Shared fixtures: seeded establishments in the various lifecycle states.
//!
//! Tests share one database, so each test should keep its listings in its
//! own small coordinate neighborhood to stay invisible to other tests'
//! searches.

use std::collections::HashMap;

use serde_json::json;
use sqlx::PgPool;

use server_core::common::{EstablishmentId, ModeratorId, PartnerId};
use server_core::domains::establishments::effects::{self, ModerationAction};
use server_core::domains::establishments::models::{Establishment, NewEstablishment};
use server_core::kernel::LoggingAuditSink;

/// A complete, submission-ready input.
pub fn complete_input(name: &str, lat: f64, lon: f64) -> NewEstablishment {
    NewEstablishment {
        name: name.to_string(),
        description: Some("Seeded test listing".to_string()),
        city: "minsk".to_string(),
        address: Some("vul. Kastryčnickaja 16".to_string()),
        latitude: Some(lat),
        longitude: Some(lon),
        categories: vec!["restaurant".to_string()],
        cuisines: vec!["belarusian".to_string()],
        price_range: "medium".to_string(),
        working_hours: Some(json!({
            "monday": {"open": "00:00", "close": "00:00"},
            "tuesday": {"open": "00:00", "close": "00:00"},
            "wednesday": {"open": "00:00", "close": "00:00"},
            "thursday": {"open": "00:00", "close": "00:00"},
            "friday": {"open": "00:00", "close": "00:00"},
            "saturday": {"open": "00:00", "close": "00:00"},
            "sunday": {"open": "00:00", "close": "00:00"},
        })),
        special_hours: None,
        attributes: Some(json!({"wifi": true})),
    }
}

/// Create a draft owned by a fresh partner.
pub async fn seed_draft(
    pool: &PgPool,
    name: &str,
    lat: f64,
    lon: f64,
) -> (Establishment, PartnerId) {
    let partner_id = PartnerId::new();
    let establishment = effects::create_establishment(
        partner_id,
        complete_input(name, lat, lon),
        &LoggingAuditSink,
        pool,
    )
    .await
    .expect("Failed to seed draft");
    (establishment, partner_id)
}

/// Create a pending listing (draft + submit).
pub async fn seed_pending(
    pool: &PgPool,
    name: &str,
    lat: f64,
    lon: f64,
) -> (Establishment, PartnerId) {
    let (draft, partner_id) = seed_draft(pool, name, lat, lon).await;
    let pending = effects::submit_for_moderation(draft.id, partner_id, &LoggingAuditSink, pool)
        .await
        .expect("Failed to submit seeded draft");
    (pending, partner_id)
}

/// Create an active listing (draft + submit + approve).
pub async fn seed_active(
    pool: &PgPool,
    name: &str,
    lat: f64,
    lon: f64,
) -> (Establishment, PartnerId) {
    let (pending, partner_id) = seed_pending(pool, name, lat, lon).await;
    let active = approve(pool, pending.id).await;
    (active, partner_id)
}

/// Approve a pending listing as a fresh moderator.
pub async fn approve(pool: &PgPool, id: EstablishmentId) -> Establishment {
    effects::moderate(
        id,
        ModeratorId::new(),
        ModerationAction::Approve,
        HashMap::new(),
        &LoggingAuditSink,
        pool,
    )
    .await
    .expect("Failed to approve seeded listing")
}

/// Classification/rating tweaks applied directly; aggregates are owned by
/// collaborating subsystems, so tests write them the same way those do.
pub async fn set_rating(pool: &PgPool, id: EstablishmentId, rating: f64, reviews: i64) {
    sqlx::query("UPDATE establishments SET average_rating = $2, review_count = $3 WHERE id = $1")
        .bind(id)
        .bind(rating)
        .bind(reviews)
        .execute(pool)
        .await
        .expect("Failed to set rating");
}

pub async fn set_classification(
    pool: &PgPool,
    id: EstablishmentId,
    categories: &[&str],
    cuisines: &[&str],
    price_range: &str,
) {
    let categories: Vec<String> = categories.iter().map(|s| s.to_string()).collect();
    let cuisines: Vec<String> = cuisines.iter().map(|s| s.to_string()).collect();
    sqlx::query(
        "UPDATE establishments SET categories = $2, cuisines = $3, price_range = $4 WHERE id = $1",
    )
    .bind(id)
    .bind(categories)
    .bind(cuisines)
    .bind(price_range)
    .execute(pool)
    .await
    .expect("Failed to set classification");
}

/// Single note map for reject calls.
pub fn notes(field: &str, comment: &str) -> HashMap<String, String> {
    HashMap::from([(field.to_string(), comment.to_string())])
}
