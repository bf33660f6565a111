use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::common::{DirectoryError, DirectoryResult, EstablishmentId, ModeratorId, PartnerId};

/// Establishment - a partner-owned listing (restaurant, cafe, bar, ...)
///
/// Status is persisted as text; transition legality is derived only by the
/// lifecycle machine, never from this struct.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Establishment {
    pub id: EstablishmentId,
    pub partner_id: PartnerId,

    // Content
    pub name: String,
    pub description: Option<String>,

    // Location
    pub city: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    // Classification
    pub categories: Vec<String>,
    pub cuisines: Vec<String>,
    pub price_range: String,

    // Structured attributes (shape-validated on write, otherwise opaque)
    pub working_hours: JsonValue,
    pub special_hours: Option<JsonValue>,
    pub attributes: JsonValue,

    // Moderation
    pub status: String, // 'draft', 'pending', 'active', 'suspended', 'rejected', 'archived'
    pub moderation_notes: JsonValue,
    pub moderation_note_history: JsonValue,
    pub moderated_by: Option<ModeratorId>,
    pub moderated_at: Option<DateTime<Utc>>,
    pub suspension_reason: Option<String>,

    // Aggregates recomputed by collaborating subsystems; read-only here
    pub view_count: i64,
    pub favorite_count: i64,
    pub review_count: i64,
    pub average_rating: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Establishment {
    /// Parse the persisted status into the closed enum.
    pub fn current_status(&self) -> DirectoryResult<EstablishmentStatus> {
        self.status
            .parse::<EstablishmentStatus>()
            .map_err(DirectoryError::Internal)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EstablishmentStatus {
    Draft,
    Pending,
    Active,
    Suspended,
    Rejected,
    Archived,
}

impl EstablishmentStatus {
    pub const ALL: &'static [EstablishmentStatus] = &[
        EstablishmentStatus::Draft,
        EstablishmentStatus::Pending,
        EstablishmentStatus::Active,
        EstablishmentStatus::Suspended,
        EstablishmentStatus::Rejected,
        EstablishmentStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstablishmentStatus::Draft => "draft",
            EstablishmentStatus::Pending => "pending",
            EstablishmentStatus::Active => "active",
            EstablishmentStatus::Suspended => "suspended",
            EstablishmentStatus::Rejected => "rejected",
            EstablishmentStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for EstablishmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EstablishmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(EstablishmentStatus::Draft),
            "pending" => Ok(EstablishmentStatus::Pending),
            "active" => Ok(EstablishmentStatus::Active),
            "suspended" => Ok(EstablishmentStatus::Suspended),
            "rejected" => Ok(EstablishmentStatus::Rejected),
            "archived" => Ok(EstablishmentStatus::Archived),
            _ => Err(anyhow::anyhow!("Invalid establishment status: {}", s)),
        }
    }
}

/// Supported cities
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum City {
    Minsk,
    Brest,
    Hrodna,
    Homyel,
    Mahilyow,
    Vitsebsk,
}

impl City {
    pub const ALL: &'static [City] = &[
        City::Minsk,
        City::Brest,
        City::Hrodna,
        City::Homyel,
        City::Mahilyow,
        City::Vitsebsk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            City::Minsk => "minsk",
            City::Brest => "brest",
            City::Hrodna => "hrodna",
            City::Homyel => "homyel",
            City::Mahilyow => "mahilyow",
            City::Vitsebsk => "vitsebsk",
        }
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for City {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        City::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Unsupported city: {}", s))
    }
}

/// Establishment categories (1-2 per listing)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Restaurant,
    Cafe,
    Bar,
    CoffeeHouse,
    FastFood,
    Pizzeria,
    SushiBar,
    Bakery,
    Canteen,
    Pub,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Restaurant,
        Category::Cafe,
        Category::Bar,
        Category::CoffeeHouse,
        Category::FastFood,
        Category::Pizzeria,
        Category::SushiBar,
        Category::Bakery,
        Category::Canteen,
        Category::Pub,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Restaurant => "restaurant",
            Category::Cafe => "cafe",
            Category::Bar => "bar",
            Category::CoffeeHouse => "coffee_house",
            Category::FastFood => "fast_food",
            Category::Pizzeria => "pizzeria",
            Category::SushiBar => "sushi_bar",
            Category::Bakery => "bakery",
            Category::Canteen => "canteen",
            Category::Pub => "pub",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Invalid category: {}", s))
    }
}

/// Cuisines (1-3 per listing)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Cuisine {
    Belarusian,
    European,
    Italian,
    French,
    Georgian,
    Japanese,
    Chinese,
    Indian,
    Mexican,
    American,
    MiddleEastern,
    Vegetarian,
}

impl Cuisine {
    pub const ALL: &'static [Cuisine] = &[
        Cuisine::Belarusian,
        Cuisine::European,
        Cuisine::Italian,
        Cuisine::French,
        Cuisine::Georgian,
        Cuisine::Japanese,
        Cuisine::Chinese,
        Cuisine::Indian,
        Cuisine::Mexican,
        Cuisine::American,
        Cuisine::MiddleEastern,
        Cuisine::Vegetarian,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Cuisine::Belarusian => "belarusian",
            Cuisine::European => "european",
            Cuisine::Italian => "italian",
            Cuisine::French => "french",
            Cuisine::Georgian => "georgian",
            Cuisine::Japanese => "japanese",
            Cuisine::Chinese => "chinese",
            Cuisine::Indian => "indian",
            Cuisine::Mexican => "mexican",
            Cuisine::American => "american",
            Cuisine::MiddleEastern => "middle_eastern",
            Cuisine::Vegetarian => "vegetarian",
        }
    }
}

impl std::fmt::Display for Cuisine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Cuisine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Cuisine::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Invalid cuisine: {}", s))
    }
}

/// Price tier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PriceRange {
    Budget,
    Medium,
    Premium,
}

impl PriceRange {
    pub const ALL: &'static [PriceRange] =
        &[PriceRange::Budget, PriceRange::Medium, PriceRange::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceRange::Budget => "budget",
            PriceRange::Medium => "medium",
            PriceRange::Premium => "premium",
        }
    }
}

impl std::fmt::Display for PriceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PriceRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        PriceRange::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Invalid price range: {}", s))
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Establishment {
    /// Find establishment by ID, archived included.
    pub async fn find_by_id(
        id: EstablishmentId,
        pool: &PgPool,
    ) -> DirectoryResult<Option<Self>> {
        let row = sqlx::query_as::<_, Establishment>("SELECT * FROM establishments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row)
    }

    /// Insert a new draft. Status is set atomically with the insert.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        id: EstablishmentId,
        partner_id: PartnerId,
        name: String,
        description: Option<String>,
        city: String,
        address: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        categories: Vec<String>,
        cuisines: Vec<String>,
        price_range: String,
        working_hours: JsonValue,
        special_hours: Option<JsonValue>,
        attributes: JsonValue,
        pool: &PgPool,
    ) -> DirectoryResult<Self> {
        let row = sqlx::query_as::<_, Establishment>(
            r#"
            INSERT INTO establishments (
                id, partner_id, name, description, city, address,
                latitude, longitude, categories, cuisines, price_range,
                working_hours, special_hours, attributes, status
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 'draft'
            )
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(partner_id)
        .bind(name)
        .bind(description)
        .bind(city)
        .bind(address)
        .bind(latitude)
        .bind(longitude)
        .bind(categories)
        .bind(cuisines)
        .bind(price_range)
        .bind(working_hours)
        .bind(special_hours)
        .bind(attributes)
        .fetch_one(pool)
        .await?;
        Ok(row)
    }

    /// Partial field update, guarded on the status observed by the caller.
    ///
    /// Returns `None` when zero rows matched (the record changed status
    /// concurrently); the caller decides between `StaleState` and `NotFound`.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_fields(
        id: EstablishmentId,
        expected_status: &str,
        name: Option<String>,
        description: Option<String>,
        city: Option<String>,
        address: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        categories: Option<Vec<String>>,
        cuisines: Option<Vec<String>>,
        price_range: Option<String>,
        working_hours: Option<JsonValue>,
        special_hours: Option<JsonValue>,
        attributes: Option<JsonValue>,
        pool: &PgPool,
    ) -> DirectoryResult<Option<Self>> {
        let row = sqlx::query_as::<_, Establishment>(
            r#"
            UPDATE establishments
            SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                city = COALESCE($5, city),
                address = COALESCE($6, address),
                latitude = COALESCE($7, latitude),
                longitude = COALESCE($8, longitude),
                categories = COALESCE($9::text[], categories),
                cuisines = COALESCE($10::text[], cuisines),
                price_range = COALESCE($11, price_range),
                working_hours = COALESCE($12, working_hours),
                special_hours = COALESCE($13, special_hours),
                attributes = COALESCE($14, attributes),
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_status)
        .bind(name)
        .bind(description)
        .bind(city)
        .bind(address)
        .bind(latitude)
        .bind(longitude)
        .bind(categories)
        .bind(cuisines)
        .bind(price_range)
        .bind(working_hours)
        .bind(special_hours)
        .bind(attributes)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// draft|rejected -> pending, in one statement.
    ///
    /// On resubmission the previous moderation notes are archived to the
    /// history list and the current map cleared, so nothing is discarded.
    pub async fn mark_pending(
        id: EstablishmentId,
        expected_status: &str,
        pool: &PgPool,
    ) -> DirectoryResult<Option<Self>> {
        let row = sqlx::query_as::<_, Establishment>(
            r#"
            UPDATE establishments
            SET
                status = 'pending',
                moderation_note_history = CASE
                    WHEN $2 = 'rejected' AND moderation_notes <> '{}'::jsonb
                    THEN moderation_note_history || jsonb_build_array(jsonb_build_object(
                        'notes', moderation_notes,
                        'moderated_by', to_jsonb(moderated_by),
                        'moderated_at', to_jsonb(moderated_at)
                    ))
                    ELSE moderation_note_history
                END,
                moderation_notes = CASE
                    WHEN $2 = 'rejected' THEN '{}'::jsonb
                    ELSE moderation_notes
                END,
                updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_status)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// pending -> active|rejected, recording the moderator's verdict.
    ///
    /// `published_at` is set the first time a listing becomes active.
    pub async fn mark_moderated(
        id: EstablishmentId,
        new_status: &str,
        moderator_id: ModeratorId,
        notes: &JsonValue,
        pool: &PgPool,
    ) -> DirectoryResult<Option<Self>> {
        let row = sqlx::query_as::<_, Establishment>(
            r#"
            UPDATE establishments
            SET
                status = $2,
                moderation_notes = $4,
                moderated_by = $3,
                moderated_at = NOW(),
                published_at = CASE
                    WHEN $2 = 'active' THEN COALESCE(published_at, NOW())
                    ELSE published_at
                END,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_status)
        .bind(moderator_id)
        .bind(notes)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// active -> suspended with the mandatory reason.
    pub async fn mark_suspended(
        id: EstablishmentId,
        reason: &str,
        pool: &PgPool,
    ) -> DirectoryResult<Option<Self>> {
        let row = sqlx::query_as::<_, Establishment>(
            r#"
            UPDATE establishments
            SET status = 'suspended', suspension_reason = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'active'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// suspended -> active, clearing the suspension reason.
    pub async fn mark_unsuspended(
        id: EstablishmentId,
        pool: &PgPool,
    ) -> DirectoryResult<Option<Self>> {
        let row = sqlx::query_as::<_, Establishment>(
            r#"
            UPDATE establishments
            SET
                status = 'active',
                suspension_reason = NULL,
                published_at = COALESCE(published_at, NOW()),
                updated_at = NOW()
            WHERE id = $1 AND status = 'suspended'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// any non-archived -> archived (soft tombstone, no hard delete).
    pub async fn mark_archived(
        id: EstablishmentId,
        expected_status: &str,
        pool: &PgPool,
    ) -> DirectoryResult<Option<Self>> {
        let row = sqlx::query_as::<_, Establishment>(
            r#"
            UPDATE establishments
            SET status = 'archived', updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_status)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }

    /// A partner's own listings, newest first, archived excluded.
    pub async fn find_by_partner(
        partner_id: PartnerId,
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> DirectoryResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, Establishment>(
            r#"
            SELECT * FROM establishments
            WHERE partner_id = $1 AND status <> 'archived'
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(partner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_by_partner(partner_id: PartnerId, pool: &PgPool) -> DirectoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM establishments WHERE partner_id = $1 AND status <> 'archived'",
        )
        .bind(partner_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Moderation queue: pending listings, oldest submission first.
    pub async fn find_pending(
        limit: i64,
        offset: i64,
        pool: &PgPool,
    ) -> DirectoryResult<Vec<Self>> {
        let rows = sqlx::query_as::<_, Establishment>(
            r#"
            SELECT * FROM establishments
            WHERE status = 'pending'
            ORDER BY updated_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn count_pending(pool: &PgPool) -> DirectoryResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM establishments WHERE status = 'pending'",
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_roundtrip() {
        for status in EstablishmentStatus::ALL {
            assert_eq!(
                EstablishmentStatus::from_str(status.as_str()).unwrap(),
                *status
            );
        }
        assert!(EstablishmentStatus::from_str("deleted").is_err());
    }

    #[test]
    fn enum_roundtrips() {
        for city in City::ALL {
            assert_eq!(City::from_str(city.as_str()).unwrap(), *city);
        }
        for category in Category::ALL {
            assert_eq!(Category::from_str(category.as_str()).unwrap(), *category);
        }
        for cuisine in Cuisine::ALL {
            assert_eq!(Cuisine::from_str(cuisine.as_str()).unwrap(), *cuisine);
        }
        for price in PriceRange::ALL {
            assert_eq!(PriceRange::from_str(price.as_str()).unwrap(), *price);
        }
    }

    #[test]
    fn unknown_values_rejected() {
        assert!(City::from_str("warsaw").is_err());
        assert!(Category::from_str("nightclub").is_err());
        assert!(Cuisine::from_str("klingon").is_err());
        assert!(PriceRange::from_str("free").is_err());
    }
}
