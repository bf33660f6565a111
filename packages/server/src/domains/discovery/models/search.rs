//! Radius and bounding-box search over active establishments.
//!
//! Both modes share one predicate pipeline: the SQL layer narrows to active
//! records in a rectangle with the composed attribute filters applied, and
//! the exact cut (haversine radius, open-now), ordering and pagination run
//! in Rust over that narrowed set. Page, total and has-more therefore come
//! from a single predicate evaluation and cannot drift apart.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::common::errors::{DirectoryError, DirectoryResult};
use crate::common::geo::{self, BoundingBox};
use crate::common::pagination::{paginate, Page, PageRequest};
use crate::domains::discovery::filters::FilterSet;
use crate::domains::discovery::hours;
use crate::domains::establishments::models::establishment::Establishment;

/// Radius searches are capped at 1000 km.
pub const MAX_RADIUS_KM: f64 = 1000.0;

/// An active establishment with its great-circle distance from the query
/// point, rounded for display (the radius cut compares at full precision).
#[derive(Debug, Clone, Serialize)]
pub struct RadiusHit {
    #[serde(flatten)]
    pub establishment: Establishment,
    pub distance_km: f64,
}

/// Radius search: center point, maximum distance, optional filters.
///
/// Ordering is ascending distance with ties broken by creation time
/// descending then id, so identical queries return identical orderings.
pub async fn search_by_radius(
    lat: f64,
    lon: f64,
    radius_km: f64,
    filters: &FilterSet,
    page: PageRequest,
    pool: &PgPool,
) -> DirectoryResult<Page<RadiusHit>> {
    if !geo::in_region(lat, lon) {
        return Err(DirectoryError::InvalidCoordinates);
    }
    if !radius_km.is_finite() || radius_km <= 0.0 || radius_km > MAX_RADIUS_KM {
        return Err(DirectoryError::InvalidRadius);
    }

    let bbox = BoundingBox::around(lat, lon, radius_km);
    let rows = fetch_active_in_rect(&bbox, filters, pool).await?;

    let hits = rank_within_radius(rows, lat, lon, radius_km, filters.open_now, Utc::now());

    Ok(paginate(hits, page))
}

/// Bounding-box search for map viewports. Containment is inclusive on all
/// edges; no distance is computed or returned.
pub async fn search_by_bounds(
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
    filters: &FilterSet,
    page: PageRequest,
    pool: &PgPool,
) -> DirectoryResult<Page<Establishment>> {
    let finite = [min_lat, max_lat, min_lon, max_lon]
        .iter()
        .all(|b| b.is_finite());
    if !finite || min_lat > max_lat || min_lon > max_lon {
        return Err(DirectoryError::InvalidBounds);
    }

    let bbox = BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    };
    let mut rows = fetch_active_in_rect(&bbox, filters, pool).await?;

    if filters.open_now {
        let now = Utc::now();
        rows.retain(|est| hours::is_open_at(&est.working_hours, now));
    }

    Ok(paginate(rows, page))
}

/// Exact radius cut, open-now filter and deterministic ordering over the
/// SQL-prefiltered rows. Pure so the ordering contract is testable without
/// a database.
pub fn rank_within_radius(
    rows: Vec<Establishment>,
    lat: f64,
    lon: f64,
    radius_km: f64,
    open_now: bool,
    now: DateTime<Utc>,
) -> Vec<RadiusHit> {
    let mut hits: Vec<(f64, Establishment)> = rows
        .into_iter()
        .filter_map(|est| {
            let (Some(est_lat), Some(est_lon)) = (est.latitude, est.longitude) else {
                return None;
            };
            let distance = geo::haversine_km(lat, lon, est_lat, est_lon);
            // Inclusive boundary, compared at full precision.
            (distance <= radius_km).then_some((distance, est))
        })
        .collect();

    if open_now {
        hits.retain(|(_, est)| hours::is_open_at(&est.working_hours, now));
    }

    hits.sort_by(|(da, a), (db, b)| {
        da.total_cmp(db)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    });

    hits.into_iter()
        .map(|(distance, establishment)| RadiusHit {
            establishment,
            distance_km: round_km(distance),
        })
        .collect()
}

fn round_km(distance: f64) -> f64 {
    (distance * 1000.0).round() / 1000.0
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

/// Active records inside a rectangle with the composed filters pushed down.
/// NULL filter parameters disable the corresponding predicate.
async fn fetch_active_in_rect(
    bbox: &BoundingBox,
    filters: &FilterSet,
    pool: &PgPool,
) -> DirectoryResult<Vec<Establishment>> {
    let rows = sqlx::query_as::<_, Establishment>(
        r#"
        SELECT * FROM establishments
        WHERE status = 'active'
          AND latitude IS NOT NULL AND longitude IS NOT NULL
          AND latitude BETWEEN $1 AND $2
          AND longitude BETWEEN $3 AND $4
          AND ($5::text[] IS NULL OR categories && $5)
          AND ($6::text[] IS NULL OR cuisines && $6)
          AND ($7::text IS NULL OR price_range = $7)
          AND ($8::float8 IS NULL OR average_rating >= $8)
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(bbox.min_lat)
    .bind(bbox.max_lat)
    .bind(bbox.min_lon)
    .bind(bbox.max_lon)
    .bind(filters.category_params())
    .bind(filters.cuisine_params())
    .bind(filters.price_param())
    .bind(filters.min_rating)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use crate::common::{EstablishmentId, PartnerId};

    const MINSK: (f64, f64) = (53.9006, 27.5590);

    fn active_at(lat: f64, lon: f64, created_at: DateTime<Utc>) -> Establishment {
        Establishment {
            id: EstablishmentId::new(),
            partner_id: PartnerId::new(),
            name: "Vaverka".to_string(),
            description: None,
            city: "minsk".to_string(),
            address: Some("praspiekt Niezaliežnasci 12".to_string()),
            latitude: Some(lat),
            longitude: Some(lon),
            categories: vec!["cafe".to_string()],
            cuisines: vec!["european".to_string()],
            price_range: "medium".to_string(),
            working_hours: json!({"monday": {"open": "09:00", "close": "21:00"}}),
            special_hours: None,
            attributes: json!({}),
            status: "active".to_string(),
            moderation_notes: json!({}),
            moderation_note_history: json!([]),
            moderated_by: None,
            moderated_at: None,
            suspension_reason: None,
            view_count: 0,
            favorite_count: 0,
            review_count: 0,
            average_rating: 4.2,
            created_at,
            updated_at: created_at,
            published_at: Some(created_at),
        }
    }

    fn now() -> DateTime<Utc> {
        // A Monday at 12:00 local (UTC+3), inside the fixture's hours.
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    #[test]
    fn exact_center_has_zero_distance() {
        let rows = vec![active_at(MINSK.0, MINSK.1, now())];
        let hits = rank_within_radius(rows, MINSK.0, MINSK.1, 1.0, false, now());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance_km, 0.0);
    }

    #[test]
    fn tiny_radius_excludes_everything_but_the_exact_point() {
        // ~11 m north of the center; far beyond a 0.0001 km radius.
        let near = active_at(MINSK.0 + 0.0001, MINSK.1, now());
        let on_point = active_at(MINSK.0, MINSK.1, now());

        let hits = rank_within_radius(
            vec![near, on_point],
            MINSK.0,
            MINSK.1,
            0.0001,
            false,
            now(),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance_km, 0.0);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let target = active_at(MINSK.0 + 0.05, MINSK.1, now());
        let exact_distance = geo::haversine_km(
            MINSK.0,
            MINSK.1,
            target.latitude.unwrap(),
            target.longitude.unwrap(),
        );

        let hits = rank_within_radius(
            vec![target],
            MINSK.0,
            MINSK.1,
            exact_distance,
            false,
            now(),
        );
        assert_eq!(hits.len(), 1, "a record at exactly the radius is included");
    }

    #[test]
    fn ordered_by_distance_then_recency() {
        let base = now();
        let far = active_at(MINSK.0 + 0.1, MINSK.1, base);
        let near_old = active_at(MINSK.0 + 0.01, MINSK.1, base - Duration::days(2));
        let near_new = active_at(MINSK.0 + 0.01, MINSK.1, base - Duration::days(1));

        let hits = rank_within_radius(
            vec![far.clone(), near_old.clone(), near_new.clone()],
            MINSK.0,
            MINSK.1,
            50.0,
            false,
            base,
        );

        let ids: Vec<_> = hits.iter().map(|h| h.establishment.id).collect();
        assert_eq!(ids, vec![near_new.id, near_old.id, far.id]);
    }

    #[test]
    fn identical_inputs_rank_identically() {
        let base = now();
        let rows: Vec<Establishment> = (0..8)
            .map(|i| active_at(MINSK.0 + 0.01, MINSK.1, base - Duration::hours(i)))
            .collect();

        let first = rank_within_radius(rows.clone(), MINSK.0, MINSK.1, 50.0, false, base);
        let second = rank_within_radius(rows, MINSK.0, MINSK.1, 50.0, false, base);

        let first_ids: Vec<_> = first.iter().map(|h| h.establishment.id).collect();
        let second_ids: Vec<_> = second.iter().map(|h| h.establishment.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn open_now_drops_closed_listings() {
        let mut closed = active_at(MINSK.0, MINSK.1, now());
        closed.working_hours = json!({"sunday": {"open": "09:00", "close": "21:00"}});
        let open = active_at(MINSK.0, MINSK.1, now());

        let hits = rank_within_radius(
            vec![closed, open.clone()],
            MINSK.0,
            MINSK.1,
            1.0,
            true,
            now(),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].establishment.id, open.id);
    }

    #[test]
    fn records_without_coordinates_never_match() {
        let mut est = active_at(MINSK.0, MINSK.1, now());
        est.latitude = None;
        let hits = rank_within_radius(vec![est], MINSK.0, MINSK.1, 100.0, false, now());
        assert!(hits.is_empty());
    }

    #[test]
    fn distances_are_rounded_for_display() {
        let est = active_at(MINSK.0 + 0.01, MINSK.1, now());
        let hits = rank_within_radius(vec![est], MINSK.0, MINSK.1, 10.0, false, now());
        let shown = hits[0].distance_km;
        assert_eq!(shown, (shown * 1000.0).round() / 1000.0);
    }
}
