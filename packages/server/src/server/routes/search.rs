//! Consumer discovery endpoints.
//!
//! Filter list axes arrive comma-separated (`categories=cafe,bar`).

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::Deserialize;

use crate::common::{DirectoryError, Page, PageRequest};
use crate::domains::discovery::filters::{compose, FilterOptions, FilterSet};
use crate::domains::discovery::models::search::{search_by_bounds, search_by_radius, RadiusHit};
use crate::domains::establishments::models::Establishment;
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct RadiusSearchQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius_km: Option<f64>,
    pub categories: Option<String>,
    pub cuisines: Option<String>,
    pub price_range: Option<String>,
    pub min_rating: Option<f64>,
    pub open_now: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BoundsSearchQuery {
    pub min_lat: Option<f64>,
    pub max_lat: Option<f64>,
    pub min_lon: Option<f64>,
    pub max_lon: Option<f64>,
    pub categories: Option<String>,
    pub cuisines: Option<String>,
    pub price_range: Option<String>,
    pub min_rating: Option<f64>,
    pub open_now: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn composed_filters(
    categories: Option<String>,
    cuisines: Option<String>,
    price_range: Option<String>,
    min_rating: Option<f64>,
    open_now: Option<bool>,
) -> Result<FilterSet, DirectoryError> {
    compose(&FilterOptions {
        categories: split_csv(categories.as_deref()),
        cuisines: split_csv(cuisines.as_deref()),
        price_range,
        min_rating,
        open_now,
    })
}

fn split_csv(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

pub async fn radius_search_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<RadiusSearchQuery>,
) -> Result<Json<Page<RadiusHit>>, ApiError> {
    let lat = query.lat.ok_or(DirectoryError::InvalidCoordinates)?;
    let lon = query.lon.ok_or(DirectoryError::InvalidCoordinates)?;
    let radius_km = query.radius_km.ok_or(DirectoryError::InvalidRadius)?;

    let filters = composed_filters(
        query.categories,
        query.cuisines,
        query.price_range,
        query.min_rating,
        query.open_now,
    )?;
    let page = PageRequest::new(query.limit, query.offset)?;

    let result = search_by_radius(lat, lon, radius_km, &filters, page, &state.db_pool).await?;
    Ok(Json(result))
}

pub async fn bounds_search_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<BoundsSearchQuery>,
) -> Result<Json<Page<Establishment>>, ApiError> {
    let min_lat = query.min_lat.ok_or(DirectoryError::InvalidBounds)?;
    let max_lat = query.max_lat.ok_or(DirectoryError::InvalidBounds)?;
    let min_lon = query.min_lon.ok_or(DirectoryError::InvalidBounds)?;
    let max_lon = query.max_lon.ok_or(DirectoryError::InvalidBounds)?;

    let filters = composed_filters(
        query.categories,
        query.cuisines,
        query.price_range,
        query.min_rating,
        query.open_now,
    )?;
    let page = PageRequest::new(query.limit, query.offset)?;

    let result = search_by_bounds(
        min_lat,
        max_lat,
        min_lon,
        max_lon,
        &filters,
        page,
        &state.db_pool,
    )
    .await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_splitting() {
        assert_eq!(
            split_csv(Some("cafe, bar ,pub")),
            vec!["cafe".to_string(), "bar".to_string(), "pub".to_string()]
        );
        assert!(split_csv(Some("")).is_empty());
        assert!(split_csv(None).is_empty());
    }
}
