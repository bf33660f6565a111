//! Discovery - read-only geospatial search over active listings.
//!
//! Never touches the lifecycle machine; only `active` records are eligible
//! and queries have no side effects.

pub mod filters;
pub mod hours;
pub mod models;

pub use filters::{compose, FilterOptions, FilterSet};
pub use models::{search_by_bounds, search_by_radius, RadiusHit, MAX_RADIUS_KM};
