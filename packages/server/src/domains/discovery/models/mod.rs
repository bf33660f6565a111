pub mod search;

pub use search::{search_by_bounds, search_by_radius, RadiusHit, MAX_RADIUS_KM};
