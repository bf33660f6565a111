pub mod effects;
pub mod machines;
pub mod models;

// Re-export the domain vocabulary
pub use machines::{Actor, LifecycleAction};
pub use models::{Category, City, Cuisine, Establishment, EstablishmentStatus, PriceRange};
