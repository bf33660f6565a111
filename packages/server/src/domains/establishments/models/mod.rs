pub mod establishment;
pub mod inputs;

pub use establishment::{
    Category, City, Cuisine, Establishment, EstablishmentStatus, PriceRange,
};
pub use inputs::{EstablishmentPatch, NewEstablishment};
