//! Write-side input types and field validation.
//!
//! Creation and partial update share the same per-field rules; a patch
//! re-validates only the fields it carries. Array-size invariants
//! (categories 1-2, cuisines 1-3) are enforced here, at write time, never as
//! runtime assertions later.

use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::str::FromStr;

use crate::common::errors::{DirectoryError, DirectoryResult};
use crate::common::geo;
use crate::domains::establishments::models::establishment::{Category, City, Cuisine, PriceRange};

pub const NAME_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 2000;

pub const MAX_CATEGORIES: usize = 2;
pub const MAX_CUISINES: usize = 3;

const DAY_NAMES: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Fields accepted when a partner creates a listing.
///
/// Name, city, classification and price tier are mandatory from the start;
/// address, coordinates and hours may arrive later while the listing is in
/// draft (submission checks completeness).
#[derive(Debug, Clone, Deserialize)]
pub struct NewEstablishment {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub city: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub categories: Vec<String>,
    pub cuisines: Vec<String>,
    pub price_range: String,
    #[serde(default)]
    pub working_hours: Option<JsonValue>,
    #[serde(default)]
    pub special_hours: Option<JsonValue>,
    #[serde(default)]
    pub attributes: Option<JsonValue>,
}

impl NewEstablishment {
    /// Validates every field and returns the normalized input
    /// (classification sets deduplicated, preserving order).
    pub fn validated(mut self) -> DirectoryResult<Self> {
        validate_name(&self.name)?;
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        City::from_str(&self.city)
            .map_err(|_| DirectoryError::Validation(format!("unsupported city: {}", self.city)))?;
        if let Some(lat) = self.latitude {
            validate_latitude(lat)?;
        }
        if let Some(lon) = self.longitude {
            validate_longitude(lon)?;
        }
        self.categories = normalize_categories(&self.categories)?;
        self.cuisines = normalize_cuisines(&self.cuisines)?;
        PriceRange::from_str(&self.price_range).map_err(|_| {
            DirectoryError::Validation(format!("invalid price range: {}", self.price_range))
        })?;
        if let Some(hours) = &self.working_hours {
            validate_working_hours(hours)?;
        }
        if let Some(hours) = &self.special_hours {
            validate_special_hours(hours)?;
        }
        if let Some(attributes) = &self.attributes {
            validate_attributes(attributes)?;
        }
        Ok(self)
    }
}

/// Partial update while a listing is in draft or rejected. Only fields
/// present are validated and written; `status` is deliberately absent —
/// status changes go through the named transitions only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstablishmentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub cuisines: Option<Vec<String>>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub working_hours: Option<JsonValue>,
    #[serde(default)]
    pub special_hours: Option<JsonValue>,
    #[serde(default)]
    pub attributes: Option<JsonValue>,
}

impl EstablishmentPatch {
    /// Validates the fields present in the patch and returns the normalized
    /// patch.
    pub fn validated(mut self) -> DirectoryResult<Self> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(city) = &self.city {
            City::from_str(city)
                .map_err(|_| DirectoryError::Validation(format!("unsupported city: {city}")))?;
        }
        if let Some(lat) = self.latitude {
            validate_latitude(lat)?;
        }
        if let Some(lon) = self.longitude {
            validate_longitude(lon)?;
        }
        if let Some(raw) = self.categories.take() {
            self.categories = Some(normalize_categories(&raw)?);
        }
        if let Some(raw) = self.cuisines.take() {
            self.cuisines = Some(normalize_cuisines(&raw)?);
        }
        if let Some(price_range) = &self.price_range {
            PriceRange::from_str(price_range).map_err(|_| {
                DirectoryError::Validation(format!("invalid price range: {price_range}"))
            })?;
        }
        if let Some(hours) = &self.working_hours {
            validate_working_hours(hours)?;
        }
        if let Some(hours) = &self.special_hours {
            validate_special_hours(hours)?;
        }
        if let Some(attributes) = &self.attributes {
            validate_attributes(attributes)?;
        }
        Ok(self)
    }
}

// =============================================================================
// Field validators
// =============================================================================

pub fn validate_name(name: &str) -> DirectoryResult<()> {
    if name.trim().is_empty() {
        return Err(DirectoryError::validation("name must not be empty"));
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(DirectoryError::Validation(format!(
            "name must be at most {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> DirectoryResult<()> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(DirectoryError::Validation(format!(
            "description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

/// Out-of-region coordinates are rejected, never clamped.
pub fn validate_latitude(lat: f64) -> DirectoryResult<()> {
    if !lat.is_finite() || !(geo::REGION_MIN_LAT..=geo::REGION_MAX_LAT).contains(&lat) {
        return Err(DirectoryError::Validation(format!(
            "latitude must be between {} and {}",
            geo::REGION_MIN_LAT,
            geo::REGION_MAX_LAT
        )));
    }
    Ok(())
}

pub fn validate_longitude(lon: f64) -> DirectoryResult<()> {
    if !lon.is_finite() || !(geo::REGION_MIN_LON..=geo::REGION_MAX_LON).contains(&lon) {
        return Err(DirectoryError::Validation(format!(
            "longitude must be between {} and {}",
            geo::REGION_MIN_LON,
            geo::REGION_MAX_LON
        )));
    }
    Ok(())
}

/// Parses, deduplicates (keeping first occurrence) and bounds-checks the
/// category set.
pub fn normalize_categories(raw: &[String]) -> DirectoryResult<Vec<String>> {
    let normalized = normalize_enum_set::<Category>(raw, "category")?;
    if normalized.is_empty() || normalized.len() > MAX_CATEGORIES {
        return Err(DirectoryError::Validation(format!(
            "between 1 and {MAX_CATEGORIES} categories required"
        )));
    }
    Ok(normalized)
}

pub fn normalize_cuisines(raw: &[String]) -> DirectoryResult<Vec<String>> {
    let normalized = normalize_enum_set::<Cuisine>(raw, "cuisine")?;
    if normalized.is_empty() || normalized.len() > MAX_CUISINES {
        return Err(DirectoryError::Validation(format!(
            "between 1 and {MAX_CUISINES} cuisines required"
        )));
    }
    Ok(normalized)
}

fn normalize_enum_set<T: FromStr>(raw: &[String], what: &str) -> DirectoryResult<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(raw.len());
    for value in raw {
        T::from_str(value)
            .map_err(|_| DirectoryError::Validation(format!("invalid {what}: {value}")))?;
        if !normalized.iter().any(|v| v == value) {
            normalized.push(value.clone());
        }
    }
    Ok(normalized)
}

/// Working hours: a day-name -> {"open": "HH:MM", "close": "HH:MM"} map.
/// Semantics beyond the shape stay opaque to the write path.
pub fn validate_working_hours(hours: &JsonValue) -> DirectoryResult<()> {
    let map = hours
        .as_object()
        .ok_or_else(|| DirectoryError::validation("working_hours must be an object"))?;

    for (day, interval) in map {
        if !DAY_NAMES.contains(&day.as_str()) {
            return Err(DirectoryError::Validation(format!(
                "working_hours: unknown day: {day}"
            )));
        }
        let interval = interval.as_object().ok_or_else(|| {
            DirectoryError::Validation(format!("working_hours: {day} must be an object"))
        })?;
        for key in ["open", "close"] {
            let time = interval.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
                DirectoryError::Validation(format!("working_hours: {day} is missing '{key}'"))
            })?;
            if chrono::NaiveTime::parse_from_str(time, "%H:%M").is_err() {
                return Err(DirectoryError::Validation(format!(
                    "working_hours: {day}.{key} must be HH:MM, got '{time}'"
                )));
            }
        }
    }
    Ok(())
}

pub fn validate_special_hours(hours: &JsonValue) -> DirectoryResult<()> {
    if !hours.is_object() {
        return Err(DirectoryError::validation("special_hours must be an object"));
    }
    Ok(())
}

/// Attributes: a flag-name -> bool map (wifi, parking, ...).
pub fn validate_attributes(attributes: &JsonValue) -> DirectoryResult<()> {
    let map = attributes
        .as_object()
        .ok_or_else(|| DirectoryError::validation("attributes must be an object"))?;
    for (key, value) in map {
        if !value.is_boolean() {
            return Err(DirectoryError::Validation(format!(
                "attributes: {key} must be a boolean"
            )));
        }
    }
    Ok(())
}
