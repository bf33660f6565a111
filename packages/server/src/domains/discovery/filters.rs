//! Filter Composer - turns raw filter options into a normalized predicate
//! set.
//!
//! Pure and deterministic: same input, same predicate set, no I/O. Unknown
//! values fail with `InvalidFilterValue`; an empty set on an axis means "no
//! restriction on this axis", never "match nothing".

use serde::Deserialize;
use std::str::FromStr;

use crate::common::errors::{DirectoryError, DirectoryResult};
use crate::domains::establishments::models::establishment::{Category, Cuisine, PriceRange};

/// Raw filter options as they arrive from the API layer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub cuisines: Vec<String>,
    #[serde(default)]
    pub price_range: Option<String>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub open_now: Option<bool>,
}

/// Normalized predicate set. Predicates apply as an AND; list axes match on
/// set overlap with the record's own sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    pub categories: Vec<Category>,
    pub cuisines: Vec<Cuisine>,
    pub price_range: Option<PriceRange>,
    pub min_rating: Option<f64>,
    pub open_now: bool,
}

/// Validate and normalize filter options. Duplicates collapse, keeping
/// first-occurrence order.
pub fn compose(options: &FilterOptions) -> DirectoryResult<FilterSet> {
    let mut categories: Vec<Category> = Vec::with_capacity(options.categories.len());
    for raw in &options.categories {
        let category = Category::from_str(raw)
            .map_err(|_| DirectoryError::InvalidFilterValue(format!("category '{raw}'")))?;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    let mut cuisines: Vec<Cuisine> = Vec::with_capacity(options.cuisines.len());
    for raw in &options.cuisines {
        let cuisine = Cuisine::from_str(raw)
            .map_err(|_| DirectoryError::InvalidFilterValue(format!("cuisine '{raw}'")))?;
        if !cuisines.contains(&cuisine) {
            cuisines.push(cuisine);
        }
    }

    let price_range = match &options.price_range {
        Some(raw) => Some(
            PriceRange::from_str(raw)
                .map_err(|_| DirectoryError::InvalidFilterValue(format!("price range '{raw}'")))?,
        ),
        None => None,
    };

    let min_rating = match options.min_rating {
        Some(rating) => {
            if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
                return Err(DirectoryError::InvalidFilterValue(format!(
                    "min_rating '{rating}'"
                )));
            }
            Some(rating)
        }
        None => None,
    };

    Ok(FilterSet {
        categories,
        cuisines,
        price_range,
        min_rating,
        open_now: options.open_now.unwrap_or(false),
    })
}

impl FilterSet {
    /// Category strings for the SQL overlap predicate; `None` disables the
    /// predicate entirely.
    pub fn category_params(&self) -> Option<Vec<String>> {
        if self.categories.is_empty() {
            None
        } else {
            Some(self.categories.iter().map(|c| c.to_string()).collect())
        }
    }

    pub fn cuisine_params(&self) -> Option<Vec<String>> {
        if self.cuisines.is_empty() {
            None
        } else {
            Some(self.cuisines.iter().map(|c| c.to_string()).collect())
        }
    }

    pub fn price_param(&self) -> Option<String> {
        self.price_range.map(|p| p.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_mean_no_restrictions() {
        let set = compose(&FilterOptions::default()).unwrap();
        assert!(set.categories.is_empty());
        assert!(set.cuisines.is_empty());
        assert!(set.price_range.is_none());
        assert!(set.min_rating.is_none());
        assert!(!set.open_now);
        assert!(set.category_params().is_none());
        assert!(set.cuisine_params().is_none());
    }

    #[test]
    fn unknown_values_fail() {
        let options = FilterOptions {
            categories: vec!["disco".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            compose(&options).unwrap_err(),
            DirectoryError::InvalidFilterValue(_)
        ));

        let options = FilterOptions {
            price_range: Some("luxury".to_string()),
            ..Default::default()
        };
        assert!(compose(&options).is_err());
    }

    #[test]
    fn min_rating_bounds() {
        for bad in [-0.1, 5.1, f64::NAN] {
            let options = FilterOptions {
                min_rating: Some(bad),
                ..Default::default()
            };
            assert!(compose(&options).is_err(), "{bad} should be rejected");
        }

        let options = FilterOptions {
            min_rating: Some(4.5),
            ..Default::default()
        };
        assert_eq!(compose(&options).unwrap().min_rating, Some(4.5));
    }

    #[test]
    fn duplicates_collapse_in_order() {
        let options = FilterOptions {
            cuisines: vec![
                "italian".to_string(),
                "georgian".to_string(),
                "italian".to_string(),
            ],
            ..Default::default()
        };
        let set = compose(&options).unwrap();
        assert_eq!(set.cuisines, vec![Cuisine::Italian, Cuisine::Georgian]);
    }

    #[test]
    fn composition_is_deterministic() {
        let options = FilterOptions {
            categories: vec!["bar".to_string(), "pub".to_string()],
            cuisines: vec!["belarusian".to_string()],
            price_range: Some("medium".to_string()),
            min_rating: Some(3.0),
            open_now: Some(true),
        };
        assert_eq!(compose(&options).unwrap(), compose(&options).unwrap());
    }
}
