//! Per-category field allow-lists and record projection
//!
//! Raw provider JSON never leaves this module: fields not on the category's
//! allow-list are dropped before a [`ProviderRecord`] is built, so upstream
//! schema changes cannot leak into stored trips.

use roamwise_common::GeoPoint;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::models::{Category, ProviderRecord};

/// Fields every category keeps
const COMMON_FIELDS: &[&str] = &[
    "location_id",
    "name",
    "address",
    "latitude",
    "longitude",
    "rating",
    "num_reviews",
    "photo",
    "web_url",
    "ranking",
];

/// Fields mapped onto typed [`ProviderRecord`] members rather than `details`
const TYPED_FIELDS: &[&str] = &[
    "location_id",
    "name",
    "address",
    "latitude",
    "longitude",
    "rating",
    "num_reviews",
    "photo",
];

const HOTEL_FIELDS: &[&str] = &["price", "price_level", "hotel_class", "amenities"];

const RESTAURANT_FIELDS: &[&str] = &[
    "price_level",
    "cuisine",
    "phone",
    "website",
    "open_now_text",
];

const ATTRACTION_FIELDS: &[&str] = &["subcategory", "description", "phone", "website"];

/// Whether a provider field survives projection for this category
pub fn is_allowed(category: Category, field: &str) -> bool {
    let extra = match category {
        Category::Hotels => HOTEL_FIELDS,
        Category::Restaurants => RESTAURANT_FIELDS,
        Category::Attractions => ATTRACTION_FIELDS,
    };
    COMMON_FIELDS.contains(&field) || extra.contains(&field)
}

/// Project one raw provider entry
///
/// Returns `None` for entries that are not records at all: non-objects and
/// nameless ad slots the provider interleaves with results.
pub fn project(category: Category, raw: &Value) -> Option<ProviderRecord> {
    let object = raw.as_object()?;

    let allowed: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| is_allowed(category, key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let name = string_field(&allowed, "name").filter(|n| !n.trim().is_empty())?;
    let external_id = string_field(&allowed, "location_id").unwrap_or_default();

    let location = match (
        number_field(&allowed, "latitude"),
        number_field(&allowed, "longitude"),
    ) {
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).ok(),
        _ => None,
    };

    let details: BTreeMap<String, Value> = allowed
        .iter()
        .filter(|(key, value)| !TYPED_FIELDS.contains(&key.as_str()) && !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(ProviderRecord {
        category,
        external_id,
        name,
        address: string_field(&allowed, "address").unwrap_or_default(),
        location,
        rating: number_field(&allowed, "rating"),
        num_reviews: number_field(&allowed, "num_reviews").map(|n| n.max(0.0) as u64),
        photo_url: photo_url(&allowed),
        details,
    })
}

/// Project a whole provider array, skipping non-records
pub fn project_all(category: Category, entries: &[Value]) -> Vec<ProviderRecord> {
    entries
        .iter()
        .filter_map(|entry| project(category, entry))
        .collect()
}

/// The provider sends ids and numbers either as JSON strings or numbers
fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(object: &Map<String, Value>, key: &str) -> Option<f64> {
    let n = match object.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// `photo.images.{medium,large,small}.url`, first present wins
fn photo_url(object: &Map<String, Value>) -> Option<String> {
    let images = object.get("photo")?.get("images")?;
    ["medium", "large", "small", "original"]
        .iter()
        .find_map(|size| images.get(size)?.get("url")?.as_str())
        .map(str::to_string)
}
