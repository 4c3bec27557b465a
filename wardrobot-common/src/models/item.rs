use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::attributes::GarmentAttributes;

/// A persisted garment. `image_path` is a reference relative to the media
/// store root; raw image bytes are never inlined into the row.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct WardrobeItem {
    pub item_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub material: Option<String>,
    pub seasonality: Vec<String>,
    pub formality: Option<String>,
    /// Canonical color as a hex string, taken from the top palette entry.
    pub color: String,
    pub image_path: String,
    pub in_laundry: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WardrobeItem {
    pub fn new(name: &str, attrs: &GarmentAttributes, color: &str, image_path: &str) -> Self {
        let now = Utc::now();
        Self {
            item_id: Uuid::new_v4(),
            name: name.to_string(),
            category: attrs.category.clone(),
            subcategory: attrs.subcategory.clone(),
            material: attrs.material.clone(),
            seasonality: attrs.seasonality.clone(),
            formality: attrs.formality.clone(),
            color: color.to_string(),
            image_path: image_path.to_string(),
            in_laundry: false,
            created_at: now,
            updated_at: now,
        }
    }
}
