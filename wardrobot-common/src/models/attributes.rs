use serde::{Deserialize, Serialize};

/// Attributes the AI classifier extracts from a garment photo. Every field is
/// optional: the model may omit or malform any of them, and the record has to
/// tolerate partial population.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GarmentAttributes {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    /// Subset of {"Spring", "Summer", "Fall", "Winter"}, best-effort and
    /// unvalidated.
    #[serde(default)]
    pub seasonality: Vec<String>,
    /// One of casual/smart-casual/semi-formal/formal, best-effort and
    /// unvalidated.
    #[serde(default)]
    pub formality: Option<String>,
}

impl GarmentAttributes {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.subcategory.is_none()
            && self.material.is_none()
            && self.seasonality.is_empty()
            && self.formality.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.category.is_some()
            && self.subcategory.is_some()
            && self.material.is_some()
            && !self.seasonality.is_empty()
            && self.formality.is_some()
    }
}

/// Tagged classifier outcome, so callers can tell degraded output apart from
/// the model genuinely answering "unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "attributes", rename_all = "snake_case")]
pub enum Classification {
    /// Every attribute field was present in the model's response.
    Full(GarmentAttributes),
    /// The response parsed but some fields were missing or malformed.
    Partial(GarmentAttributes),
    /// The response was not parseable as JSON at all.
    Empty,
}

impl Classification {
    /// Wrap parsed attributes, picking the variant from how complete they are.
    pub fn from_attributes(attrs: GarmentAttributes) -> Self {
        if attrs.is_empty() {
            Classification::Empty
        } else if attrs.is_complete() {
            Classification::Full(attrs)
        } else {
            Classification::Partial(attrs)
        }
    }

    pub fn attributes(&self) -> GarmentAttributes {
        match self {
            Classification::Full(a) | Classification::Partial(a) => a.clone(),
            Classification::Empty => GarmentAttributes::default(),
        }
    }
}
