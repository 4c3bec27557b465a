use serde::{Deserialize, Serialize};

/// One dominant-color entry: centroid RGB, its hex form, and the fraction of
/// clustered pixels assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSample {
    pub rgb: [u8; 3],
    pub hex: String,
    pub frequency: f32,
}

impl ColorSample {
    pub fn new(rgb: [u8; 3], frequency: f32) -> Self {
        Self {
            hex: rgb_to_hex(rgb),
            rgb,
            frequency,
        }
    }

    /// Plain white at full weight, used wherever palette extraction cannot
    /// produce a real result.
    pub fn white() -> Self {
        Self::new([255, 255, 255], 1.0)
    }
}

/// Dominant colors of an image, ranked descending by frequency.
pub type Palette = Vec<ColorSample>;

pub fn rgb_to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}
