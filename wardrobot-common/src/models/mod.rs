// File: wardrobot-common/src/models/mod.rs
pub mod attributes;
pub mod color;
pub mod item;

pub use attributes::{Classification, GarmentAttributes};
pub use color::{ColorSample, Palette};
pub use item::WardrobeItem;
