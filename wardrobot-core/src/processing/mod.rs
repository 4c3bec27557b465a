// src/processing/mod.rs
//
// Image pipeline stages: background removal/compositing and dominant-color
// extraction. Both operate on encoded image bytes so stages can be chained
// or exposed individually over HTTP.

pub mod palette;
pub mod segment;

pub use palette::extract_palette;
pub use segment::{remove_background, HttpSegmenter, ProcessedImage, Segmenter};
