use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use tokio::time::timeout;
use tracing::debug;

use wardrobot_common::Error;

/// Backdrop the cut-out garment is composited onto. A solid light gray avoids
/// transparency artifacts in downstream display and color detection.
pub const BACKDROP: [u8; 3] = [245, 245, 245];

/// A foreground-segmentation capability: image bytes in, image bytes out,
/// possibly carrying an alpha channel. The real implementation calls a
/// remote model; tests substitute deterministic doubles.
#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn segment(&self, image: &[u8]) -> Result<Vec<u8>, Error>;
}

/// Segmenter backed by a remote HTTP segmentation service (rembg-style API:
/// multipart upload in, PNG with alpha out).
pub struct HttpSegmenter {
    client: reqwest::Client,
    endpoint: String,
    call_timeout: Duration,
}

impl HttpSegmenter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            call_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

#[async_trait]
impl Segmenter for HttpSegmenter {
    async fn segment(&self, image: &[u8]) -> Result<Vec<u8>, Error> {
        let part = reqwest::multipart::Part::bytes(image.to_vec()).file_name("image");
        let form = reqwest::multipart::Form::new().part("file", part);

        // Every failure mode of this stage is a Processing error: the caller
        // distinguishes "bad upload" (Decode) from "segmentation step broke",
        // not transport from protocol.
        let response = timeout(
            self.call_timeout,
            self.client.post(&self.endpoint).multipart(form).send(),
        )
        .await
        .map_err(|_| Error::Processing("segmentation call timed out".to_string()))?
        .map_err(|e| Error::Processing(format!("segmentation call failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Processing(format!(
                "segmentation service returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Processing(format!("segmentation response read failed: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

/// A flattened, backdrop-composited garment image. No alpha channel remains;
/// `png` is the encoded form handed to storage and downstream stages.
#[derive(Debug)]
pub struct ProcessedImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Run foreground segmentation on the raw upload and flatten the result onto
/// the standard backdrop.
///
/// Fails with `Decode` if the input is not a decodable image and with
/// `Processing` if the segmentation step errors; the caller decides whether
/// that is fatal to its pipeline.
pub async fn remove_background(
    segmenter: &dyn Segmenter,
    bytes: &[u8],
) -> Result<ProcessedImage, Error> {
    // Validate the upload before spending a segmentation call on it.
    image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))?;

    let cut_out = segmenter.segment(bytes).await?;
    let decoded = image::load_from_memory(&cut_out)
        .map_err(|e| Error::Processing(format!("segmenter returned undecodable image: {}", e)))?;

    let flattened = if decoded.color().has_alpha() {
        composite_onto_backdrop(&decoded.to_rgba8())
    } else {
        // No transparency to resolve: normalize to RGB and pass through.
        decoded.to_rgb8()
    };

    let (width, height) = flattened.dimensions();
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(flattened)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| Error::Processing(format!("failed to encode processed image: {}", e)))?;

    debug!("background removed: {}x{}, {} bytes", width, height, png.len());
    Ok(ProcessedImage { width, height, png })
}

/// Alpha-blend onto the solid backdrop, using the alpha channel as mask.
fn composite_onto_backdrop(rgba: &image::RgbaImage) -> RgbImage {
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    for (x, y, px) in rgba.enumerate_pixels() {
        let alpha = px[3] as f32 / 255.0;
        let blended = [
            (px[0] as f32 * alpha + BACKDROP[0] as f32 * (1.0 - alpha)).round() as u8,
            (px[1] as f32 * alpha + BACKDROP[1] as f32 * (1.0 - alpha)).round() as u8,
            (px[2] as f32 * alpha + BACKDROP[2] as f32 * (1.0 - alpha)).round() as u8,
        ];
        out.put_pixel(x, y, image::Rgb(blended));
    }
    out
}
