use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use wardrobot_ai::GarmentClassifier;
use wardrobot_common::models::{Classification, ColorSample, Palette, WardrobeItem};
use wardrobot_common::traits::WardrobeItemRepo;
use wardrobot_common::Error;

use crate::processing::{extract_palette, remove_background, Segmenter};
use crate::storage::MediaStore;

/// Everything one successful ingestion produced: the persisted record plus
/// the intermediate artifacts callers want to echo back.
#[derive(Debug, Serialize)]
pub struct IngestOutcome {
    pub item: WardrobeItem,
    pub classification: Classification,
    pub palette: Palette,
    pub color: String,
    pub image_path: String,
}

/// Orchestrates the upload pipeline: background removal, image persistence,
/// palette extraction, AI classification, record insertion — strictly in that
/// order, each stage consuming the previous stage's output.
pub struct IngestService {
    segmenter: Arc<dyn Segmenter>,
    classifier: Arc<GarmentClassifier>,
    repo: Arc<dyn WardrobeItemRepo>,
    store: Arc<MediaStore>,
    palette_size: usize,
}

impl IngestService {
    pub fn new(
        segmenter: Arc<dyn Segmenter>,
        classifier: Arc<GarmentClassifier>,
        repo: Arc<dyn WardrobeItemRepo>,
        store: Arc<MediaStore>,
    ) -> Self {
        Self {
            segmenter,
            classifier,
            repo,
            store,
            palette_size: 5,
        }
    }

    pub fn with_palette_size(mut self, palette_size: usize) -> Self {
        self.palette_size = palette_size;
        self
    }

    /// Ingest one uploaded image under the given item name.
    ///
    /// Background removal and storage failures are fatal. Palette extraction
    /// never fails (degrades to white). Classifier parse trouble degrades to
    /// empty attributes inside the classifier; only a transport failure to
    /// the AI service aborts the request. Any failure after the file write
    /// deletes the stored file so no orphan is left behind.
    ///
    /// Not idempotent: re-ingesting the same bytes creates a new file and a
    /// new record.
    pub async fn ingest(&self, bytes: &[u8], name: &str) -> Result<IngestOutcome, Error> {
        let processed = remove_background(self.segmenter.as_ref(), bytes).await?;

        let image_path = self.store.store(&processed.png, "png").await?;
        info!("stored processed image for '{}' as {}", name, image_path);

        let palette = extract_palette(&processed.png, self.palette_size);
        let color = palette
            .first()
            .map(|s| s.hex.clone())
            .unwrap_or_else(|| ColorSample::white().hex);

        let classification = match self.classifier.classify(&processed.png).await {
            Ok(c) => c,
            Err(e) => {
                self.store.remove(&image_path).await;
                return Err(e);
            }
        };
        if classification == Classification::Empty {
            warn!("classifier produced no attributes for '{}'", name);
        }

        let item = WardrobeItem::new(name, &classification.attributes(), &color, &image_path);
        if let Err(e) = self.repo.create(&item).await {
            self.store.remove(&image_path).await;
            return Err(e);
        }

        info!(
            "ingested '{}' as {} (color {}, {} palette entries)",
            name,
            item.item_id,
            color,
            palette.len()
        );
        Ok(IngestOutcome {
            item,
            classification,
            palette,
            color,
            image_path,
        })
    }
}
