// tests/pipeline_tests.rs
//
// End-to-end ingestion runs with deterministic doubles standing in for the
// segmentation service, the generative model, and the relational store.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tokio::sync::Mutex;
use uuid::Uuid;

use wardrobot_ai::{GarmentClassifier, VisionProvider};
use wardrobot_common::models::{Classification, WardrobeItem};
use wardrobot_common::traits::WardrobeItemRepo;
use wardrobot_common::Error;
use wardrobot_core::processing::Segmenter;
use wardrobot_core::services::IngestService;
use wardrobot_core::storage::MediaStore;

fn png_bytes(img: RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

fn red_square() -> Vec<u8> {
    png_bytes(RgbImage::from_pixel(64, 64, Rgb([255, 0, 0])))
}

/// Segmenter double that treats the whole image as foreground.
struct PassThroughSegmenter;

#[async_trait]
impl Segmenter for PassThroughSegmenter {
    async fn segment(&self, image: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(image.to_vec())
    }
}

/// Provider double returning a canned response.
struct CannedProvider {
    response: String,
}

impl CannedProvider {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

#[async_trait]
impl VisionProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.response.clone())
    }

    async fn describe_image(
        &self,
        _prompt: &str,
        _image: &[u8],
        _mime_type: &str,
    ) -> anyhow::Result<String> {
        Ok(self.response.clone())
    }
}

/// Provider double that fails at the transport level.
struct UnreachableProvider;

#[async_trait]
impl VisionProvider for UnreachableProvider {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("connection refused"))
    }

    async fn describe_image(
        &self,
        _prompt: &str,
        _image: &[u8],
        _mime_type: &str,
    ) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("connection refused"))
    }
}

/// In-memory repository double.
#[derive(Default)]
struct MemoryRepo {
    items: Mutex<Vec<WardrobeItem>>,
    fail_create: bool,
}

impl MemoryRepo {
    fn failing() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            fail_create: true,
        }
    }
}

#[async_trait]
impl WardrobeItemRepo for MemoryRepo {
    async fn create(&self, item: &WardrobeItem) -> Result<(), Error> {
        if self.fail_create {
            return Err(Error::Storage("insert failed".to_string()));
        }
        self.items.lock().await.push(item.clone());
        Ok(())
    }

    async fn get(&self, item_id: Uuid) -> Result<Option<WardrobeItem>, Error> {
        Ok(self
            .items
            .lock()
            .await
            .iter()
            .find(|i| i.item_id == item_id)
            .cloned())
    }

    async fn update(&self, item: &WardrobeItem) -> Result<(), Error> {
        let mut items = self.items.lock().await;
        if let Some(existing) = items.iter_mut().find(|i| i.item_id == item.item_id) {
            *existing = item.clone();
        }
        Ok(())
    }

    async fn delete(&self, item_id: Uuid) -> Result<(), Error> {
        self.items.lock().await.retain(|i| i.item_id != item_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<WardrobeItem>, Error> {
        Ok(self.items.lock().await.clone())
    }

    async fn search(&self, query: &str) -> Result<Vec<WardrobeItem>, Error> {
        Ok(self
            .items
            .lock()
            .await
            .iter()
            .filter(|i| i.name.contains(query))
            .cloned()
            .collect())
    }
}

const GOOD_RESPONSE: &str = r#"```json
{
  "category": "top",
  "subcategory": "t-shirt",
  "material": "cotton",
  "seasonality": ["Summer"],
  "formality": "casual"
}
```"#;

struct Fixture {
    service: IngestService,
    repo: Arc<MemoryRepo>,
    store: Arc<MediaStore>,
    _dir: tempfile::TempDir,
}

fn build_fixture(provider: Arc<dyn VisionProvider>, repo: MemoryRepo) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MediaStore::new(dir.path()).unwrap());
    let repo = Arc::new(repo);
    let service = IngestService::new(
        Arc::new(PassThroughSegmenter),
        Arc::new(GarmentClassifier::new(provider)),
        repo.clone(),
        store.clone(),
    );
    Fixture {
        service,
        repo,
        store,
        _dir: dir,
    }
}

fn stored_file_count(store: &MediaStore) -> usize {
    std::fs::read_dir(store.root()).unwrap().count()
}

#[tokio::test]
async fn ingest_red_square_produces_red_item_and_stored_file() {
    let fx = build_fixture(
        Arc::new(CannedProvider::new(GOOD_RESPONSE)),
        MemoryRepo::default(),
    );

    let outcome = fx.service.ingest(&red_square(), "favorite tee").await.unwrap();

    // Canonical color should stay red-adjacent after compositing.
    let rgb = outcome.palette[0].rgb;
    assert!(rgb[0] > 180 && rgb[1] < 60 && rgb[2] < 60, "got {:?}", rgb);
    assert_eq!(outcome.color, outcome.palette[0].hex);

    assert!(matches!(outcome.classification, Classification::Full(_)));
    assert_eq!(outcome.item.category.as_deref(), Some("top"));
    assert_eq!(outcome.item.name, "favorite tee");

    // The image reference resolves to a readable file.
    let stored = fx.store.read(&outcome.image_path).await.unwrap();
    assert!(!stored.is_empty());

    let items = fx.repo.list_all().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].image_path, outcome.image_path);
}

#[tokio::test]
async fn undecodable_upload_creates_nothing() {
    let fx = build_fixture(
        Arc::new(CannedProvider::new(GOOD_RESPONSE)),
        MemoryRepo::default(),
    );

    let err = fx
        .service
        .ingest(b"this is not an image", "mystery item")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
    assert!(fx.repo.list_all().await.unwrap().is_empty());
    assert_eq!(stored_file_count(&fx.store), 0);
}

#[tokio::test]
async fn unparseable_ai_output_still_creates_an_uncategorized_item() {
    let fx = build_fixture(
        Arc::new(CannedProvider::new("no JSON here, sorry")),
        MemoryRepo::default(),
    );

    let outcome = fx.service.ingest(&red_square(), "plain shirt").await.unwrap();

    assert_eq!(outcome.classification, Classification::Empty);
    assert!(outcome.item.category.is_none());
    assert!(outcome.item.seasonality.is_empty());
    // The upload itself still succeeded.
    assert_eq!(fx.repo.list_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn ai_transport_failure_aborts_and_leaves_no_orphan_file() {
    let fx = build_fixture(Arc::new(UnreachableProvider), MemoryRepo::default());

    let err = fx.service.ingest(&red_square(), "shirt").await.unwrap_err();

    assert!(matches!(err, Error::ClassificationTransport(_)));
    assert!(fx.repo.list_all().await.unwrap().is_empty());
    assert_eq!(stored_file_count(&fx.store), 0);
}

#[tokio::test]
async fn record_insert_failure_cleans_up_the_stored_file() {
    let fx = build_fixture(
        Arc::new(CannedProvider::new(GOOD_RESPONSE)),
        MemoryRepo::failing(),
    );

    let err = fx.service.ingest(&red_square(), "shirt").await.unwrap_err();

    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(stored_file_count(&fx.store), 0);
}

#[tokio::test]
async fn concurrent_ingests_with_the_same_name_do_not_collide() {
    let fx = Arc::new(build_fixture(
        Arc::new(CannedProvider::new(GOOD_RESPONSE)),
        MemoryRepo::default(),
    ));

    let blue = png_bytes(RgbImage::from_pixel(64, 64, Rgb([0, 0, 255])));
    let red = red_square();

    let fx_a = fx.clone();
    let fx_b = fx.clone();
    let (a, b) = tokio::join!(
        async move { fx_a.service.ingest(&red, "jacket").await },
        async move { fx_b.service.ingest(&blue, "jacket").await },
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.image_path, b.image_path);
    assert_ne!(a.item.item_id, b.item.item_id);

    let items = fx.repo.list_all().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(stored_file_count(&fx.store), 2);
}
