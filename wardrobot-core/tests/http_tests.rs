// tests/http_tests.rs
//
// Direct-CRUD handler behavior around the stored-image invariant: a record's
// image reference must point to an existing file for the record's lifetime.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::Json;
use tokio::sync::Mutex;
use uuid::Uuid;

use wardrobot_ai::{AiClient, GarmentClassifier, VisionProvider};
use wardrobot_common::models::WardrobeItem;
use wardrobot_common::traits::WardrobeItemRepo;
use wardrobot_common::Error;
use wardrobot_core::http::handlers::{create_item, delete_item, CreateItemRequest};
use wardrobot_core::http::AppState;
use wardrobot_core::processing::Segmenter;
use wardrobot_core::services::IngestService;
use wardrobot_core::storage::MediaStore;

struct PassThroughSegmenter;

#[async_trait]
impl Segmenter for PassThroughSegmenter {
    async fn segment(&self, image: &[u8]) -> Result<Vec<u8>, Error> {
        Ok(image.to_vec())
    }
}

struct SilentProvider;

#[async_trait]
impl VisionProvider for SilentProvider {
    fn name(&self) -> &str {
        "silent"
    }

    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok("[]".to_string())
    }

    async fn describe_image(
        &self,
        _prompt: &str,
        _image: &[u8],
        _mime_type: &str,
    ) -> anyhow::Result<String> {
        Ok("{}".to_string())
    }
}

#[derive(Default)]
struct MemoryRepo {
    items: Mutex<Vec<WardrobeItem>>,
}

#[async_trait]
impl WardrobeItemRepo for MemoryRepo {
    async fn create(&self, item: &WardrobeItem) -> Result<(), Error> {
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

fn build_state(dir: &tempfile::TempDir) -> AppState {
    let store = Arc::new(MediaStore::new(dir.path()).unwrap());
    let repo: Arc<dyn WardrobeItemRepo> = Arc::new(MemoryRepo::default());
    let segmenter: Arc<dyn Segmenter> = Arc::new(PassThroughSegmenter);
    let provider: Arc<dyn VisionProvider> = Arc::new(SilentProvider);
    let ingest = Arc::new(IngestService::new(
        segmenter.clone(),
        Arc::new(GarmentClassifier::new(provider.clone())),
        repo.clone(),
        store.clone(),
    ));
    AppState {
        ingest,
        repo,
        store,
        segmenter,
        ai: Arc::new(AiClient::new(provider)),
    }
}

fn create_request(name: &str, image_path: &str) -> CreateItemRequest {
    CreateItemRequest {
        name: name.to_string(),
        category: None,
        subcategory: None,
        material: None,
        seasonality: Vec::new(),
        formality: None,
        color: "#336699".to_string(),
        image_path: image_path.to_string(),
    }
}

#[tokio::test]
async fn create_rejects_missing_stored_image() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(&dir);

    let err = create_item(
        State(state),
        Json(create_request("ghost", "does-not-exist.png")),
    )
    .await
    .err()
    .expect("create should fail");
    assert!(matches!(err.0, Error::Parse(_)));
}

#[tokio::test]
async fn create_rejects_duplicate_image_reference() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(&dir);
    let name = state.store.store(b"png bytes", "png").await.unwrap();

    let (status, _) = create_item(State(state.clone()), Json(create_request("first", &name)))
        .await
        .unwrap();
    assert_eq!(status, axum::http::StatusCode::CREATED);

    let err = create_item(State(state), Json(create_request("second", &name)))
        .await
        .err()
        .expect("duplicate reference should be rejected");
    assert!(matches!(err.0, Error::Parse(_)));
}

#[tokio::test]
async fn delete_removes_the_record_and_its_sole_image() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(&dir);
    let name = state.store.store(b"png bytes", "png").await.unwrap();

    let (_, Json(item)) = create_item(State(state.clone()), Json(create_request("tee", &name)))
        .await
        .unwrap();

    delete_item(State(state.clone()), Path(item.item_id))
        .await
        .unwrap();

    assert!(state.repo.list_all().await.unwrap().is_empty());
    assert!(matches!(
        state.store.read(&name).await,
        Err(Error::NotFound(_))
    ));
}
