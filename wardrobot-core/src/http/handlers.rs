use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use wardrobot_common::models::{Classification, Palette, WardrobeItem};
use wardrobot_common::Error;

use crate::processing::{extract_palette, remove_background};
use crate::services::IngestOutcome;

use super::{ApiError, AppState};

/// Body returned by a successful ingestion.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub item: WardrobeItem,
    pub classification: Classification,
    pub color: String,
    pub palette: Palette,
    pub image_url: String,
}

impl From<IngestOutcome> for IngestResponse {
    fn from(outcome: IngestOutcome) -> Self {
        Self {
            image_url: format!("/media/{}", outcome.image_path),
            item: outcome.item,
            classification: outcome.classification,
            color: outcome.color,
            palette: outcome.palette,
        }
    }
}

/// Pull the image bytes (field "image") and optional text fields out of a
/// multipart upload.
async fn read_upload(mut multipart: Multipart) -> Result<(Vec<u8>, Option<String>), Error> {
    let mut image: Option<Vec<u8>> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Parse(format!("bad multipart body: {}", e)))?
    {
        match field.name() {
            Some("image") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Parse(format!("failed reading upload: {}", e)))?;
                image = Some(bytes.to_vec());
            }
            Some("name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::Parse(format!("failed reading name field: {}", e)))?;
                name = Some(text);
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| Error::Parse("missing 'image' field".to_string()))?;
    Ok((image, name))
}

pub async fn ingest_item(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    let (image, name) = read_upload(multipart).await?;
    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| Error::Parse("missing 'name' field".to_string()))?;

    let outcome = state.ingest.ingest(&image, name.trim()).await?;
    Ok((StatusCode::CREATED, Json(outcome.into())))
}

#[derive(Debug, Deserialize)]
pub struct PaletteQuery {
    #[serde(default = "default_palette_size")]
    pub k: usize,
}

fn default_palette_size() -> usize {
    5
}

pub async fn extract_image_palette(
    Query(query): Query<PaletteQuery>,
    multipart: Multipart,
) -> Result<Json<Palette>, ApiError> {
    let (image, _) = read_upload(multipart).await?;
    Ok(Json(extract_palette(&image, query.k.clamp(1, 32))))
}

pub async fn remove_image_background(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (image, _) = read_upload(multipart).await?;
    let processed = remove_background(state.segmenter.as_ref(), &image).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], processed.png))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<WardrobeItem>>, ApiError> {
    let items = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => state.repo.search(q).await?,
        None => state.repo.list_all().await?,
    };
    Ok(Json(items))
}

/// Direct CRUD create, bypassing the pipeline. The image must already live in
/// the media store so the record never references a missing file.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub seasonality: Vec<String>,
    #[serde(default)]
    pub formality: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    pub image_path: String,
}

fn default_color() -> String {
    "#ffffff".to_string()
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(req): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<WardrobeItem>), ApiError> {
    let path = state.store.path(&req.image_path)?;
    if !path.is_file() {
        return Err(Error::Parse(format!(
            "image_path '{}' does not reference a stored image",
            req.image_path
        ))
        .into());
    }

    // One record per stored image. Deletion removes the file, so a shared
    // reference would strand whichever record survived.
    let existing = state.repo.list_all().await?;
    if existing.iter().any(|i| i.image_path == req.image_path) {
        return Err(Error::Parse(format!(
            "image_path '{}' is already referenced by another item",
            req.image_path
        ))
        .into());
    }

    let attrs = wardrobot_common::models::GarmentAttributes {
        category: req.category,
        subcategory: req.subcategory,
        material: req.material,
        seasonality: req.seasonality,
        formality: req.formality,
    };
    let item = WardrobeItem::new(&req.name, &attrs, &req.color, &req.image_path);
    state.repo.create(&item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WardrobeItem>, ApiError> {
    let item = state
        .repo
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no item {}", id)))?;
    Ok(Json(item))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub material: Option<String>,
    pub seasonality: Option<Vec<String>>,
    pub formality: Option<String>,
    pub color: Option<String>,
    pub in_laundry: Option<bool>,
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<WardrobeItem>, ApiError> {
    let mut item = state
        .repo
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no item {}", id)))?;

    if let Some(name) = req.name {
        item.name = name;
    }
    if let Some(category) = req.category {
        item.category = Some(category);
    }
    if let Some(subcategory) = req.subcategory {
        item.subcategory = Some(subcategory);
    }
    if let Some(material) = req.material {
        item.material = Some(material);
    }
    if let Some(seasonality) = req.seasonality {
        item.seasonality = seasonality;
    }
    if let Some(formality) = req.formality {
        item.formality = Some(formality);
    }
    if let Some(color) = req.color {
        item.color = color;
    }
    if let Some(in_laundry) = req.in_laundry {
        item.in_laundry = in_laundry;
    }

    state.repo.update(&item).await?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let item = state
        .repo
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no item {}", id)))?;

    state.repo.delete(id).await?;
    // The record is gone, so its image no longer has an owner.
    state.store.remove(&item.image_path).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct OutfitRequest {
    pub occasion: String,
    #[serde(default)]
    pub weather: String,
}

pub async fn suggest_outfits(
    State(state): State<AppState>,
    Json(req): Json<OutfitRequest>,
) -> Result<Json<Vec<serde_json::Value>>, ApiError> {
    let wardrobe = state.repo.list_all().await?;
    let suggestions = state
        .ai
        .suggest_outfits(&wardrobe, &req.occasion, &req.weather)
        .await?;
    Ok(Json(suggestions))
}

pub async fn serve_media(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state.store.read(&name).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}
