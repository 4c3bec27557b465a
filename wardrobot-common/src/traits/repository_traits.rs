use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::models::item::WardrobeItem;

#[async_trait]
pub trait WardrobeItemRepo: Send + Sync {
    async fn create(&self, item: &WardrobeItem) -> Result<(), Error>;
    async fn get(&self, item_id: Uuid) -> Result<Option<WardrobeItem>, Error>;
    async fn update(&self, item: &WardrobeItem) -> Result<(), Error>;
    async fn delete(&self, item_id: Uuid) -> Result<(), Error>;
    async fn list_all(&self) -> Result<Vec<WardrobeItem>, Error>;

    /// Substring search over name, category, subcategory and color.
    async fn search(&self, query: &str) -> Result<Vec<WardrobeItem>, Error>;
}
