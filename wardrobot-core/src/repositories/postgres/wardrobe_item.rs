// src/repositories/postgres/wardrobe_item.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use wardrobot_common::models::WardrobeItem;
use wardrobot_common::traits::WardrobeItemRepo;
use wardrobot_common::Error;

pub struct WardrobeItemRepository {
    pub pool: Pool<Postgres>,
}

impl WardrobeItemRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WardrobeItemRepo for WardrobeItemRepository {
    async fn create(&self, item: &WardrobeItem) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO wardrobe_items (
                item_id, name, category, subcategory, material,
                seasonality, formality, color, image_path, in_laundry,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(item.item_id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.subcategory)
        .bind(&item.material)
        .bind(&item.seasonality)
        .bind(&item.formality)
        .bind(&item.color)
        .bind(&item.image_path)
        .bind(item.in_laundry)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, item_id: Uuid) -> Result<Option<WardrobeItem>, Error> {
        let row = sqlx::query_as::<_, WardrobeItem>(
            r#"
            SELECT item_id, name, category, subcategory, material,
                   seasonality, formality, color, image_path, in_laundry,
                   created_at, updated_at
            FROM wardrobe_items
            WHERE item_id = $1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, item: &WardrobeItem) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE wardrobe_items
            SET name = $1,
                category = $2,
                subcategory = $3,
                material = $4,
                seasonality = $5,
                formality = $6,
                color = $7,
                image_path = $8,
                in_laundry = $9,
                updated_at = $10
            WHERE item_id = $11
            "#,
        )
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.subcategory)
        .bind(&item.material)
        .bind(&item.seasonality)
        .bind(&item.formality)
        .bind(&item.color)
        .bind(&item.image_path)
        .bind(item.in_laundry)
        .bind(Utc::now())
        .bind(item.item_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, item_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM wardrobe_items WHERE item_id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<WardrobeItem>, Error> {
        let rows = sqlx::query_as::<_, WardrobeItem>(
            r#"
            SELECT item_id, name, category, subcategory, material,
                   seasonality, formality, color, image_path, in_laundry,
                   created_at, updated_at
            FROM wardrobe_items
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn search(&self, query: &str) -> Result<Vec<WardrobeItem>, Error> {
        let pattern = format!("%{}%", query);
        let rows = sqlx::query_as::<_, WardrobeItem>(
            r#"
            SELECT item_id, name, category, subcategory, material,
                   seasonality, formality, color, image_path, in_laundry,
                   created_at, updated_at
            FROM wardrobe_items
            WHERE name ILIKE $1
               OR category ILIKE $1
               OR subcategory ILIKE $1
               OR color ILIKE $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
