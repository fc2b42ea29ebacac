//! Items repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::item::{CreateItem, Item, UpdateItem},
};

#[derive(Clone)]
pub struct ItemsRepository {
    pool: Pool<Postgres>,
}

impl ItemsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all items
    pub async fn list(&self) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// List items a student may request: available status and stock left
    pub async fn list_available(&self) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE status = 'available' AND stock > 0 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get item by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Item> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", id)))
    }

    /// Create item
    pub async fn create(&self, data: &CreateItem) -> AppResult<Item> {
        let row = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, unit, stock, location)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.unit)
        .bind(data.stock)
        .bind(&data.location)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update item
    pub async fn update(&self, id: i32, data: &UpdateItem) -> AppResult<Item> {
        let current = self.get_by_id(id).await?;

        let row = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = $1, unit = $2, stock = $3, status = $4, location = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(data.name.as_ref().unwrap_or(&current.name))
        .bind(data.unit.as_ref().unwrap_or(&current.unit))
        .bind(data.stock.unwrap_or(current.stock))
        .bind(data.status.unwrap_or(current.status))
        .bind(data.location.as_ref().or(current.location.as_ref()))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete item
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Item {} not found", id)));
        }
        Ok(())
    }
}
