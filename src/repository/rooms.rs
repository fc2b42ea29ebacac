//! Rooms repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::room::{CreateRoom, Room, UpdateRoom},
};

#[derive(Clone)]
pub struct RoomsRepository {
    pool: Pool<Postgres>,
}

impl RoomsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all rooms
    pub async fn list(&self) -> AppResult<Vec<Room>> {
        let rows = sqlx::query_as::<_, Room>("SELECT * FROM rooms ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// List bookable rooms
    pub async fn list_available(&self) -> AppResult<Vec<Room>> {
        let rows = sqlx::query_as::<_, Room>(
            "SELECT * FROM rooms WHERE status = 'available' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get room by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Room> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Room {} not found", id)))
    }

    /// Create room
    pub async fn create(&self, data: &CreateRoom) -> AppResult<Room> {
        let row = sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (name, building, floor, capacity, facilities)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.building)
        .bind(data.floor)
        .bind(data.capacity)
        .bind(&data.facilities)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update room
    pub async fn update(&self, id: i32, data: &UpdateRoom) -> AppResult<Room> {
        let current = self.get_by_id(id).await?;

        let row = sqlx::query_as::<_, Room>(
            r#"
            UPDATE rooms
            SET name = $1, building = $2, floor = $3, capacity = $4,
                facilities = $5, status = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(data.name.as_ref().unwrap_or(&current.name))
        .bind(data.building.as_ref().or(current.building.as_ref()))
        .bind(data.floor.or(current.floor))
        .bind(data.capacity.or(current.capacity))
        .bind(data.facilities.as_ref().or(current.facilities.as_ref()))
        .bind(data.status.unwrap_or(current.status))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete room
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Room {} not found", id)));
        }
        Ok(())
    }
}
