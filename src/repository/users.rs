//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::enums::Role,
    models::user::User,
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by nim
    pub async fn get_by_nim(&self, nim: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE nim = $1")
            .bind(nim)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Create a user with an already-hashed access code
    pub async fn create(
        &self,
        nim: &str,
        name: &str,
        role: Role,
        access_code_hash: &str,
    ) -> AppResult<User> {
        let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE nim = $1")
            .bind(nim)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!("nim {} is already registered", nim)));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (nim, name, role, access_code_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(nim)
        .bind(name)
        .bind(role)
        .bind(access_code_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
