//! Attendance slots repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::attendance::{AttendanceSlot, CreateAttendanceSlot, UpdateAttendanceSlot},
};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: Pool<Postgres>,
}

impl AttendanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all attendance slots
    pub async fn list(&self) -> AppResult<Vec<AttendanceSlot>> {
        let rows = sqlx::query_as::<_, AttendanceSlot>(
            "SELECT * FROM attendance_slots ORDER BY course_name, class_label",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get attendance slot by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<AttendanceSlot> {
        sqlx::query_as::<_, AttendanceSlot>("SELECT * FROM attendance_slots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attendance slot {} not found", id)))
    }

    /// Create attendance slot
    pub async fn create(&self, data: &CreateAttendanceSlot) -> AppResult<AttendanceSlot> {
        let row = sqlx::query_as::<_, AttendanceSlot>(
            r#"
            INSERT INTO attendance_slots (course_name, class_label, semester, lecturer, department)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.course_name)
        .bind(&data.class_label)
        .bind(data.semester)
        .bind(&data.lecturer)
        .bind(&data.department)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Update attendance slot
    pub async fn update(&self, id: i32, data: &UpdateAttendanceSlot) -> AppResult<AttendanceSlot> {
        let current = self.get_by_id(id).await?;

        let row = sqlx::query_as::<_, AttendanceSlot>(
            r#"
            UPDATE attendance_slots
            SET course_name = $1, class_label = $2, semester = $3,
                lecturer = $4, department = $5, status = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(data.course_name.as_ref().unwrap_or(&current.course_name))
        .bind(data.class_label.as_ref().unwrap_or(&current.class_label))
        .bind(data.semester.unwrap_or(current.semester))
        .bind(data.lecturer.as_ref().or(current.lecturer.as_ref()))
        .bind(data.department.as_ref().or(current.department.as_ref()))
        .bind(data.status.unwrap_or(current.status))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Delete attendance slot
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM attendance_slots WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Attendance slot {} not found", id)));
        }
        Ok(())
    }
}
