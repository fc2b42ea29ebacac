//! Catalog service: items, rooms, and attendance slots

use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::attendance::{AttendanceSlot, CreateAttendanceSlot, UpdateAttendanceSlot},
    models::item::{CreateItem, Item, UpdateItem},
    models::room::{CreateRoom, Room, UpdateRoom},
    repository::Repository,
};

/// Everything a student may currently request, grouped by kind
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableResources {
    pub items: Vec<Item>,
    pub rooms: Vec<Room>,
    pub attendance_slots: Vec<AttendanceSlot>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // ---- Items ----

    pub async fn list_items(&self) -> AppResult<Vec<Item>> {
        self.repository.items.list().await
    }

    pub async fn get_item(&self, id: i32) -> AppResult<Item> {
        self.repository.items.get_by_id(id).await
    }

    pub async fn create_item(&self, data: &CreateItem) -> AppResult<Item> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.items.create(data).await
    }

    pub async fn update_item(&self, id: i32, data: &UpdateItem) -> AppResult<Item> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.items.update(id, data).await
    }

    pub async fn delete_item(&self, id: i32) -> AppResult<()> {
        self.repository.items.delete(id).await
    }

    // ---- Rooms ----

    pub async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        self.repository.rooms.list().await
    }

    pub async fn get_room(&self, id: i32) -> AppResult<Room> {
        self.repository.rooms.get_by_id(id).await
    }

    pub async fn create_room(&self, data: &CreateRoom) -> AppResult<Room> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.rooms.create(data).await
    }

    pub async fn update_room(&self, id: i32, data: &UpdateRoom) -> AppResult<Room> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.rooms.update(id, data).await
    }

    pub async fn delete_room(&self, id: i32) -> AppResult<()> {
        self.repository.rooms.delete(id).await
    }

    // ---- Attendance slots ----

    pub async fn list_attendance_slots(&self) -> AppResult<Vec<AttendanceSlot>> {
        self.repository.attendance.list().await
    }

    pub async fn get_attendance_slot(&self, id: i32) -> AppResult<AttendanceSlot> {
        self.repository.attendance.get_by_id(id).await
    }

    pub async fn create_attendance_slot(&self, data: &CreateAttendanceSlot) -> AppResult<AttendanceSlot> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.attendance.create(data).await
    }

    pub async fn update_attendance_slot(
        &self,
        id: i32,
        data: &UpdateAttendanceSlot,
    ) -> AppResult<AttendanceSlot> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.attendance.update(id, data).await
    }

    pub async fn delete_attendance_slot(&self, id: i32) -> AppResult<()> {
        self.repository.attendance.delete(id).await
    }

    /// Aggregate view of what can be requested right now
    pub async fn available_resources(&self) -> AppResult<AvailableResources> {
        Ok(AvailableResources {
            items: self.repository.items.list_available().await?,
            rooms: self.repository.rooms.list_available().await?,
            attendance_slots: self.repository.attendance.list().await?,
        })
    }
}
