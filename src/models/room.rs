//! Room model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::ResourceStatus;

/// Bookable room record. Capacity is informational; concurrency is
/// governed by time-window exclusivity, not head count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Room {
    pub id: i32,
    /// Room label ("204", "205", ...)
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
    pub facilities: Option<String>,
    pub status: ResourceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create room request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRoom {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub building: Option<String>,
    pub floor: Option<i32>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub facilities: Option<String>,
}

/// Update room request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRoom {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    pub building: Option<String>,
    pub floor: Option<i32>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
    pub facilities: Option<String>,
    pub status: Option<ResourceStatus>,
}
