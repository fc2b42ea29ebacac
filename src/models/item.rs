//! Equipment item model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::ResourceStatus;

/// Equipment item record (projectors, cables, lab kits, ...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub name: String,
    /// Counting unit ("unit", "rim", ...)
    pub unit: String,
    /// Total stock; consumption is derived from approved loans
    pub stock: i32,
    pub status: ResourceStatus,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub unit: String,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub location: Option<String>,
}

/// Update item request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i32>,
    pub status: Option<ResourceStatus>,
    pub location: Option<String>,
}
