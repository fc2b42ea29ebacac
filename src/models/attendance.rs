//! Course attendance slot model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::enums::ResourceStatus;

/// Course attendance slot. Ownership is exclusive and binary: at most one
/// approved loan may reference a slot at any time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceSlot {
    pub id: i32,
    pub course_name: String,
    /// Class label ("A", "B", ...)
    pub class_label: String,
    pub semester: i32,
    pub lecturer: Option<String>,
    pub department: Option<String>,
    pub status: ResourceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create attendance slot request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAttendanceSlot {
    #[validate(length(min = 1, max = 128))]
    pub course_name: String,
    #[validate(length(min = 1, max = 16))]
    pub class_label: String,
    #[validate(range(min = 1, max = 14))]
    pub semester: i32,
    pub lecturer: Option<String>,
    pub department: Option<String>,
}

/// Update attendance slot request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAttendanceSlot {
    #[validate(length(min = 1, max = 128))]
    pub course_name: Option<String>,
    #[validate(length(min = 1, max = 16))]
    pub class_label: Option<String>,
    #[validate(range(min = 1, max = 14))]
    pub semester: Option<i32>,
    pub lecturer: Option<String>,
    pub department: Option<String>,
    pub status: Option<ResourceStatus>,
}
