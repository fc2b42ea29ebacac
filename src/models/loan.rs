//! Loan request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::enums::{LoanStatus, ResourceKind};
use crate::error::AppError;

/// Loan request model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanRequest {
    pub id: i32,
    pub user_id: i32,
    pub request_date: NaiveDate,
    pub status: LoanStatus,
    pub approved_by: Option<i32>,
    /// Pickup code generated when the request is approved
    pub verification_code: Option<String>,
    /// Free-text justification supplied by the requester
    pub notes: Option<String>,
    /// Reason recorded by staff on rejection
    pub rejection_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat loan detail row as stored. The kind-specific columns are nullable;
/// which of them must be present depends on `resource_kind`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetailRow {
    pub id: i32,
    pub request_id: i32,
    pub resource_kind: ResourceKind,
    pub resource_id: i32,
    pub quantity: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Kind-specific payload of a loan detail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPayload {
    /// Discrete-stock equipment: how many units are requested
    Item { quantity: i32 },
    /// Time-sliced room booking, absolute instants so cross-midnight
    /// windows compare correctly
    Room {
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
    /// Exclusive, binary ownership; no quantity or time payload
    AttendanceSlot,
}

impl DetailPayload {
    pub fn kind(&self) -> ResourceKind {
        match self {
            DetailPayload::Item { .. } => ResourceKind::Item,
            DetailPayload::Room { .. } => ResourceKind::Room,
            DetailPayload::AttendanceSlot => ResourceKind::AttendanceSlot,
        }
    }
}

/// Domain view of a loan detail with the payload decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanDetail {
    pub id: i32,
    pub resource_id: i32,
    pub payload: DetailPayload,
}

impl TryFrom<LoanDetailRow> for LoanDetail {
    type Error = AppError;

    fn try_from(row: LoanDetailRow) -> Result<Self, Self::Error> {
        let payload = match row.resource_kind {
            ResourceKind::Item => {
                let quantity = row.quantity.filter(|q| *q > 0).ok_or_else(|| {
                    AppError::Internal(format!(
                        "loan detail {} is item-kind but has no positive quantity",
                        row.id
                    ))
                })?;
                DetailPayload::Item { quantity }
            }
            ResourceKind::Room => {
                let (starts_at, ends_at) = match (row.starts_at, row.ends_at) {
                    (Some(s), Some(e)) if s < e => (s, e),
                    _ => {
                        return Err(AppError::Internal(format!(
                            "loan detail {} is room-kind but has no valid time window",
                            row.id
                        )))
                    }
                };
                DetailPayload::Room { starts_at, ends_at }
            }
            ResourceKind::AttendanceSlot => DetailPayload::AttendanceSlot,
        };

        Ok(LoanDetail {
            id: row.id,
            resource_id: row.resource_id,
            payload,
        })
    }
}

/// Loan detail enriched with the referenced resource's display name,
/// for API responses
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetailView {
    pub id: i32,
    pub resource_kind: ResourceKind,
    pub resource_id: i32,
    /// None if the resource has been deleted since submission
    pub resource_name: Option<String>,
    pub quantity: Option<i32>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

/// Loan request with requester/approver info and details, for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanRequestDetails {
    pub id: i32,
    pub user_id: i32,
    pub user_nim: Option<String>,
    pub user_name: Option<String>,
    pub request_date: NaiveDate,
    pub status: LoanStatus,
    pub approver_name: Option<String>,
    pub verification_code: Option<String>,
    pub notes: Option<String>,
    pub rejection_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub details: Vec<LoanDetailView>,
}

/// One booking on a room's schedule for a given date
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RoomBooking {
    pub request_id: i32,
    pub user_id: i32,
    /// Display name of the requester holding the booking
    pub booked_by: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: LoanStatus,
}

/// Create loan request (one or more details)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Requested loan date (YYYY-MM-DD)
    pub request_date: NaiveDate,
    pub notes: Option<String>,
    pub details: Vec<CreateLoanDetail>,
}

/// Create loan detail; kind-specific fields are validated at submission
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoanDetail {
    pub resource_kind: ResourceKind,
    pub resource_id: i32,
    /// Required for item kind, forbidden otherwise
    pub quantity: Option<i32>,
    /// Required for room kind, forbidden otherwise
    pub starts_at: Option<DateTime<Utc>>,
    /// Required for room kind, forbidden otherwise
    pub ends_at: Option<DateTime<Utc>>,
}

/// Staff filter parameters for listing loan requests
#[derive(Debug, Deserialize, utoipa::IntoParams, ToSchema)]
pub struct LoanRequestQuery {
    pub status: Option<LoanStatus>,
    /// Filter requests from this date (inclusive)
    pub date_from: Option<NaiveDate>,
    /// Filter requests to this date (inclusive)
    pub date_to: Option<NaiveDate>,
}

/// Rejection request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Reason shown to the requester
    pub reason: String,
}
