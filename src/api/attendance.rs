//! Attendance slot endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::attendance::{AttendanceSlot, CreateAttendanceSlot, UpdateAttendanceSlot},
};

use super::AuthenticatedUser;

/// List all attendance slots
#[utoipa::path(
    get,
    path = "/attendance-slots",
    tag = "attendance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Attendance slot list", body = Vec<AttendanceSlot>)
    )
)]
pub async fn list_attendance_slots(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<AttendanceSlot>>> {
    let slots = state.services.catalog.list_attendance_slots().await?;
    Ok(Json(slots))
}

/// Get attendance slot by ID
#[utoipa::path(
    get,
    path = "/attendance-slots/{id}",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Attendance slot ID")),
    responses(
        (status = 200, description = "Attendance slot details", body = AttendanceSlot),
        (status = 404, description = "Attendance slot not found")
    )
)]
pub async fn get_attendance_slot(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<AttendanceSlot>> {
    let slot = state.services.catalog.get_attendance_slot(id).await?;
    Ok(Json(slot))
}

/// Create attendance slot (staff only)
#[utoipa::path(
    post,
    path = "/attendance-slots",
    tag = "attendance",
    security(("bearer_auth" = [])),
    request_body = CreateAttendanceSlot,
    responses(
        (status = 201, description = "Attendance slot created", body = AttendanceSlot)
    )
)]
pub async fn create_attendance_slot(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAttendanceSlot>,
) -> AppResult<(StatusCode, Json<AttendanceSlot>)> {
    claims.require_staff()?;
    let slot = state.services.catalog.create_attendance_slot(&data).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// Update attendance slot (staff only)
#[utoipa::path(
    put,
    path = "/attendance-slots/{id}",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Attendance slot ID")),
    request_body = UpdateAttendanceSlot,
    responses(
        (status = 200, description = "Attendance slot updated", body = AttendanceSlot),
        (status = 404, description = "Attendance slot not found")
    )
)]
pub async fn update_attendance_slot(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAttendanceSlot>,
) -> AppResult<Json<AttendanceSlot>> {
    claims.require_staff()?;
    let slot = state.services.catalog.update_attendance_slot(id, &data).await?;
    Ok(Json(slot))
}

/// Delete attendance slot (staff only)
#[utoipa::path(
    delete,
    path = "/attendance-slots/{id}",
    tag = "attendance",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Attendance slot ID")),
    responses(
        (status = 204, description = "Attendance slot deleted"),
        (status = 404, description = "Attendance slot not found")
    )
)]
pub async fn delete_attendance_slot(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.catalog.delete_attendance_slot(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
