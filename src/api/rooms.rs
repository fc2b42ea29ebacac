//! Room endpoints: catalog CRUD, schedules, and booking-window checks

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    arbitration::ScheduleEntry,
    error::AppResult,
    models::loan::RoomBooking,
    models::room::{CreateRoom, Room, UpdateRoom},
};

use super::AuthenticatedUser;

/// Query parameters for a room's schedule
#[derive(Debug, Deserialize, IntoParams)]
pub struct ScheduleQuery {
    /// Date to inspect (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// Proposed booking window to check against a room's schedule
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckWindowRequest {
    /// Date of the proposed booking (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Proposed start time, zero-padded 24-hour "HH:MM"
    pub starts_at: String,
    /// Proposed end time, zero-padded 24-hour "HH:MM"
    pub ends_at: String,
}

/// Window check verdict with every overlapping booking
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckWindowResponse {
    pub conflict: bool,
    pub conflicts: Vec<ScheduleEntry>,
}

/// List all rooms
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "rooms",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Room list", body = Vec<Room>)
    )
)]
pub async fn list_rooms(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Room>>> {
    let rooms = state.services.catalog.list_rooms().await?;
    Ok(Json(rooms))
}

/// Get room by ID
#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room details", body = Room),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Room>> {
    let room = state.services.catalog.get_room(id).await?;
    Ok(Json(room))
}

/// Create room (staff only)
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    security(("bearer_auth" = [])),
    request_body = CreateRoom,
    responses(
        (status = 201, description = "Room created", body = Room)
    )
)]
pub async fn create_room(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRoom>,
) -> AppResult<(StatusCode, Json<Room>)> {
    claims.require_staff()?;
    let room = state.services.catalog.create_room(&data).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// Update room (staff only)
#[utoipa::path(
    put,
    path = "/rooms/{id}",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Room ID")),
    request_body = UpdateRoom,
    responses(
        (status = 200, description = "Room updated", body = Room),
        (status = 404, description = "Room not found")
    )
)]
pub async fn update_room(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateRoom>,
) -> AppResult<Json<Room>> {
    claims.require_staff()?;
    let room = state.services.catalog.update_room(id, &data).await?;
    Ok(Json(room))
}

/// Delete room (staff only)
#[utoipa::path(
    delete,
    path = "/rooms/{id}",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Room ID")),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn delete_room(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_staff()?;
    state.services.catalog.delete_room(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pending and approved bookings of a room for one date
#[utoipa::path(
    get,
    path = "/rooms/{id}/schedule",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Room ID"),
        ScheduleQuery
    ),
    responses(
        (status = 200, description = "Bookings for the date", body = Vec<RoomBooking>),
        (status = 404, description = "Room not found")
    )
)]
pub async fn room_schedule(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Query(query): Query<ScheduleQuery>,
) -> AppResult<Json<Vec<RoomBooking>>> {
    let bookings = state.services.loans.room_schedule(id, query.date).await?;
    Ok(Json(bookings))
}

/// Check a proposed booking window before submitting a request.
/// Cheap and side-effect free; meant to be called as the requester edits
/// the time fields.
#[utoipa::path(
    post,
    path = "/rooms/{id}/schedule/check",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Room ID")),
    request_body = CheckWindowRequest,
    responses(
        (status = 200, description = "Window check verdict", body = CheckWindowResponse),
        (status = 400, description = "Malformed or inverted time window"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn check_window(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<CheckWindowRequest>,
) -> AppResult<Json<CheckWindowResponse>> {
    let conflicts = state
        .services
        .loans
        .check_room_window(id, request.date, &request.starts_at, &request.ends_at)
        .await?;

    Ok(Json(CheckWindowResponse {
        conflict: !conflicts.is_empty(),
        conflicts,
    }))
}
