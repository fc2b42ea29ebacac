//! Loan request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    arbitration::Conflict,
    error::AppResult,
    models::enums::LoanStatus,
    models::loan::{CreateLoanRequest, LoanRequestDetails, LoanRequestQuery, RejectRequest},
};

use super::AuthenticatedUser;

/// Status filter for a requester's own loans
#[derive(Debug, Deserialize, IntoParams)]
pub struct MineQuery {
    pub status: Option<LoanStatus>,
}

/// Advisory pre-check verdict for a pending approval
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckApprovalResponse {
    pub approvable: bool,
    pub conflicts: Vec<Conflict>,
}

/// Submit a new loan request (students)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Request created", body = LoanRequestDetails),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Not a student")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanRequestDetails>)> {
    claims.require_student()?;

    let created = state
        .services
        .loans
        .create_request(claims.user_id, &request)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// List the current user's own loan requests
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(MineQuery),
    responses(
        (status = 200, description = "Own loan requests", body = Vec<LoanRequestDetails>)
    )
)]
pub async fn my_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MineQuery>,
) -> AppResult<Json<Vec<LoanRequestDetails>>> {
    let requests = state
        .services
        .loans
        .my_requests(claims.user_id, query.status)
        .await?;
    Ok(Json(requests))
}

/// List loan requests with filters (staff only)
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanRequestQuery),
    responses(
        (status = 200, description = "Loan requests", body = Vec<LoanRequestDetails>)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanRequestQuery>,
) -> AppResult<Json<Vec<LoanRequestDetails>>> {
    claims.require_staff()?;
    let requests = state.services.loans.list(&query).await?;
    Ok(Json(requests))
}

/// Pending approval queue, oldest first (staff only)
#[utoipa::path(
    get,
    path = "/loans/pending",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending loan requests", body = Vec<LoanRequestDetails>)
    )
)]
pub async fn pending_requests(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanRequestDetails>>> {
    claims.require_staff()?;
    let requests = state.services.loans.pending().await?;
    Ok(Json(requests))
}

/// Get one loan request (staff, or the requester who owns it)
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan request ID")),
    responses(
        (status = 200, description = "Loan request details", body = LoanRequestDetails),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Loan request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRequestDetails>> {
    let request = state.services.loans.get_request(id).await?;

    if !claims.is_staff() && request.user_id != claims.user_id {
        return Err(crate::error::AppError::Authorization(
            "You can only view your own loan requests".to_string(),
        ));
    }

    Ok(Json(request))
}

/// Pre-check a pending approval against the current snapshot (staff only).
/// Advisory: the approval itself re-validates atomically.
#[utoipa::path(
    get,
    path = "/loans/{id}/conflicts",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan request ID")),
    responses(
        (status = 200, description = "Pre-check verdict", body = CheckApprovalResponse),
        (status = 404, description = "Loan request not found"),
        (status = 422, description = "Request is not pending")
    )
)]
pub async fn check_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<CheckApprovalResponse>> {
    claims.require_staff()?;
    let conflicts = state.services.loans.check_approval(id).await?;
    Ok(Json(CheckApprovalResponse {
        approvable: conflicts.is_empty(),
        conflicts,
    }))
}

/// Approve a pending loan request (staff only)
#[utoipa::path(
    post,
    path = "/loans/{id}/approve",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan request ID")),
    responses(
        (status = 200, description = "Request approved", body = LoanRequestDetails),
        (status = 404, description = "Loan request not found"),
        (status = 409, description = "Blocked by arbitration conflicts"),
        (status = 422, description = "Request is not pending")
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRequestDetails>> {
    claims.require_staff()?;
    let approved = state.services.loans.approve(id, claims.user_id).await?;
    Ok(Json(approved))
}

/// Reject a pending loan request with a reason (staff only)
#[utoipa::path(
    post,
    path = "/loans/{id}/reject",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan request ID")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Request rejected", body = LoanRequestDetails),
        (status = 400, description = "Missing reason"),
        (status = 404, description = "Loan request not found"),
        (status = 422, description = "Request is not pending")
    )
)]
pub async fn reject_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(body): Json<RejectRequest>,
) -> AppResult<Json<LoanRequestDetails>> {
    claims.require_staff()?;
    let rejected = state
        .services
        .loans
        .reject(id, claims.user_id, &body.reason)
        .await?;
    Ok(Json(rejected))
}

/// Mark an approved loan request as returned (staff only)
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan request ID")),
    responses(
        (status = 200, description = "Request returned", body = LoanRequestDetails),
        (status = 404, description = "Loan request not found"),
        (status = 422, description = "Request is not approved")
    )
)]
pub async fn return_request(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<LoanRequestDetails>> {
    claims.require_staff()?;
    let returned = state
        .services
        .loans
        .return_request(id, claims.user_id)
        .await?;
    Ok(Json(returned))
}
