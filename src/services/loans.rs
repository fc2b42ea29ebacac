//! Loan request workflows: submission, pre-checks, and approval decisions
//!
//! This layer hosts the optimistic arbitration call sites (schedule check
//! before submission, conflict pre-check before a decision). They read an
//! unlocked snapshot and exist for feedback; the authoritative check runs
//! again inside the repository's approval transaction.

use chrono::NaiveDate;

use crate::{
    arbitration::{self, BookingWindow, Conflict, ScheduleEntry},
    error::{AppError, AppResult},
    models::enums::{LoanStatus, ResourceKind, ResourceStatus},
    models::loan::{
        CreateLoanDetail, CreateLoanRequest, LoanRequestDetails, LoanRequestQuery, RoomBooking,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create a new loan request after validating every detail. All
    /// validation failures are collected and reported together.
    pub async fn create_request(
        &self,
        user_id: i32,
        data: &CreateLoanRequest,
    ) -> AppResult<LoanRequestDetails> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;

        let errors = self.validate_details(&data.details).await?;
        if !errors.is_empty() {
            return Err(AppError::Validation(errors.join("; ")));
        }

        self.repository.loans.create(user_id, data).await
    }

    /// Validate submitted details, collecting every problem found
    async fn validate_details(&self, details: &[CreateLoanDetail]) -> AppResult<Vec<String>> {
        let mut errors = Vec::new();

        if details.is_empty() {
            errors.push("At least one detail is required".to_string());
        }

        for (i, detail) in details.iter().enumerate() {
            let n = i + 1;
            match detail.resource_kind {
                ResourceKind::Item => {
                    let quantity = detail.quantity.unwrap_or(0);
                    if quantity <= 0 {
                        errors.push(format!("Detail {}: item quantity must be positive", n));
                    }
                    if detail.starts_at.is_some() || detail.ends_at.is_some() {
                        errors.push(format!("Detail {}: items take no time window", n));
                    }
                    match self.repository.items.get_by_id(detail.resource_id).await {
                        Ok(item) => {
                            if item.status != ResourceStatus::Available {
                                errors.push(format!(
                                    "Detail {}: item '{}' is not available",
                                    n, item.name
                                ));
                            } else if quantity > 0 && item.stock < quantity {
                                errors.push(format!(
                                    "Detail {}: item '{}' has insufficient stock (available: {})",
                                    n, item.name, item.stock
                                ));
                            }
                        }
                        Err(AppError::NotFound(_)) => {
                            errors.push(format!("Detail {}: item {} not found", n, detail.resource_id));
                        }
                        Err(e) => return Err(e),
                    }
                }

                ResourceKind::Room => {
                    if detail.quantity.is_some() {
                        errors.push(format!("Detail {}: rooms take no quantity", n));
                    }
                    match (detail.starts_at, detail.ends_at) {
                        (Some(starts_at), Some(ends_at)) => {
                            if starts_at >= ends_at {
                                errors.push(format!(
                                    "Detail {}: start time must precede end time",
                                    n
                                ));
                            }
                        }
                        _ => {
                            errors.push(format!(
                                "Detail {}: rooms require both start and end times",
                                n
                            ));
                        }
                    }
                    match self.repository.rooms.get_by_id(detail.resource_id).await {
                        Ok(room) => {
                            if room.status != ResourceStatus::Available {
                                errors.push(format!(
                                    "Detail {}: room '{}' is not available",
                                    n, room.name
                                ));
                            }
                        }
                        Err(AppError::NotFound(_)) => {
                            errors.push(format!("Detail {}: room {} not found", n, detail.resource_id));
                        }
                        Err(e) => return Err(e),
                    }
                }

                ResourceKind::AttendanceSlot => {
                    if detail.quantity.is_some()
                        || detail.starts_at.is_some()
                        || detail.ends_at.is_some()
                    {
                        errors.push(format!(
                            "Detail {}: attendance slots take no quantity or time window",
                            n
                        ));
                    }
                    match self.repository.attendance.get_by_id(detail.resource_id).await {
                        Ok(_) => {}
                        Err(AppError::NotFound(_)) => {
                            errors.push(format!(
                                "Detail {}: attendance slot {} not found",
                                n, detail.resource_id
                            ));
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        Ok(errors)
    }

    /// Get one request with details
    pub async fn get_request(&self, id: i32) -> AppResult<LoanRequestDetails> {
        self.repository.loans.get_with_details(id).await
    }

    /// List requests with staff filters
    pub async fn list(&self, query: &LoanRequestQuery) -> AppResult<Vec<LoanRequestDetails>> {
        self.repository.loans.list(query).await
    }

    /// List a requester's own requests
    pub async fn my_requests(
        &self,
        user_id: i32,
        status: Option<LoanStatus>,
    ) -> AppResult<Vec<LoanRequestDetails>> {
        self.repository.loans.list_for_user(user_id, status).await
    }

    /// Pending approval queue, oldest first
    pub async fn pending(&self) -> AppResult<Vec<LoanRequestDetails>> {
        self.repository.loans.list_pending().await
    }

    /// A room's bookings for one date
    pub async fn room_schedule(&self, room_id: i32, date: NaiveDate) -> AppResult<Vec<RoomBooking>> {
        self.repository.rooms.get_by_id(room_id).await?;
        self.repository.loans.room_schedule(room_id, date).await
    }

    /// Check a proposed room window against the day's schedule before
    /// submission. Returns the overlapping bookings, owner labels intact;
    /// empty means the window is free.
    pub async fn check_room_window(
        &self,
        room_id: i32,
        date: NaiveDate,
        starts_at: &str,
        ends_at: &str,
    ) -> AppResult<Vec<ScheduleEntry>> {
        self.repository.rooms.get_by_id(room_id).await?;

        let window = BookingWindow::parse(starts_at, ends_at)
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let bookings = self.repository.loans.room_schedule(room_id, date).await?;
        let schedule: Vec<ScheduleEntry> = bookings
            .iter()
            .map(|b| ScheduleEntry {
                starts_at: b.starts_at.time(),
                ends_at: b.ends_at.time(),
                booked_by: b.booked_by.clone(),
            })
            .collect();

        let conflicts = arbitration::find_conflicts(&window, &schedule)
            .into_iter()
            .cloned()
            .collect();

        Ok(conflicts)
    }

    /// Pre-check an approval against the current (unlocked) snapshot.
    /// The result is advisory: the approval transaction re-arbitrates.
    pub async fn check_approval(&self, request_id: i32) -> AppResult<Vec<Conflict>> {
        let (request, details, approved, catalog) =
            self.repository.loans.approval_inputs(request_id).await?;

        if !request.status.can_transition_to(LoanStatus::Approved) {
            return Err(AppError::BusinessRule(format!(
                "Cannot approve a request with status '{}'",
                request.status
            )));
        }

        Ok(arbitration::evaluate_request(
            request_id, &details, &approved, &catalog,
        ))
    }

    /// Approve a pending request (authoritative, transactional)
    pub async fn approve(&self, request_id: i32, approver_id: i32) -> AppResult<LoanRequestDetails> {
        self.repository.loans.approve(request_id, approver_id).await?;
        self.repository.loans.get_with_details(request_id).await
    }

    /// Reject a pending request with a reason
    pub async fn reject(
        &self,
        request_id: i32,
        approver_id: i32,
        reason: &str,
    ) -> AppResult<LoanRequestDetails> {
        if reason.trim().is_empty() {
            return Err(AppError::Validation(
                "A rejection reason is required".to_string(),
            ));
        }
        self.repository
            .loans
            .reject(request_id, approver_id, reason)
            .await?;
        self.repository.loans.get_with_details(request_id).await
    }

    /// Mark an approved request as returned
    pub async fn return_request(
        &self,
        request_id: i32,
        approver_id: i32,
    ) -> AppResult<LoanRequestDetails> {
        self.repository
            .loans
            .return_request(request_id, approver_id)
            .await?;
        self.repository.loans.get_with_details(request_id).await
    }
}
