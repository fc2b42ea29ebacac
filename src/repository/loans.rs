//! Loan requests repository for database operations
//!
//! Owns the authoritative approval path: the arbitration engine is
//! re-run inside a transaction holding row locks on the request and on
//! every referenced resource, so a stale client-side verdict can never
//! commit an invariant violation.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use sqlx::{PgConnection, Pool, Postgres, Row};

use crate::{
    arbitration::{self, ApprovedDetail, CatalogSnapshot},
    error::{AppError, AppResult},
    models::enums::{LoanStatus, ResourceKind},
    models::loan::{
        CreateLoanRequest, LoanDetail, LoanDetailRow, LoanDetailView, LoanRequest,
        LoanRequestDetails, LoanRequestQuery, RoomBooking,
    },
};

const DETAIL_VIEW_SQL: &str = r#"
    SELECT d.id, d.resource_kind, d.resource_id,
           d.quantity, d.starts_at, d.ends_at,
           CASE d.resource_kind
               WHEN 'item' THEN i.name
               WHEN 'room' THEN r.name
               WHEN 'attendance_slot' THEN a.course_name
           END AS resource_name
    FROM loan_details d
    LEFT JOIN items i ON d.resource_kind = 'item' AND i.id = d.resource_id
    LEFT JOIN rooms r ON d.resource_kind = 'room' AND r.id = d.resource_id
    LEFT JOIN attendance_slots a ON d.resource_kind = 'attendance_slot' AND a.id = d.resource_id
    WHERE d.request_id = $1
    ORDER BY d.id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanRequest> {
        sqlx::query_as::<_, LoanRequest>("SELECT * FROM loan_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan request {} not found", id)))
    }

    /// Get loan request with requester info and details
    pub async fn get_with_details(&self, id: i32) -> AppResult<LoanRequestDetails> {
        let request = self.get_by_id(id).await?;
        self.hydrate(request).await
    }

    /// Create a loan request with its details. Details are assumed
    /// validated by the service layer; the server-side approval check
    /// re-validates regardless.
    pub async fn create(&self, user_id: i32, data: &CreateLoanRequest) -> AppResult<LoanRequestDetails> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, LoanRequest>(
            r#"
            INSERT INTO loan_requests (user_id, request_date, notes)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(data.request_date)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        for detail in &data.details {
            sqlx::query(
                r#"
                INSERT INTO loan_details (request_id, resource_kind, resource_id, quantity, starts_at, ends_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(request.id)
            .bind(detail.resource_kind)
            .bind(detail.resource_id)
            .bind(detail.quantity)
            .bind(detail.starts_at)
            .bind(detail.ends_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_with_details(request.id).await
    }

    /// List loan requests with staff filters (status, date range)
    pub async fn list(&self, query: &LoanRequestQuery) -> AppResult<Vec<LoanRequestDetails>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if query.date_from.is_some() {
            conditions.push(format!("request_date >= ${}", idx));
            idx += 1;
        }
        if query.date_to.is_some() {
            conditions.push(format!("request_date <= ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT * FROM loan_requests {} ORDER BY created_at DESC",
            where_clause
        );

        let mut builder = sqlx::query_as::<_, LoanRequest>(&sql);
        if let Some(status) = query.status {
            builder = builder.bind(status);
        }
        if let Some(from) = query.date_from {
            builder = builder.bind(from);
        }
        if let Some(to) = query.date_to {
            builder = builder.bind(to);
        }

        let requests = builder.fetch_all(&self.pool).await?;
        self.hydrate_all(requests).await
    }

    /// List a requester's own loan requests
    pub async fn list_for_user(
        &self,
        user_id: i32,
        status: Option<LoanStatus>,
    ) -> AppResult<Vec<LoanRequestDetails>> {
        let requests = if let Some(status) = status {
            sqlx::query_as::<_, LoanRequest>(
                "SELECT * FROM loan_requests WHERE user_id = $1 AND status = $2 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .bind(status)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, LoanRequest>(
                "SELECT * FROM loan_requests WHERE user_id = $1 ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?
        };

        self.hydrate_all(requests).await
    }

    /// List the pending approval queue, oldest first
    pub async fn list_pending(&self) -> AppResult<Vec<LoanRequestDetails>> {
        let requests = sqlx::query_as::<_, LoanRequest>(
            "SELECT * FROM loan_requests WHERE status = 'pending' ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        self.hydrate_all(requests).await
    }

    /// Pending and approved bookings of one room for one date, with owner
    /// names, for pre-submission conflict feedback
    pub async fn room_schedule(&self, room_id: i32, date: NaiveDate) -> AppResult<Vec<RoomBooking>> {
        let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let day_end = (date + Duration::days(1)).and_hms_opt(0, 0, 0).unwrap().and_utc();

        let bookings = sqlx::query_as::<_, RoomBooking>(
            r#"
            SELECT d.request_id, lr.user_id, u.name AS booked_by,
                   d.starts_at, d.ends_at, lr.status
            FROM loan_details d
            JOIN loan_requests lr ON lr.id = d.request_id
            JOIN users u ON u.id = lr.user_id
            WHERE d.resource_kind = 'room'
              AND d.resource_id = $1
              AND lr.status IN ('pending', 'approved')
              AND d.starts_at >= $2 AND d.starts_at < $3
            ORDER BY d.starts_at
            "#,
        )
        .bind(room_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Fetch the arbitration inputs for a request without taking locks.
    /// This snapshot backs the optimistic pre-check; it can go stale and
    /// the approval transaction re-fetches under locks.
    pub async fn approval_inputs(
        &self,
        request_id: i32,
    ) -> AppResult<(LoanRequest, Vec<LoanDetail>, Vec<ApprovedDetail>, CatalogSnapshot)> {
        let request = self.get_by_id(request_id).await?;

        let mut conn = self.pool.acquire().await?;
        let rows = load_details(&mut conn, request_id).await?;
        let details = decode_details(&rows)?;
        let approved = load_approved_for(&mut conn, request_id).await?;
        let catalog = load_catalog(&mut conn, &rows).await?;

        Ok((request, details, approved, catalog))
    }

    /// Approve a pending request. The arbitration engine runs again inside
    /// the transaction, after locking the request row and every referenced
    /// resource row, so concurrent approvals sharing a resource serialize
    /// and a raced approval surfaces as an ordinary conflict list.
    pub async fn approve(&self, request_id: i32, approver_id: i32) -> AppResult<LoanRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, LoanRequest>(
            "SELECT * FROM loan_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan request {} not found", request_id)))?;

        if !request.status.can_transition_to(LoanStatus::Approved) {
            return Err(AppError::BusinessRule(format!(
                "Cannot approve a request with status '{}'",
                request.status
            )));
        }

        let rows = load_details(&mut tx, request_id).await?;
        if rows.is_empty() {
            return Err(AppError::BusinessRule(
                "Loan request has no details".to_string(),
            ));
        }

        lock_resources(&mut tx, &rows).await?;

        let details = decode_details(&rows)?;
        let approved = load_approved_for(&mut tx, request_id).await?;
        let catalog = load_catalog(&mut tx, &rows).await?;

        let conflicts = arbitration::evaluate_request(request_id, &details, &approved, &catalog);
        if !conflicts.is_empty() {
            // Dropping the transaction rolls back; nothing was mutated
            return Err(AppError::ApprovalBlocked(conflicts));
        }

        let code = generate_verification_code();
        let updated = sqlx::query_as::<_, LoanRequest>(
            r#"
            UPDATE loan_requests
            SET status = $1, approved_by = $2, verification_code = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(LoanStatus::Approved)
        .bind(approver_id)
        .bind(&code)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Reject a pending request, recording the reason
    pub async fn reject(
        &self,
        request_id: i32,
        approver_id: i32,
        reason: &str,
    ) -> AppResult<LoanRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, LoanRequest>(
            "SELECT * FROM loan_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan request {} not found", request_id)))?;

        if !request.status.can_transition_to(LoanStatus::Rejected) {
            return Err(AppError::BusinessRule(format!(
                "Cannot reject a request with status '{}'",
                request.status
            )));
        }

        let updated = sqlx::query_as::<_, LoanRequest>(
            r#"
            UPDATE loan_requests
            SET status = $1, approved_by = $2, rejection_note = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(LoanStatus::Rejected)
        .bind(approver_id)
        .bind(reason)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Mark an approved request returned. Its details stop counting toward
    /// availability by no longer being in the approved set.
    pub async fn return_request(&self, request_id: i32, approver_id: i32) -> AppResult<LoanRequest> {
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, LoanRequest>(
            "SELECT * FROM loan_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan request {} not found", request_id)))?;

        if !request.status.can_transition_to(LoanStatus::Returned) {
            return Err(AppError::BusinessRule(format!(
                "Cannot return a request with status '{}'",
                request.status
            )));
        }

        let updated = sqlx::query_as::<_, LoanRequest>(
            r#"
            UPDATE loan_requests
            SET status = $1, approved_by = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(LoanStatus::Returned)
        .bind(approver_id)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn hydrate_all(&self, requests: Vec<LoanRequest>) -> AppResult<Vec<LoanRequestDetails>> {
        let mut result = Vec::with_capacity(requests.len());
        for request in requests {
            result.push(self.hydrate(request).await?);
        }
        Ok(result)
    }

    /// Attach requester/approver names and detail views to a request
    async fn hydrate(&self, request: LoanRequest) -> AppResult<LoanRequestDetails> {
        let names = sqlx::query(
            r#"
            SELECT u.nim AS user_nim, u.name AS user_name, a.name AS approver_name
            FROM loan_requests lr
            LEFT JOIN users u ON u.id = lr.user_id
            LEFT JOIN users a ON a.id = lr.approved_by
            WHERE lr.id = $1
            "#,
        )
        .bind(request.id)
        .fetch_one(&self.pool)
        .await?;

        let details = sqlx::query_as::<_, LoanDetailView>(DETAIL_VIEW_SQL)
            .bind(request.id)
            .fetch_all(&self.pool)
            .await?;

        Ok(LoanRequestDetails {
            id: request.id,
            user_id: request.user_id,
            user_nim: names.get("user_nim"),
            user_name: names.get("user_name"),
            request_date: request.request_date,
            status: request.status,
            approver_name: names.get("approver_name"),
            verification_code: request.verification_code,
            notes: request.notes,
            rejection_note: request.rejection_note,
            created_at: request.created_at,
            details,
        })
    }
}

/// Generate the pickup verification code handed out on approval
fn generate_verification_code() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

async fn load_details(conn: &mut PgConnection, request_id: i32) -> AppResult<Vec<LoanDetailRow>> {
    let rows = sqlx::query_as::<_, LoanDetailRow>(
        "SELECT * FROM loan_details WHERE request_id = $1 ORDER BY id",
    )
    .bind(request_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

fn decode_details(rows: &[LoanDetailRow]) -> AppResult<Vec<LoanDetail>> {
    rows.iter()
        .cloned()
        .map(LoanDetail::try_from)
        .collect()
}

/// Lock the resource rows referenced by the candidate's details, in a
/// stable order so concurrent approvals cannot deadlock. A missing row is
/// not an error here: the catalog snapshot reports it as a conflict.
async fn lock_resources(conn: &mut PgConnection, rows: &[LoanDetailRow]) -> AppResult<()> {
    let mut targets: Vec<(ResourceKind, i32)> = rows
        .iter()
        .map(|r| (r.resource_kind, r.resource_id))
        .collect();
    targets.sort_by_key(|(kind, id)| (kind_rank(*kind), *id));
    targets.dedup();

    for (kind, id) in targets {
        let sql = match kind {
            ResourceKind::Item => "SELECT id FROM items WHERE id = $1 FOR UPDATE",
            ResourceKind::Room => "SELECT id FROM rooms WHERE id = $1 FOR UPDATE",
            ResourceKind::AttendanceSlot => {
                "SELECT id FROM attendance_slots WHERE id = $1 FOR UPDATE"
            }
        };
        sqlx::query(sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    }

    Ok(())
}

fn kind_rank(kind: ResourceKind) -> u8 {
    match kind {
        ResourceKind::Item => 0,
        ResourceKind::Room => 1,
        ResourceKind::AttendanceSlot => 2,
    }
}

/// Approved details from other requests touching the same resources as
/// the candidate
async fn load_approved_for(
    conn: &mut PgConnection,
    request_id: i32,
) -> AppResult<Vec<ApprovedDetail>> {
    let rows = sqlx::query_as::<_, LoanDetailRow>(
        r#"
        SELECT d.*
        FROM loan_details d
        JOIN loan_requests lr ON lr.id = d.request_id
        WHERE lr.status = 'approved'
          AND d.request_id <> $1
          AND (d.resource_kind, d.resource_id) IN (
              SELECT resource_kind, resource_id FROM loan_details WHERE request_id = $1
          )
        ORDER BY d.id
        "#,
    )
    .bind(request_id)
    .fetch_all(conn)
    .await?;

    rows.into_iter()
        .map(|row| {
            let request_id = row.request_id;
            LoanDetail::try_from(row).map(|detail| ApprovedDetail { request_id, detail })
        })
        .collect()
}

/// Snapshot the catalog resources referenced by the candidate's details.
/// Deleted resources are simply absent; the arbitrator turns absence into
/// a blocking conflict.
async fn load_catalog(
    conn: &mut PgConnection,
    rows: &[LoanDetailRow],
) -> AppResult<CatalogSnapshot> {
    let mut item_ids = Vec::new();
    let mut room_ids = Vec::new();
    let mut slot_ids = Vec::new();
    for row in rows {
        match row.resource_kind {
            ResourceKind::Item => item_ids.push(row.resource_id),
            ResourceKind::Room => room_ids.push(row.resource_id),
            ResourceKind::AttendanceSlot => slot_ids.push(row.resource_id),
        }
    }

    let mut catalog = CatalogSnapshot::new();

    if !item_ids.is_empty() {
        let items = sqlx::query("SELECT id, name, stock FROM items WHERE id = ANY($1)")
            .bind(&item_ids)
            .fetch_all(&mut *conn)
            .await?;
        for row in items {
            catalog.add_item(row.get("id"), row.get::<String, _>("name"), row.get("stock"));
        }
    }

    if !room_ids.is_empty() {
        let rooms = sqlx::query("SELECT id, name FROM rooms WHERE id = ANY($1)")
            .bind(&room_ids)
            .fetch_all(&mut *conn)
            .await?;
        for row in rooms {
            catalog.add_room(row.get("id"), row.get::<String, _>("name"));
        }
    }

    if !slot_ids.is_empty() {
        let slots = sqlx::query("SELECT id, course_name FROM attendance_slots WHERE id = ANY($1)")
            .bind(&slot_ids)
            .fetch_all(&mut *conn)
            .await?;
        for row in slots {
            catalog.add_attendance_slot(row.get("id"), row.get::<String, _>("course_name"));
        }
    }

    Ok(catalog)
}
