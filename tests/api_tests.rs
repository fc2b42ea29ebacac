//! API integration tests
//!
//! Require a running server with a migrated database.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique-enough nim for repeated test runs
fn fresh_nim(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{}{:09}", prefix, nanos)
}

/// Register a user and log in, returning (token, user_id)
async fn register_and_login(client: &Client, role: &str) -> (String, i64) {
    let nim = fresh_nim(if role == "staff" { "S" } else { "H011" });

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "nim": nim,
            "name": format!("Test {}", role),
            "role": role,
            "access_code": "rahasia-123"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "nim": nim,
            "access_code": "rahasia-123"
        }))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    let user_id = body["user"]["id"].as_i64().expect("No user id");
    (token, user_id)
}

/// Create an item as staff, returning its id
async fn create_item(client: &Client, staff_token: &str, name: &str, stock: i64) -> i64 {
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header("Authorization", format!("Bearer {}", staff_token))
        .json(&json!({
            "name": name,
            "unit": "unit",
            "stock": stock
        }))
        .send()
        .await
        .expect("Failed to create item");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse item response");
    body["id"].as_i64().expect("No item id")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "nim": "does-not-exist",
            "access_code": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_me_returns_session_user() {
    let client = Client::new();
    let (token, user_id) = register_and_login(&client, "student").await;

    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["id"].as_i64().unwrap(), user_id);
    assert_eq!(body["role"], "student");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/items", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_students_cannot_manage_catalog() {
    let client = Client::new();
    let (token, _) = register_and_login(&client, "student").await;

    let response = client
        .post(format!("{}/items", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "name": "Nope", "unit": "unit", "stock": 1 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_item_request_approval_flow() {
    let client = Client::new();
    let (staff_token, _) = register_and_login(&client, "staff").await;
    let (student_token, _) = register_and_login(&client, "student").await;

    let item_id = create_item(&client, &staff_token, "Proyektor Tes", 3).await;

    // Student submits a request for 2 units
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({
            "request_date": "2025-06-27",
            "notes": "Praktikum",
            "details": [
                { "resource_kind": "item", "resource_id": item_id, "quantity": 2 }
            ]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().expect("No request id");
    assert_eq!(body["status"], "pending");

    // Pre-check reports no conflicts
    let response = client
        .get(format!("{}/loans/{}/conflicts", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", staff_token))
        .send()
        .await
        .expect("Failed to pre-check");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["approvable"], true);

    // Approve
    let response = client
        .post(format!("{}/loans/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", staff_token))
        .send()
        .await
        .expect("Failed to approve");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "approved");
    assert!(body["verification_code"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_over_stock_approval_is_blocked_with_conflicts() {
    let client = Client::new();
    let (staff_token, _) = register_and_login(&client, "staff").await;
    let (student_token, _) = register_and_login(&client, "student").await;

    let item_id = create_item(&client, &staff_token, "Kabel HDMI Tes", 3).await;

    // First request consumes 2 of 3 and gets approved
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({
            "request_date": "2025-06-27",
            "details": [
                { "resource_kind": "item", "resource_id": item_id, "quantity": 2 }
            ]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let first_id = body["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/loans/{}/approve", BASE_URL, first_id))
        .header("Authorization", format!("Bearer {}", staff_token))
        .send()
        .await
        .expect("Failed to approve");
    assert!(response.status().is_success());

    // Second request wants 2 more; only 1 left
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({
            "request_date": "2025-06-27",
            "details": [
                { "resource_kind": "item", "resource_id": item_id, "quantity": 2 }
            ]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let second_id = body["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/loans/{}/approve", BASE_URL, second_id))
        .header("Authorization", format!("Bearer {}", staff_token))
        .send()
        .await
        .expect("Failed to attempt approval");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    let conflicts = body["conflicts"].as_array().expect("No conflicts array");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0]["kind"], "item");
    assert_eq!(conflicts[0]["available"].as_i64().unwrap(), 1);
    assert_eq!(conflicts[0]["requested"].as_i64().unwrap(), 2);

    // The losing request is still pending
    let response = client
        .get(format!("{}/loans/{}", BASE_URL, second_id))
        .header("Authorization", format!("Bearer {}", staff_token))
        .send()
        .await
        .expect("Failed to fetch request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "pending");
}

#[tokio::test]
#[ignore]
async fn test_room_schedule_check_flow() {
    let client = Client::new();
    let (staff_token, _) = register_and_login(&client, "staff").await;
    let (student_token, _) = register_and_login(&client, "student").await;

    // Create a room
    let response = client
        .post(format!("{}/rooms", BASE_URL))
        .header("Authorization", format!("Bearer {}", staff_token))
        .json(&json!({ "name": "Tes-204", "building": "MIPA", "floor": 2, "capacity": 40 }))
        .send()
        .await
        .expect("Failed to create room");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let room_id = body["id"].as_i64().unwrap();

    // Book 10:00-12:00 and approve it
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({
            "request_date": "2025-06-27",
            "details": [{
                "resource_kind": "room",
                "resource_id": room_id,
                "starts_at": "2025-06-27T10:00:00Z",
                "ends_at": "2025-06-27T12:00:00Z"
            }]
        }))
        .send()
        .await
        .expect("Failed to submit booking");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/loans/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", staff_token))
        .send()
        .await
        .expect("Failed to approve booking");
    assert!(response.status().is_success());

    // Overlapping window conflicts and names the owner
    let response = client
        .post(format!("{}/rooms/{}/schedule/check", BASE_URL, room_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({ "date": "2025-06-27", "starts_at": "11:00", "ends_at": "13:00" }))
        .send()
        .await
        .expect("Failed to check window");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["conflict"], true);
    assert!(body["conflicts"][0]["booked_by"].is_string());

    // Touching window does not conflict
    let response = client
        .post(format!("{}/rooms/{}/schedule/check", BASE_URL, room_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({ "date": "2025-06-27", "starts_at": "12:00", "ends_at": "13:00" }))
        .send()
        .await
        .expect("Failed to check window");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["conflict"], false);

    // Inverted window is a validation error
    let response = client
        .post(format!("{}/rooms/{}/schedule/check", BASE_URL, room_id))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({ "date": "2025-06-27", "starts_at": "13:00", "ends_at": "12:00" }))
        .send()
        .await
        .expect("Failed to check window");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_invalid_submission_reports_every_error() {
    let client = Client::new();
    let (student_token, _) = register_and_login(&client, "student").await;

    // Item with no quantity AND a stray time window on an unknown resource
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({
            "request_date": "2025-06-27",
            "details": [{
                "resource_kind": "item",
                "resource_id": 999999,
                "starts_at": "2025-06-27T10:00:00Z",
                "ends_at": "2025-06-27T12:00:00Z"
            }]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("quantity"));
    assert!(message.contains("time window"));
    assert!(message.contains("not found"));
}

#[tokio::test]
#[ignore]
async fn test_rejected_request_is_terminal() {
    let client = Client::new();
    let (staff_token, _) = register_and_login(&client, "staff").await;
    let (student_token, _) = register_and_login(&client, "student").await;

    let item_id = create_item(&client, &staff_token, "Spidol Tes", 5).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_token))
        .json(&json!({
            "request_date": "2025-06-27",
            "details": [
                { "resource_kind": "item", "resource_id": item_id, "quantity": 1 }
            ]
        }))
        .send()
        .await
        .expect("Failed to submit request");
    let body: Value = response.json().await.expect("Failed to parse response");
    let request_id = body["id"].as_i64().unwrap();

    // Reject with a reason
    let response = client
        .post(format!("{}/loans/{}/reject", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", staff_token))
        .json(&json!({ "reason": "Stok dicadangkan untuk ujian" }))
        .send()
        .await
        .expect("Failed to reject");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["rejection_note"], "Stok dicadangkan untuk ujian");

    // No transition out of rejected
    let response = client
        .post(format!("{}/loans/{}/approve", BASE_URL, request_id))
        .header("Authorization", format!("Bearer {}", staff_token))
        .send()
        .await
        .expect("Failed to attempt approval");
    assert_eq!(response.status(), 422);
}
