//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{attendance, auth, catalog, health, items, loans, rooms};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MathRent API",
        version = "1.0.0",
        description = "University equipment, room, and attendance-slot lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Items
        items::list_items,
        items::get_item,
        items::create_item,
        items::update_item,
        items::delete_item,
        // Rooms
        rooms::list_rooms,
        rooms::get_room,
        rooms::create_room,
        rooms::update_room,
        rooms::delete_room,
        rooms::room_schedule,
        rooms::check_window,
        // Attendance slots
        attendance::list_attendance_slots,
        attendance::get_attendance_slot,
        attendance::create_attendance_slot,
        attendance::update_attendance_slot,
        attendance::delete_attendance_slot,
        // Catalog
        catalog::available_resources,
        // Loans
        loans::create_request,
        loans::my_requests,
        loans::list_requests,
        loans::pending_requests,
        loans::get_request,
        loans::check_request,
        loans::approve_request,
        loans::reject_request,
        loans::return_request,
    ),
    components(
        schemas(
            // Auth
            auth::UserInfo,
            auth::LoginResponse,
            auth::RegisterResponse,
            crate::models::user::CreateUser,
            crate::models::user::LoginRequest,
            // Enums
            crate::models::enums::Role,
            crate::models::enums::LoanStatus,
            crate::models::enums::ResourceKind,
            crate::models::enums::ResourceStatus,
            // Items
            crate::models::item::Item,
            crate::models::item::CreateItem,
            crate::models::item::UpdateItem,
            // Rooms
            crate::models::room::Room,
            crate::models::room::CreateRoom,
            crate::models::room::UpdateRoom,
            rooms::CheckWindowRequest,
            rooms::CheckWindowResponse,
            // Attendance slots
            crate::models::attendance::AttendanceSlot,
            crate::models::attendance::CreateAttendanceSlot,
            crate::models::attendance::UpdateAttendanceSlot,
            // Catalog
            crate::services::catalog::AvailableResources,
            // Loans
            crate::models::loan::LoanRequest,
            crate::models::loan::LoanRequestDetails,
            crate::models::loan::LoanDetailView,
            crate::models::loan::CreateLoanRequest,
            crate::models::loan::CreateLoanDetail,
            crate::models::loan::RejectRequest,
            crate::models::loan::RoomBooking,
            loans::CheckApprovalResponse,
            // Arbitration
            crate::arbitration::Conflict,
            crate::arbitration::ScheduleEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "items", description = "Equipment item catalog"),
        (name = "rooms", description = "Room catalog, schedules, and window checks"),
        (name = "attendance", description = "Course attendance slots"),
        (name = "catalog", description = "Aggregate catalog views"),
        (name = "loans", description = "Loan requests and approval decisions")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
