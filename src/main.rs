//! MathRent Server - University Lending Management System
//!
//! REST API server for equipment, room, and attendance-slot loans.

use axum::{
    routing::{get, post, put, delete},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mathrent_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("mathrent_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MathRent Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.auth.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Authentication
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Items
        .route("/items", get(api::items::list_items))
        .route("/items", post(api::items::create_item))
        .route("/items/:id", get(api::items::get_item))
        .route("/items/:id", put(api::items::update_item))
        .route("/items/:id", delete(api::items::delete_item))
        // Rooms
        .route("/rooms", get(api::rooms::list_rooms))
        .route("/rooms", post(api::rooms::create_room))
        .route("/rooms/:id", get(api::rooms::get_room))
        .route("/rooms/:id", put(api::rooms::update_room))
        .route("/rooms/:id", delete(api::rooms::delete_room))
        .route("/rooms/:id/schedule", get(api::rooms::room_schedule))
        .route("/rooms/:id/schedule/check", post(api::rooms::check_window))
        // Attendance slots
        .route("/attendance-slots", get(api::attendance::list_attendance_slots))
        .route("/attendance-slots", post(api::attendance::create_attendance_slot))
        .route("/attendance-slots/:id", get(api::attendance::get_attendance_slot))
        .route("/attendance-slots/:id", put(api::attendance::update_attendance_slot))
        .route("/attendance-slots/:id", delete(api::attendance::delete_attendance_slot))
        // Catalog
        .route("/catalog/available", get(api::catalog::available_resources))
        // Loans
        .route("/loans", post(api::loans::create_request))
        .route("/loans", get(api::loans::list_requests))
        .route("/loans/mine", get(api::loans::my_requests))
        .route("/loans/pending", get(api::loans::pending_requests))
        .route("/loans/:id", get(api::loans::get_request))
        .route("/loans/:id/conflicts", get(api::loans::check_request))
        .route("/loans/:id/approve", post(api::loans::approve_request))
        .route("/loans/:id/reject", post(api::loans::reject_request))
        .route("/loans/:id/return", post(api::loans::return_request))
        .with_state(state.clone());

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
