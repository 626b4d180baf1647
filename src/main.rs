use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contracts_backend::{handlers, services::activation::ApprovalPolicy, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,contracts_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let approval_policy = ApprovalPolicy::from_env();
    tracing::info!(
        require_all_steps_approved = approval_policy.require_all_steps_approved,
        "Approval policy loaded"
    );

    let state = AppState {
        db: std::sync::Arc::new(db),
        approval_policy,
    };

    // Build router
    let app = Router::new()
        .route("/", get(health))
        .route("/api/contracts/{id}", get(handlers::contract::get_contract))
        .route(
            "/api/contracts/{id}/schedule",
            get(handlers::contract::get_schedule),
        )
        .route(
            "/api/contracts/{id}/approval/step",
            post(handlers::approval::update_step),
        )
        .route(
            "/api/contracts/{id}/approval/finalize",
            post(handlers::approval::finalize),
        )
        .route(
            "/api/schedule-events/{id}/paid",
            post(handlers::contract::mark_event_paid),
        )
        .route(
            "/api/simulator/projection",
            post(handlers::simulator::simulate),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind listener");

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.expect("Server error");
}

async fn health() -> &'static str {
    "contracts-backend up"
}
