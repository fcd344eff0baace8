use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::handlers::{protected, public};
use crate::middleware::{auth, authorize, log};

/// Assemble the full application router. Shared with integration tests so
/// the app can be driven in-process.
pub fn app() -> Router {
    let api = &config::config().api;

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_auth_routes())
        .merge(reference_routes())
        // Protected API
        .merge(protected_routes())
        // Global middleware
        .layer(axum::middleware::from_fn(log::log_failures))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(
            api.max_upload_bytes * api.max_upload_files + 1024 * 1024,
        ))
}

fn public_auth_routes() -> Router {
    Router::new()
        .route("/auth/register", post(public::auth::register))
        .route("/auth/login", post(public::auth::login))
}

fn reference_routes() -> Router {
    Router::new()
        .route("/api/reference/policy-types", get(public::reference::policy_types))
        .route("/api/reference/claim-statuses", get(public::reference::claim_statuses))
        .route(
            "/api/reference/payment-methods",
            get(public::reference::payment_methods),
        )
}

fn protected_routes() -> Router {
    Router::new()
        // Session
        .route("/api/auth/whoami", get(protected::auth::whoami))
        .route("/api/auth/refresh", post(protected::auth::refresh))
        // Policies
        .route(
            "/api/policies",
            get(protected::policies::list).post(protected::policies::create),
        )
        .route(
            "/api/policies/:id",
            get(protected::policies::get)
                .put(protected::policies::update)
                .delete(protected::policies::delete),
        )
        // Claims
        .route(
            "/api/claims",
            get(protected::claims::list).post(protected::claims::create),
        )
        .route("/api/claims/:id", get(protected::claims::get))
        .route("/api/claims/:id/status", patch(protected::claims::update_status))
        .route(
            "/api/claims/:id/documents",
            get(protected::documents::list).post(protected::documents::upload),
        )
        // Payments
        .route(
            "/api/payments",
            get(protected::payments::list).post(protected::payments::create),
        )
        .route("/api/payments/:id", get(protected::payments::get))
        // Admin portal
        .merge(user_admin_routes())
        // Authentication gate for the whole subtree
        .layer(axum::middleware::from_fn(auth::auth_gate))
}

fn user_admin_routes() -> Router {
    Router::new()
        .route(
            "/api/users",
            get(protected::users::list).post(protected::users::create),
        )
        .route(
            "/api/users/:id",
            get(protected::users::get)
                .put(protected::users::update)
                .delete(protected::users::delete),
        )
        .layer(axum::middleware::from_fn(authorize::require_admin))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Coverly API",
            "version": version,
            "description": "Insurance management platform backend",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/login, /auth/register (public)",
                "reference": "/api/reference/* (public)",
                "session": "/api/auth/* (protected)",
                "policies": "/api/policies[/:id] (protected)",
                "claims": "/api/claims[/:id] (protected)",
                "documents": "/api/claims/:id/documents (protected)",
                "payments": "/api/payments[/:id] (protected)",
                "users": "/api/users[/:id] (admin)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
