// Public handlers: no authentication required.
//
// Route prefix: /api (home, healthcheck) and /api/v1 (login, register)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;

use crate::database::models::User;
use crate::dto::auth::{LoginRequest, LoginResponse};
use crate::dto::user::CreateUserRequest;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "data": {
            "name": state.config.app.title,
            "version": state.config.app.version,
            "endpoints": {
                "public": "/api/healthcheck, /api/v1/login, /api/v1/register",
                "protected": "/api/v1/{users,notes,languages,documents,contexts} (bearer token)",
                "admin": "/api/v1/admin/* (bearer token, admin role)"
            }
        }
    }))
}

/// GET /api/healthcheck - includes the store's health
pub async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let store = match &state.database {
        None => "in-memory",
        Some(db) => match db.health_check().await {
            Ok(()) => "connected",
            Err(e) => {
                error!("Database health check failed: {}", e);
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "success": false,
                        "data": { "status": "degraded", "timestamp": now, "database": "unreachable" }
                    })),
                );
            }
        },
    };

    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": { "status": "ok", "timestamp": now, "database": store } })),
    )
}

/// POST /api/v1/login
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    Ok(ApiResponse::success(state.auth.login(req).await?))
}

/// POST /api/v1/register - always creates a Customer
pub async fn register(State(state): State<AppState>, Json(req): Json<CreateUserRequest>) -> ApiResult<User> {
    Ok(ApiResponse::created(state.users.create_one(req).await?))
}
