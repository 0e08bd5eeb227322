use axum::{extract::Request, middleware::Next, response::Response};

use super::auth::AuthUser;
use crate::error::ApiError;

/// Runs after `jwt_auth_middleware`; rejects callers whose role is not Admin.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let is_admin = request
        .extensions()
        .get::<AuthUser>()
        .map(AuthUser::is_admin)
        .unwrap_or(false);

    if !is_admin {
        return Err(ApiError::forbidden("Admin role required"));
    }
    Ok(next.run(request).await)
}
