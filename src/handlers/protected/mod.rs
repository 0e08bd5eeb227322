// Protected handlers: a valid bearer token is required.
//
// Route prefix: /api/v1
// Middleware: jwt_auth_middleware injects `AuthUser`. List routes are scoped to the caller;
// single-entity routes run the owning service's ownership check.

pub mod contexts;
pub mod documents;
pub mod languages;
pub mod notes;
pub mod users;

use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::ServiceError;

/// Body of delete routes that also clean up on the assistant side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

/// Turns an ownership check into 403. Admins pass.
pub(crate) fn ensure_owned(caller: &AuthUser, owned: bool) -> Result<(), ApiError> {
    if owned || caller.is_admin() {
        Ok(())
    } else {
        Err(ApiError::forbidden("Resource belongs to another user"))
    }
}

/// Assistant side-channel failures are reported, never raised.
pub(crate) fn ai_error<T>(result: Result<T, ServiceError>) -> Option<String> {
    match result {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("Assistant side-channel failed: {}", e);
            Some(e.to_string())
        }
    }
}
