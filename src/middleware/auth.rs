use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::state::AppState;

/// Caller identity taken from a validated bearer token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub role: u8,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin as u8
    }

    /// 403 unless the caller is `owner` or an admin.
    pub fn ensure_owner(&self, owner: &str) -> Result<(), ApiError> {
        if self.user_id == owner || self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("Resource belongs to another user"))
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self { user_id: claims.user_id, role: claims.role }
    }
}

/// Validates the bearer token and injects `AuthUser` into request extensions.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
    let claims = state
        .auth
        .validate_token(&token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        Some(_) => Err("Empty JWT token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer  "));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def");
    }

    #[test]
    fn owners_and_admins_pass() {
        let customer = AuthUser { user_id: "1".into(), role: Role::Customer as u8 };
        let admin = AuthUser { user_id: "2".into(), role: Role::Admin as u8 };
        assert!(customer.ensure_owner("1").is_ok());
        assert!(customer.ensure_owner("2").is_err());
        assert!(admin.ensure_owner("1").is_ok());
    }
}
