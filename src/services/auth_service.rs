use tracing::{debug, warn};

use super::{ServiceError, ServiceResult, UserService};
use crate::auth::{Claims, JwtService};
use crate::database::models::User;
use crate::dto::auth::{LoginRequest, LoginResponse};

#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    jwt: JwtService,
}

impl AuthService {
    pub fn new(users: UserService, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    /// Unknown emails and wrong passwords fail the same way.
    pub async fn login(&self, req: LoginRequest) -> ServiceResult<LoginResponse> {
        let email = req.email.trim().to_lowercase();
        let user = match self.users.get_by_email(&email).await {
            Ok(user) => user,
            Err(ServiceError::NotFound(_)) => return Err(invalid_credentials()),
            Err(e) => return Err(e),
        };

        if !self.users.verify_password(&user, &req.password) {
            warn!("Failed login for user {}", user.base.id);
            return Err(invalid_credentials());
        }

        debug!("User {} logged in", user.base.id);
        self.issue_token(&user)
    }

    pub fn issue_token(&self, user: &User) -> ServiceResult<LoginResponse> {
        let (token, expires_at) = self
            .jwt
            .generate(&user.base.id, user.role)
            .map_err(|e| ServiceError::Unknown(e.to_string()))?;
        Ok(LoginResponse { token, expires_at })
    }

    pub fn validate_token(&self, token: &str) -> ServiceResult<Claims> {
        self.jwt.validate(token).map_err(|e| ServiceError::Unauthorized(e.to_string()))
    }
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("invalid email or password".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    fn service() -> (AuthService, UserService) {
        let users = fixtures::user_service();
        let jwt = JwtService::new("test-secret", 8).unwrap();
        (AuthService::new(users.clone(), jwt), users)
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest { email: email.to_string(), password: password.to_string() }
    }

    #[tokio::test]
    async fn login_issues_token_for_valid_credentials() {
        let (auth, users) = service();
        let user = users.create_one(fixtures::user_request("ana@example.com")).await.unwrap();

        let response = auth.login(login("Ana@Example.com", "secret")).await.unwrap();
        let claims = auth.validate_token(&response.token).unwrap();
        assert_eq!(claims.user_id, user.base.id);
        assert_eq!(claims.role, 2);
        assert!(response.expires_at > chrono::Utc::now());
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let (auth, users) = service();
        users.create_one(fixtures::user_request("ana@example.com")).await.unwrap();

        assert!(matches!(auth.login(login("ana@example.com", "nope")).await, Err(ServiceError::Unauthorized(_))));
        assert!(matches!(auth.login(login("who@example.com", "secret")).await, Err(ServiceError::Unauthorized(_))));
        assert!(matches!(auth.validate_token("garbage"), Err(ServiceError::Unauthorized(_))));
    }
}
