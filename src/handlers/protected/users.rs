use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::database::models::User;
use crate::dto::user::UpdateUserRequest;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    caller.ensure_owner(&id)?;
    Ok(ApiResponse::success(state.users.get_one(&id).await?))
}

/// PATCH /api/v1/users - an empty id targets the caller
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(mut req): Json<UpdateUserRequest>,
) -> ApiResult<User> {
    if req.id.trim().is_empty() {
        req.id = caller.user_id.clone();
    }
    caller.ensure_owner(&req.id)?;
    Ok(ApiResponse::success(state.users.update_one(req).await?))
}

/// DELETE /api/v1/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    caller.ensure_owner(&id)?;
    state.users.delete_one(&id).await?;
    Ok(ApiResponse::no_content())
}

/// PATCH /api/v1/users/:id/:role - any role but Admin
pub async fn set_role(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path((id, role)): Path<(String, u8)>,
) -> ApiResult<User> {
    caller.ensure_owner(&id)?;
    Ok(ApiResponse::success(state.users.make_non_admin_role(&id, role).await?))
}
