// Elevated handlers: bearer token with the Admin role.
//
// Route prefix: /api/v1/admin
// Middleware: jwt_auth_middleware, then require_admin

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::database::models::{Language, Note, User};
use crate::dto::language::{CreateLanguageRequest, FilterLanguagesRequest, UpdateLanguageRequest};
use crate::dto::note::FilterNotesRequest;
use crate::dto::user::FilterUsersRequest;
use crate::dto::{PageQuery, PaginationResponse};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// PATCH /api/v1/admin/users/:id/makeadmin
pub async fn make_admin(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users.make_admin(&id).await?))
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<FilterUsersRequest>,
) -> ApiResult<PaginationResponse<User>> {
    let page = page.resolve(&state.config.api);
    Ok(ApiResponse::success(state.users.filter_all(filter, page).await?))
}

/// GET /api/v1/admin/notes - every user's notes
pub async fn list_notes(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<FilterNotesRequest>,
) -> ApiResult<PaginationResponse<Note>> {
    let page = page.resolve(&state.config.api);
    Ok(ApiResponse::success(state.notes.filter_all(filter, page).await?))
}

/// GET /api/v1/admin/languages
pub async fn list_languages(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<FilterLanguagesRequest>,
) -> ApiResult<PaginationResponse<Language>> {
    let page = page.resolve(&state.config.api);
    Ok(ApiResponse::success(state.languages.filter_all(filter, page).await?))
}

/// POST /api/v1/admin/languages
pub async fn create_language(
    State(state): State<AppState>,
    Json(req): Json<CreateLanguageRequest>,
) -> ApiResult<Language> {
    Ok(ApiResponse::created(state.languages.create_one(req).await?))
}

/// PATCH /api/v1/admin/languages
pub async fn update_language(
    State(state): State<AppState>,
    Json(req): Json<UpdateLanguageRequest>,
) -> ApiResult<Language> {
    Ok(ApiResponse::success(state.languages.update_one(req).await?))
}

/// DELETE /api/v1/admin/languages/:id
pub async fn delete_language(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.languages.delete_one(&id).await?;
    Ok(ApiResponse::no_content())
}
