use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;

use super::ensure_owned;
use crate::database::models::{Context, Prompt};
use crate::dto::context::{CreateContextRequest, FilterContextsRequest, UpdateContextRequest};
use crate::dto::prompt::{CreateMessageRequest, FilterPromptsRequest, MessageResponse};
use crate::dto::{PageQuery, PaginationResponse};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    pub hard: bool,
}

async fn ensure_context_owner(state: &AppState, caller: &AuthUser, id: &str) -> Result<(), crate::error::ApiError> {
    let owned = state.contexts.check_if_belongs_to_user(id, &caller.user_id).await?;
    ensure_owned(caller, owned)
}

/// POST /api/v1/contexts
pub async fn create_context(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(mut req): Json<CreateContextRequest>,
) -> ApiResult<Context> {
    req.user_id = caller.user_id;
    Ok(ApiResponse::created(state.contexts.create_one(req).await?))
}

/// GET /api/v1/contexts/:id
pub async fn get_context(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Context> {
    ensure_context_owner(&state, &caller, &id).await?;
    Ok(ApiResponse::success(state.contexts.get_one(&id).await?))
}

/// GET /api/v1/contexts - the caller's contexts only
pub async fn list_contexts(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(page): Query<PageQuery>,
    Query(mut filter): Query<FilterContextsRequest>,
) -> ApiResult<PaginationResponse<Context>> {
    filter.user_ids = Some(vec![caller.user_id]);
    let page = page.resolve(&state.config.api);
    Ok(ApiResponse::success(state.contexts.filter_all(filter, page).await?))
}

/// PATCH /api/v1/contexts
pub async fn update_context(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<UpdateContextRequest>,
) -> ApiResult<Context> {
    ensure_context_owner(&state, &caller, &req.id).await?;
    Ok(ApiResponse::success(state.contexts.update_one(req).await?))
}

/// DELETE /api/v1/contexts/:id
pub async fn delete_context(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    ensure_context_owner(&state, &caller, &id).await?;
    state.contexts.delete_one(&id).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/v1/contexts/:id/reset[?hard=true]
pub async fn reset_context(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(query): Query<ResetQuery>,
) -> ApiResult<()> {
    ensure_context_owner(&state, &caller, &id).await?;
    state.contexts.reset(&id, query.hard).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/v1/contexts/:id/prompts
pub async fn list_context_prompts(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResult<PaginationResponse<Prompt>> {
    ensure_context_owner(&state, &caller, &id).await?;
    let filter = FilterPromptsRequest { context_ids: Some(vec![id]), ..Default::default() };
    let page = page.resolve(&state.config.api);
    Ok(ApiResponse::success(state.prompts.filter_all(filter, page).await?))
}

/// POST /api/v1/contexts/:id/messages
pub async fn send_message(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(mut req): Json<CreateMessageRequest>,
) -> ApiResult<MessageResponse> {
    ensure_context_owner(&state, &caller, &id).await?;
    req.context_id = id;
    let reply = state.prompts.generate_and_send_message(req).await?;
    Ok(ApiResponse::success(MessageResponse { reply }))
}
