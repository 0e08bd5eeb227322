use axum::extract::{Path, Query, State};

use crate::database::models::Language;
use crate::dto::language::FilterLanguagesRequest;
use crate::dto::{PageQuery, PaginationResponse};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/v1/languages/:id
pub async fn get_language(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Language> {
    Ok(ApiResponse::success(state.languages.get_one(&id).await?))
}

/// GET /api/v1/languages
pub async fn list_languages(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
    Query(filter): Query<FilterLanguagesRequest>,
) -> ApiResult<PaginationResponse<Language>> {
    let page = page.resolve(&state.config.api);
    Ok(ApiResponse::success(state.languages.filter_all(filter, page).await?))
}
