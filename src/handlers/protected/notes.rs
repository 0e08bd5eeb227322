use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use super::{ai_error, ensure_owned, Deleted};
use crate::database::models::Note;
use crate::dto::note::{CreateNoteRequest, FilterNotesRequest, NoteResponse, UpdateNoteRequest};
use crate::dto::prompt::CreatePromptRequest;
use crate::dto::{PageQuery, PaginationResponse};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ports::PromptSource;
use crate::state::AppState;

fn remember(note: &Note) -> CreatePromptRequest {
    CreatePromptRequest::remember(PromptSource::Note(note.clone()), note.context_id.clone(), Some(note.base.id.clone()))
}

/// POST /api/v1/notes - records the note, then forwards it to the assistant
pub async fn create_note(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(mut req): Json<CreateNoteRequest>,
) -> ApiResult<NoteResponse> {
    req.user_id = Some(caller.user_id.clone());
    let owns_context = state.contexts.check_if_belongs_to_user(&req.context_id, &caller.user_id).await?;
    ensure_owned(&caller, owns_context)?;

    let note = state.notes.create_one(req).await?;
    let ai_error = ai_error(state.prompts.generate_and_send_prompt(remember(&note)).await);
    Ok(ApiResponse::created(NoteResponse { note, ai_error }))
}

/// GET /api/v1/notes/:id
pub async fn get_note(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Note> {
    ensure_owned(&caller, state.notes.check_if_belongs_to_user(&id, &caller.user_id).await?)?;
    Ok(ApiResponse::success(state.notes.get_one(&id).await?))
}

/// GET /api/v1/notes - the caller's notes only
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(page): Query<PageQuery>,
    Query(mut filter): Query<FilterNotesRequest>,
) -> ApiResult<PaginationResponse<Note>> {
    filter.user_ids = Some(vec![caller.user_id]);
    let page = page.resolve(&state.config.api);
    Ok(ApiResponse::success(state.notes.filter_all(filter, page).await?))
}

/// PATCH /api/v1/notes - refreshes the correlated prompt
pub async fn update_note(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<UpdateNoteRequest>,
) -> ApiResult<NoteResponse> {
    ensure_owned(&caller, state.notes.check_if_belongs_to_user(&req.id, &caller.user_id).await?)?;

    let note = state.notes.update_one(req).await?;
    let ai_error = ai_error(state.prompts.update_prompt(remember(&note)).await);
    Ok(ApiResponse::success(NoteResponse { note, ai_error }))
}

/// DELETE /api/v1/notes/:id - also deletes the correlated prompt
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let note = state.notes.get_one(&id).await?;
    ensure_owned(&caller, note.user_id == caller.user_id)?;

    state.notes.delete_one(&id).await?;
    let ai_error = ai_error(state.prompts.delete_for_entity(&id, &note.context_id).await);
    Ok(ApiResponse::success(Deleted { id, ai_error }))
}
