use axum::{
    extract::{Multipart, Path, Query, State},
    Extension,
};

use super::{ai_error, ensure_owned, Deleted};
use crate::dto::document::{
    CreateDocumentBase, CreateDocumentRequest, CreateDocumentsRequest, DocumentResponse, DocumentWrapped,
    FilterDocumentsRequest, UploadedFile,
};
use crate::dto::prompt::CreatePromptRequest;
use crate::dto::{PageQuery, PaginationResponse};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ports::PromptSource;
use crate::state::AppState;

/// Reads the metadata parts and every `file`/`files` part of an upload.
async fn read_upload(mut multipart: Multipart) -> Result<(CreateDocumentBase, Vec<UploadedFile>), ApiError> {
    let mut base = CreateDocumentBase::default();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| ApiError::bad_request(e.to_string()))? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "files" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::bad_request("file part has no file name"))?;
                let content = field.bytes().await.map_err(|e| ApiError::bad_request(e.to_string()))?;
                files.push(UploadedFile { file_name, content: content.to_vec() });
            }
            "location" | "contextId" | "entityType" | "entityId" | "isReadableByAll" => {
                let value = field.text().await.map_err(|e| ApiError::bad_request(e.to_string()))?;
                match name.as_str() {
                    "location" => base.location = value,
                    "contextId" => base.context_id = value,
                    "entityType" => base.entity_type = value,
                    "entityId" => base.entity_id = value,
                    _ => base.is_readable_by_all = value.trim().eq_ignore_ascii_case("true"),
                }
            }
            _ => {}
        }
    }

    if base.location.is_empty() {
        base.location = "documents".to_string();
    }
    Ok((base, files))
}

async fn authorize_upload(state: &AppState, caller: &AuthUser, base: &mut CreateDocumentBase) -> Result<(), ApiError> {
    base.user_id = caller.user_id.clone();
    let owns_context = state.contexts.check_if_belongs_to_user(&base.context_id, &caller.user_id).await?;
    ensure_owned(caller, owns_context)?;
    if base.entity_type == "note" {
        let owns_note = state.notes.check_if_belongs_to_user(&base.entity_id, &caller.user_id).await?;
        ensure_owned(caller, owns_note)?;
    }
    Ok(())
}

async fn forward(state: &AppState, wrapped: DocumentWrapped) -> DocumentResponse {
    let document = &wrapped.document;
    let req = CreatePromptRequest::remember(
        PromptSource::Document(document.clone()),
        document.context_id.clone(),
        Some(document.base.id.clone()),
    );
    let ai_error = ai_error(state.prompts.generate_and_send_prompt(req).await);
    DocumentResponse { document: wrapped, ai_error }
}

/// POST /api/v1/documents - multipart with exactly one `file` part
pub async fn create_document(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<DocumentResponse> {
    let (mut base, mut files) = read_upload(multipart).await?;
    if files.len() != 1 {
        return Err(ApiError::bad_request("expected exactly one file"));
    }
    authorize_upload(&state, &caller, &mut base).await?;

    let file = files.remove(0);
    let wrapped = state.documents.create_one(CreateDocumentRequest { base, file }).await?;
    Ok(ApiResponse::created(forward(&state, wrapped).await))
}

/// POST /api/v1/documents/bulk - multipart with one or more `files` parts
pub async fn create_documents(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Vec<DocumentResponse>> {
    let (mut base, files) = read_upload(multipart).await?;
    authorize_upload(&state, &caller, &mut base).await?;

    let created = state.documents.create_bulk(CreateDocumentsRequest { base, files }).await?;
    let mut responses = Vec::with_capacity(created.len());
    for wrapped in created {
        responses.push(forward(&state, wrapped).await);
    }
    Ok(ApiResponse::created(responses))
}

/// GET /api/v1/documents/:id - owners, or anyone when readable by all
pub async fn get_document(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<DocumentWrapped> {
    let wrapped = state.documents.get_one(&id).await?;
    if !wrapped.document.is_readable_by_all {
        ensure_owned(&caller, wrapped.document.user_id == caller.user_id)?;
    }
    Ok(ApiResponse::success(wrapped))
}

/// GET /api/v1/documents - the caller's documents only
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(page): Query<PageQuery>,
    Query(mut filter): Query<FilterDocumentsRequest>,
) -> ApiResult<PaginationResponse<DocumentWrapped>> {
    filter.user_ids = Some(vec![caller.user_id]);
    let page = page.resolve(&state.config.api);
    Ok(ApiResponse::success(state.documents.filter_all(filter, page).await?))
}

/// DELETE /api/v1/documents/:id - file, row, then the correlated prompt
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    ensure_owned(&caller, state.documents.check_if_belongs_to_user(&id, &caller.user_id).await?)?;
    let context_id = state.documents.get_one(&id).await?.document.context_id;

    state.documents.delete_one(&id).await?;
    let ai_error = ai_error(state.prompts.delete_for_entity(&id, &context_id).await);
    Ok(ApiResponse::success(Deleted { id, ai_error }))
}
