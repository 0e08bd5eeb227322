use std::sync::Arc;

use tracing::debug;

use super::{paginate, require, where_contains, where_in, ServiceError, ServiceResult};
use crate::database::models::Note;
use crate::database::Repository;
use crate::dto::non_empty;
use crate::dto::note::{CreateNoteRequest, FilterNotesRequest, UpdateNoteRequest};
use crate::dto::{PageRequest, PaginationResponse};
use crate::filter::Locking;

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn Repository<Note>>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn Repository<Note>>) -> Self {
        Self { repo }
    }

    pub async fn check_if_belongs_to_user(&self, id: &str, user_id: &str) -> ServiceResult<bool> {
        let note = self.repo.get(id, false).await?;
        Ok(note.user_id == user_id)
    }

    pub async fn get_one(&self, id: &str) -> ServiceResult<Note> {
        Ok(self.repo.get(id, true).await?)
    }

    pub async fn filter_all(&self, req: FilterNotesRequest, page: PageRequest) -> ServiceResult<PaginationResponse<Note>> {
        let mut filter = self.repo.query();
        filter = where_in(filter, "id", req.ids);
        filter = where_contains(filter, "header", req.header);
        filter = where_in(filter, "user_id", req.user_ids);
        filter = where_in(filter, "language_id", req.language_ids);
        filter = where_in(filter, "context_id", req.context_ids);

        paginate(self.repo.as_ref(), filter, page, false).await
    }

    pub async fn create_one(&self, req: CreateNoteRequest) -> ServiceResult<Note> {
        let user_id = non_empty(req.user_id)
            .ok_or_else(|| ServiceError::Argument("user id is required".to_string()))?;
        require(&req.context_id, "context id")?;
        require(&req.language_id, "language id")?;
        require(&req.header, "header")?;

        let note = self
            .repo
            .create(Note {
                header: req.header,
                payload: req.payload,
                user_id,
                language_id: req.language_id,
                context_id: req.context_id,
                ..Default::default()
            })
            .await?;

        debug!("Created note {}", note.base.id);
        Ok(note)
    }

    /// Applies the supplied non-empty fields under a row lock.
    pub async fn update_one(&self, req: UpdateNoteRequest) -> ServiceResult<Note> {
        require(&req.id, "id")?;
        let header = non_empty(req.header);
        let payload = non_empty(req.payload);
        let language_id = non_empty(req.language_id);

        let filter = self.repo.query().clauses(Locking::ForUpdate);
        let note = self
            .repo
            .modify(
                &filter,
                &req.id,
                Box::new(move |note: &mut Note| {
                    if let Some(header) = header {
                        note.header = header;
                    }
                    if let Some(payload) = payload {
                        note.payload = payload;
                    }
                    if let Some(language_id) = language_id {
                        note.language_id = language_id;
                    }
                }),
            )
            .await?;

        debug!("Updated note {}", note.base.id);
        Ok(note)
    }

    pub async fn delete_one(&self, id: &str) -> ServiceResult<()> {
        self.repo.delete(id).await?;
        debug!("Deleted note {}", id);
        Ok(())
    }
}
