use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::{paginate, require, where_contains, where_eq, where_in, ServiceError, ServiceResult};
use crate::database::models::Document;
use crate::database::Repository;
use crate::dto::document::{
    CreateDocumentBase, CreateDocumentRequest, CreateDocumentsRequest, DocumentWrapped, FilterDocumentsRequest,
    UploadedFile,
};
use crate::dto::{PageRequest, PaginationResponse};
use crate::ports::{FileStorage, PortError, StartPoint};

/// Files are streamed to storage in chunks of this size.
pub const CHUNK_SIZE: usize = 32 * 1024;

#[derive(Clone)]
pub struct DocumentService {
    repo: Arc<dyn Repository<Document>>,
    files: Arc<dyn FileStorage>,
    accepted_extensions: Arc<[String]>,
}

impl DocumentService {
    /// An empty `accepted_extensions` accepts every extension.
    pub fn new(repo: Arc<dyn Repository<Document>>, files: Arc<dyn FileStorage>, accepted_extensions: Vec<String>) -> Self {
        let accepted_extensions = accepted_extensions.into_iter().map(|e| e.trim_start_matches('.').to_lowercase()).collect();
        Self { repo, files, accepted_extensions }
    }

    pub async fn check_if_belongs_to_user(&self, id: &str, user_id: &str) -> ServiceResult<bool> {
        let document = self.repo.get(id, false).await?;
        Ok(document.user_id == user_id)
    }

    pub async fn get_one(&self, id: &str) -> ServiceResult<DocumentWrapped> {
        let document = self.repo.get(id, true).await?;
        Ok(self.wrap(document))
    }

    pub async fn filter_all(
        &self,
        req: FilterDocumentsRequest,
        page: PageRequest,
    ) -> ServiceResult<PaginationResponse<DocumentWrapped>> {
        let mut filter = self.repo.query();
        filter = where_in(filter, "id", req.ids);
        filter = where_in(filter, "user_id", req.user_ids);
        filter = where_contains(filter, "name", req.name);
        filter = where_eq(filter, "location", req.location);
        filter = where_eq(filter, "extension", req.extension.map(|e| e.to_lowercase()));
        filter = where_in(filter, "note_id", req.note_ids);
        filter = where_in(filter, "context_id", req.context_ids);

        let page = paginate(self.repo.as_ref(), filter, page, false).await?;
        Ok(page.map(|document| self.wrap(document)))
    }

    /// Writes the file, then records its metadata.
    pub async fn create_one(&self, req: CreateDocumentRequest) -> ServiceResult<DocumentWrapped> {
        let CreateDocumentRequest { base, file } = req;
        require(&base.user_id, "user id")?;
        require(&base.context_id, "context id")?;
        require(&file.file_name, "file name")?;

        let extension = self.extension_of(&file.file_name)?;
        let note_id = owner_note_id(&base)?;

        self.write_file(&base.location, &file).await?;

        let document = self
            .repo
            .create(Document {
                name: file.file_name,
                location: base.location,
                extension,
                note_id,
                user_id: base.user_id,
                context_id: base.context_id,
                is_readable_by_all: base.is_readable_by_all,
                ..Default::default()
            })
            .await?;

        debug!("Stored document {} at {}/{}", document.base.id, document.location, document.name);
        Ok(self.wrap(document))
    }

    /// One task per file. Any failure fails the whole call; the order of the returned
    /// documents is not the order of the input files.
    pub async fn create_bulk(&self, req: CreateDocumentsRequest) -> ServiceResult<Vec<DocumentWrapped>> {
        let CreateDocumentsRequest { base, files } = req;
        if files.is_empty() {
            return Err(ServiceError::Argument("files are required".to_string()));
        }
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();
        let (error_tx, mut error_rx) = mpsc::unbounded_channel();

        let tasks: Vec<_> = files
            .into_iter()
            .map(|file| {
                let service = self.clone();
                let base = base.clone();
                let result_tx = result_tx.clone();
                let error_tx = error_tx.clone();
                tokio::spawn(async move {
                    match service.create_one(CreateDocumentRequest { base, file }).await {
                        Ok(document) => {
                            let _ = result_tx.send(document);
                        }
                        Err(e) => {
                            let _ = error_tx.send(e);
                        }
                    }
                })
            })
            .collect();
        drop(result_tx);
        drop(error_tx);

        for joined in join_all(tasks).await {
            if let Err(e) = joined {
                error!("Document upload task failed: {}", e);
                return Err(ServiceError::Unknown(e.to_string()));
            }
        }

        if let Ok(e) = error_rx.try_recv() {
            return Err(e);
        }

        let mut documents = Vec::new();
        while let Ok(document) = result_rx.try_recv() {
            documents.push(document);
        }
        Ok(documents)
    }

    /// Removes the stored file, then the row. A file that is already gone is not an error.
    pub async fn delete_one(&self, id: &str) -> ServiceResult<()> {
        let document = self.repo.get(id, false).await?;

        match self.files.delete_file(&document.location, &document.name).await {
            Ok(()) => {}
            Err(PortError::NotFound(_)) => {
                warn!("File for document {} was already missing", id);
            }
            Err(e) => return Err(e.into()),
        }

        self.repo.delete(id).await?;
        debug!("Deleted document {}", id);
        Ok(())
    }

    fn wrap(&self, document: Document) -> DocumentWrapped {
        let path = self.files.full_path(&document.location, &document.name);
        DocumentWrapped { document, path }
    }

    fn extension_of(&self, file_name: &str) -> ServiceResult<String> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if !self.accepted_extensions.is_empty() && !self.accepted_extensions.contains(&extension) {
            return Err(ServiceError::Argument(format!("extension '{}' is not accepted", extension)));
        }
        Ok(extension)
    }

    async fn write_file(&self, location: &str, file: &UploadedFile) -> ServiceResult<()> {
        if file.content.is_empty() {
            self.files.save_file(location, &file.file_name, &[], StartPoint::Beginning).await?;
            return Ok(());
        }

        let mut offset = 0usize;
        for chunk in file.content.chunks(CHUNK_SIZE) {
            let start = if offset == 0 { StartPoint::Beginning } else { StartPoint::Custom(offset as u64) };
            let written = self.files.save_file(location, &file.file_name, chunk, start).await?;
            if written != chunk.len() {
                return Err(ServiceError::IoMismatch { read: chunk.len(), written });
            }
            offset += written;
        }
        Ok(())
    }
}

/// The owning note, if any. Documents without an owner type stand alone.
fn owner_note_id(base: &CreateDocumentBase) -> ServiceResult<Option<String>> {
    match base.entity_type.trim() {
        "" => Ok(None),
        "note" => {
            require(&base.entity_id, "entity id")?;
            Ok(Some(base.entity_id.clone()))
        }
        other => Err(ServiceError::Unsupported(format!("documents cannot be attached to '{}'", other))),
    }
}
