use thiserror::Error;

use crate::database::{DatabaseError, Entity, Repository};
use crate::dto::{PageRequest, PaginationResponse};
use crate::filter::{Condition, Filter, SortDirection};
use crate::ports::PortError;

pub mod auth_service;
pub mod context_service;
pub mod document_service;
pub mod language_service;
pub mod note_service;
pub mod prompt_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use context_service::ContextService;
pub use document_service::DocumentService;
pub use language_service::LanguageService;
pub use note_service::NoteService;
pub use prompt_service::PromptService;
pub use user_service::UserService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Read {read} bytes but wrote {written}")]
    IoMismatch { read: usize, written: usize },

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Database(DatabaseError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(what) => ServiceError::NotFound(what),
            other => ServiceError::Database(other),
        }
    }
}

impl From<PortError> for ServiceError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => ServiceError::NotFound(what),
            PortError::Argument(msg) => ServiceError::Argument(msg),
            PortError::Unsupported(msg) => ServiceError::Unsupported(msg),
            PortError::IoMismatch { read, written } => ServiceError::IoMismatch { read, written },
            PortError::Io(e) => ServiceError::Unknown(e.to_string()),
            PortError::Unexpected(msg) => ServiceError::Unknown(msg),
        }
    }
}

/// Runs `count` and `find` over the same predicates, ordered by creation time.
pub async fn paginate<T: Entity>(
    repo: &dyn Repository<T>,
    filter: Filter,
    page: PageRequest,
    preload: bool,
) -> ServiceResult<PaginationResponse<T>> {
    let filter = filter
        .order("created_at", SortDirection::Asc)
        .offset(page.offset())
        .limit(page.size);

    let total_count = repo.count(&filter).await?;
    let content = repo.find(&filter, preload).await?;

    Ok(PaginationResponse {
        page: page.page_number(),
        size: content.len() as u64,
        total_count,
        content,
    })
}

/// Adds an `IN` predicate when the list was supplied.
pub(crate) fn where_in(filter: Filter, column: &str, values: Option<Vec<String>>) -> Filter {
    match values {
        Some(values) => filter.where_clause(Condition::is_in(column, values)),
        None => filter,
    }
}

pub(crate) fn where_eq(filter: Filter, column: &str, value: Option<String>) -> Filter {
    match crate::dto::non_empty(value) {
        Some(value) => filter.where_clause(Condition::eq(column, value)),
        None => filter,
    }
}

/// Substring match, `%value%`.
pub(crate) fn where_contains(filter: Filter, column: &str, value: Option<String>) -> Filter {
    match crate::dto::non_empty(value) {
        Some(value) => filter.where_clause(Condition::like(column, format!("%{}%", value))),
        None => filter,
    }
}

pub(crate) fn require(value: &str, field: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Argument(format!("{} is required", field)));
    }
    Ok(())
}
