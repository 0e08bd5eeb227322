use std::sync::Arc;

use sqlx::PgPool;
use tracing::{info, warn};

use crate::adapters::{Blake3PasswordHasher, LocalFileStorage, StubAssistantClient, TemplatePromptRenderer};
use crate::auth::{JwtError, JwtService};
use crate::config::AppConfig;
use crate::database::models::{Context, Document, Language, Note, Prompt, User, UserLanguage};
use crate::database::{DatabaseError, DatabaseManager, HasMany, InMemoryRepository, ManyToMany, PgRepository, Repository};
use crate::ports::{AssistantClient, FileStorage, PasswordHasher, PortError, PromptRenderer};
use crate::services::{
    AuthService, ContextService, DocumentService, LanguageService, NoteService, PromptService, UserService,
};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error("Failed to prepare file storage: {0}")]
    Storage(#[from] PortError),
}

/// One repository handle per entity.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn Repository<User>>,
    pub user_languages: Arc<dyn Repository<UserLanguage>>,
    pub languages: Arc<dyn Repository<Language>>,
    pub contexts: Arc<dyn Repository<Context>>,
    pub notes: Arc<dyn Repository<Note>>,
    pub documents: Arc<dyn Repository<Document>>,
    pub prompts: Arc<dyn Repository<Prompt>>,
}

impl Repositories {
    /// Postgres repositories with their preloaded relations and owned rows declared.
    pub fn postgres(pool: &PgPool) -> Self {
        let users = PgRepository::<User>::new(pool.clone())
            .with_preload(HasMany::<User, Note>::new("user_id", |u, v| u.notes = v))
            .with_preload(HasMany::<User, Document>::new("user_id", |u, v| u.documents = v))
            .with_preload(HasMany::<User, Context>::new("user_id", |u, v| u.contexts = v))
            .with_preload(ManyToMany::<User, Language>::new("user_languages", "user_id", "language_id", |u, v| {
                u.languages = v
            }))
            .with_cascade("notes", "user_id")
            .with_cascade("documents", "user_id")
            .with_cascade_through("prompts", "context_id", "contexts", "user_id")
            .with_cascade("contexts", "user_id")
            .with_cascade("user_languages", "user_id");

        let languages = PgRepository::<Language>::new(pool.clone())
            .with_preload(HasMany::<Language, Note>::new("language_id", |l, v| l.notes = v))
            .with_preload(HasMany::<Language, Context>::new("language_id", |l, v| l.contexts = v))
            .with_cascade("user_languages", "language_id");

        let contexts = PgRepository::<Context>::new(pool.clone())
            .with_preload(HasMany::<Context, Note>::new("context_id", |c, v| c.notes = v))
            .with_preload(HasMany::<Context, Document>::new("context_id", |c, v| c.documents = v))
            .with_preload(HasMany::<Context, Prompt>::new("context_id", |c, v| c.prompts = v))
            .with_cascade("notes", "context_id")
            .with_cascade("documents", "context_id")
            .with_cascade("prompts", "context_id");

        let notes = PgRepository::<Note>::new(pool.clone())
            .with_preload(HasMany::<Note, Document>::new("note_id", |n, v| n.documents = v))
            .with_cascade("documents", "note_id");

        Self {
            users: Arc::new(users),
            user_languages: Arc::new(PgRepository::<UserLanguage>::new(pool.clone())),
            languages: Arc::new(languages),
            contexts: Arc::new(contexts),
            notes: Arc::new(notes),
            documents: Arc::new(PgRepository::<Document>::new(pool.clone())),
            prompts: Arc::new(PgRepository::<Prompt>::new(pool.clone())),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryRepository::<User>::new()),
            user_languages: Arc::new(InMemoryRepository::<UserLanguage>::new()),
            languages: Arc::new(InMemoryRepository::<Language>::new()),
            contexts: Arc::new(InMemoryRepository::<Context>::new()),
            notes: Arc::new(InMemoryRepository::<Note>::new()),
            documents: Arc::new(InMemoryRepository::<Document>::new()),
            prompts: Arc::new(InMemoryRepository::<Prompt>::new()),
        }
    }
}

/// Everything handlers reach, built once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub database: Option<Arc<DatabaseManager>>,
    pub auth: AuthService,
    pub users: UserService,
    pub languages: LanguageService,
    pub contexts: ContextService,
    pub notes: NoteService,
    pub documents: DocumentService,
    pub prompts: PromptService,
}

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories, database: Option<Arc<DatabaseManager>>) -> Result<Self, StateError> {
        let hasher: Arc<dyn PasswordHasher> =
            Arc::new(Blake3PasswordHasher::new(&config.secret_key(), &config.security.password_salt));
        let files: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(
            config.storage.base_path.clone(),
            config.storage.save_locations.clone(),
        ));
        let assistant: Arc<dyn AssistantClient> = Arc::new(StubAssistantClient::new(config.assistant.enabled));
        let renderer: Arc<dyn PromptRenderer> = Arc::new(TemplatePromptRenderer::new(files.clone()));
        let jwt = JwtService::new(&config.secret_key(), config.security.jwt_expiry_hours)?;

        let users = UserService::new(repos.users, repos.user_languages, hasher);
        Ok(Self {
            auth: AuthService::new(users.clone(), jwt),
            users,
            languages: LanguageService::new(repos.languages),
            contexts: ContextService::new(repos.contexts, assistant.clone()),
            notes: NoteService::new(repos.notes),
            documents: DocumentService::new(repos.documents, files, config.storage.accepted_extensions.clone()),
            prompts: PromptService::new(repos.prompts, renderer, assistant),
            config: Arc::new(config),
            database,
        })
    }

    /// Connects to Postgres when a url is configured, otherwise falls back to the in-memory store.
    pub async fn connect(config: AppConfig) -> Result<Self, StateError> {
        LocalFileStorage::new(config.storage.base_path.clone(), config.storage.save_locations.clone())
            .prepare()
            .await?;

        if config.database.url.is_none() {
            warn!("No database configured, using the in-memory store; data is lost on exit");
            return Self::new(config, Repositories::in_memory(), None);
        }

        let manager = DatabaseManager::connect(&config.database).await?;
        info!("Connected to database");
        let repos = Repositories::postgres(manager.pool());
        Self::new(config, repos, Some(Arc::new(manager)))
    }
}
