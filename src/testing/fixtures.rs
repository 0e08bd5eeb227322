use std::sync::Arc;

use tempfile::TempDir;

use crate::adapters::{Blake3PasswordHasher, LocalFileStorage, StubAssistantClient, TemplatePromptRenderer};
use crate::config::AppConfig;
use crate::database::models::{Prompt, User, UserLanguage};
use crate::database::InMemoryRepository;
use crate::dto::user::CreateUserRequest;
use crate::services::{PromptService, UserService};
use crate::state::{AppState, Repositories};

pub fn config(storage: &TempDir) -> AppConfig {
    let mut config = AppConfig::development();
    config.storage.base_path = storage.path().to_path_buf();
    config.security.jwt_secret = Some("test-secret".to_string());
    config
}

pub fn user_service() -> UserService {
    UserService::new(
        Arc::new(InMemoryRepository::<User>::new()),
        Arc::new(InMemoryRepository::<UserLanguage>::new()),
        Arc::new(Blake3PasswordHasher::new("test-secret", "test-salt")),
    )
}

/// Password is always `secret`.
pub fn user_request(email: &str) -> CreateUserRequest {
    CreateUserRequest { name: "Ana".to_string(), email: email.to_string(), password: "secret".to_string() }
}

pub fn prompt_service(assistant_enabled: bool) -> (PromptService, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let files = Arc::new(LocalFileStorage::new(dir.path(), vec!["documents".to_string()]));
    let service = PromptService::new(
        Arc::new(InMemoryRepository::<Prompt>::new()),
        Arc::new(TemplatePromptRenderer::new(files)),
        Arc::new(StubAssistantClient::new(assistant_enabled)),
    );
    (service, dir)
}

/// A full in-memory `AppState`. Storage lives until the context is dropped.
pub struct TestContext {
    pub state: AppState,
    _storage: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let storage = tempfile::tempdir().expect("tempdir");
        let state = AppState::new(config(&storage), Repositories::in_memory(), None).expect("state");
        Self { state, _storage: storage }
    }
}
