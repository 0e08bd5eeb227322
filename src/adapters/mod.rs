pub mod assistant;
pub mod file_storage;
pub mod hashing;
pub mod prompt_renderer;

pub use assistant::StubAssistantClient;
pub use file_storage::LocalFileStorage;
pub use hashing::Blake3PasswordHasher;
pub use prompt_renderer::TemplatePromptRenderer;
