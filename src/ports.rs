//! Narrow contracts for the collaborators services depend on. Implementations live in
//! `crate::adapters`.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::database::models::{Document, Note};

#[derive(Debug, Error)]
pub enum PortError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Read {read} bytes but wrote {written}")]
    IoMismatch { read: usize, written: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type PortResult<T> = Result<T, PortError>;

/// Password digests.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> String;
    fn verify(&self, digest: &str, plaintext: &str) -> bool;
}

/// Where a file handle starts. Reads only support `Beginning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPoint {
    /// Create or truncate.
    Beginning,
    /// Append.
    End,
    /// Seek to a byte offset without truncating.
    Custom(u64),
}

pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Writes `buffer` and returns the number of bytes the storage accepted.
    async fn save_file(&self, location: &str, name: &str, buffer: &[u8], start: StartPoint) -> PortResult<usize>;

    async fn get_file(&self, location: &str, name: &str, start: StartPoint) -> PortResult<FileReader>;

    async fn list_files(&self, location: &str) -> PortResult<Vec<String>>;

    async fn delete_file(&self, location: &str, name: &str) -> PortResult<()>;

    fn full_path(&self, location: &str, name: &str) -> PathBuf;
}

/// Conversation backend. `hard` resets and deletes drop the assistant-side history entirely.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    async fn send_prompt(&self, context_id: &str, text: &str) -> PortResult<String>;

    /// Opens a conversation and returns the assistant-side id for it.
    async fn create_context(&self, context_id: &str) -> PortResult<String>;

    async fn reset_context(&self, context_id: &str, hard: bool) -> PortResult<()>;

    async fn delete_context(&self, context_id: &str, hard: bool) -> PortResult<()>;
}

/// What a prompt is rendered from.
#[derive(Debug, Clone)]
pub enum PromptSource {
    Text(String),
    Note(Note),
    Document(Document),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    Initial,
    Prompt,
    Message,
    Remember,
    Forget,
    ForgetAll,
}

const INITIAL_INSTRUCTIONS: &str = "Hi, you are going to assist customers with their questions or any request within the context given to you. Rules are these:\n 1. There will be prompts where you will need to do according to the action in them. Syntax is \"Prompt(<action>)\"\n 2. You will answer messages within the context as an assistant when a message sent. Syntax is \"Message(<string>)\"\n 3. Actions might be remember, forget or forgetAll. You will do the action and if it is done successfully respond \"done\", if there is any error on your side please respond with \"failed. <error>\". Syntax is \"<action>(<string optional>)\"\n 4. Remember action is for you to keep a given message in mind for future interactions\n 5. Forget action is for you to forget and dont bring up a given info anymore\n 6. ForgetAll action is for you to forget all the previous Prompts given and start fresh.\nPlease, try to keep answers short and focused and thank you for assisting me and the customers. ";

impl PromptAction {
    /// Wraps `text` in this action's template. `Initial` and `ForgetAll` ignore it.
    pub fn render(&self, text: &str) -> String {
        match self {
            PromptAction::Initial => INITIAL_INSTRUCTIONS.to_string(),
            PromptAction::Prompt => format!("Prompt({})", text),
            PromptAction::Message => format!("Message({})", text),
            PromptAction::Remember => format!("Remember({})", text),
            PromptAction::Forget => format!("Forget({})", text),
            PromptAction::ForgetAll => "ForgetAll()".to_string(),
        }
    }
}

#[async_trait]
pub trait PromptRenderer: Send + Sync {
    /// `Prompt(Remember(<text>))`.
    async fn generate_prompt(&self, source: &PromptSource) -> PortResult<String>;

    /// `Prompt(<action>(<text>))`.
    async fn generate_prompt_with(&self, source: &PromptSource, action: PromptAction) -> PortResult<String>;

    /// `Message(<text>)`.
    fn generate_message(&self, text: &str) -> String;
}
