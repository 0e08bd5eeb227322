use async_trait::async_trait;
use tracing::debug;

use crate::ports::{AssistantClient, PortError, PortResult};

/// Placeholder assistant. Disabled, it echoes what it is sent; enabled, every call fails as
/// unsupported because no backend is wired in.
pub struct StubAssistantClient {
    enabled: bool,
}

impl StubAssistantClient {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn ensure_disabled(&self) -> PortResult<()> {
        if self.enabled {
            return Err(PortError::Unsupported("AI assistant backend is not implemented".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AssistantClient for StubAssistantClient {
    async fn send_prompt(&self, context_id: &str, text: &str) -> PortResult<String> {
        self.ensure_disabled()?;
        debug!(context_id, "assistant: echo prompt");
        Ok(text.to_string())
    }

    async fn create_context(&self, context_id: &str) -> PortResult<String> {
        self.ensure_disabled()?;
        Ok(context_id.to_string())
    }

    async fn reset_context(&self, _context_id: &str, _hard: bool) -> PortResult<()> {
        self.ensure_disabled()
    }

    async fn delete_context(&self, _context_id: &str, _hard: bool) -> PortResult<()> {
        self.ensure_disabled()
    }
}
