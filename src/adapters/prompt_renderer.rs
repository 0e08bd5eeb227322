use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

use crate::ports::{FileStorage, PortResult, PromptAction, PromptRenderer, PromptSource, StartPoint};

/// Renders prompts from the fixed action templates. Documents are read in full from storage.
pub struct TemplatePromptRenderer {
    files: Arc<dyn FileStorage>,
}

impl TemplatePromptRenderer {
    pub fn new(files: Arc<dyn FileStorage>) -> Self {
        Self { files }
    }

    async fn source_text(&self, source: &PromptSource) -> PortResult<String> {
        match source {
            PromptSource::Text(text) => Ok(text.clone()),
            PromptSource::Note(note) => Ok(note.payload.clone()),
            PromptSource::Document(document) => {
                let mut reader = self
                    .files
                    .get_file(&document.location, &document.name, StartPoint::Beginning)
                    .await?;
                let mut content = Vec::new();
                reader.read_to_end(&mut content).await?;
                Ok(String::from_utf8_lossy(&content).into_owned())
            }
        }
    }
}

#[async_trait]
impl PromptRenderer for TemplatePromptRenderer {
    async fn generate_prompt(&self, source: &PromptSource) -> PortResult<String> {
        self.generate_prompt_with(source, PromptAction::Remember).await
    }

    async fn generate_prompt_with(&self, source: &PromptSource, action: PromptAction) -> PortResult<String> {
        let text = self.source_text(source).await?;
        Ok(PromptAction::Prompt.render(&action.render(&text)))
    }

    fn generate_message(&self, text: &str) -> String {
        PromptAction::Message.render(text)
    }
}
