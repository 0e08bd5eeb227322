use std::sync::Arc;

use tracing::debug;

use super::{paginate, require, where_in, ServiceError, ServiceResult};
use crate::database::models::Prompt;
use crate::database::Repository;
use crate::dto::prompt::{CreateMessageRequest, CreatePromptRequest, FilterPromptsRequest, FindPromptByEntityAndContextRequest};
use crate::dto::{non_empty, PageRequest, PaginationResponse};
use crate::filter::{Condition, SortDirection};
use crate::ports::{AssistantClient, PromptAction, PromptRenderer, PromptSource};

/// Records rendered prompts and forwards them to the assistant.
///
/// Sends happen after the row is written, so an assistant failure still leaves the prompt
/// recorded and findable by its entity.
#[derive(Clone)]
pub struct PromptService {
    repo: Arc<dyn Repository<Prompt>>,
    renderer: Arc<dyn PromptRenderer>,
    assistant: Arc<dyn AssistantClient>,
}

impl PromptService {
    pub fn new(
        repo: Arc<dyn Repository<Prompt>>,
        renderer: Arc<dyn PromptRenderer>,
        assistant: Arc<dyn AssistantClient>,
    ) -> Self {
        Self { repo, renderer, assistant }
    }

    pub async fn get_one(&self, id: &str) -> ServiceResult<Prompt> {
        require(id, "id")?;
        Ok(self.repo.get(id, false).await?)
    }

    pub async fn filter_all(&self, req: FilterPromptsRequest, page: PageRequest) -> ServiceResult<PaginationResponse<Prompt>> {
        let mut filter = self.repo.query();
        filter = where_in(filter, "id", req.ids);
        filter = where_in(filter, "context_id", req.context_ids);

        paginate(self.repo.as_ref(), filter, page, false).await
    }

    /// Most recent prompt recorded for the entity, optionally within one context.
    pub async fn find_by_entity_and_context(&self, req: FindPromptByEntityAndContextRequest) -> ServiceResult<Prompt> {
        require(&req.entity_id, "entity id")?;
        let mut filter = self
            .repo
            .query()
            .where_clause(Condition::eq("entity_id", req.entity_id.as_str()));
        if let Some(context_id) = non_empty(req.context_id) {
            filter = filter.where_clause(Condition::eq("context_id", context_id));
        }
        let filter = filter.order("created_at", SortDirection::Desc).limit(1);

        self.repo
            .find(&filter, false)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound(format!("no prompt for entity {}", req.entity_id)))
    }

    /// Renders, records, then sends. Returns the send error, if any, after the row exists.
    pub async fn generate_and_send_prompt(&self, req: CreatePromptRequest) -> ServiceResult<Prompt> {
        require(&req.context_id, "context id")?;
        let value = self.renderer.generate_prompt_with(&req.source, req.action).await?;

        let prompt = self
            .repo
            .create(Prompt { value, context_id: req.context_id, entity_id: req.entity_id, ..Default::default() })
            .await?;
        debug!("Recorded prompt {} for context {}", prompt.base.id, prompt.context_id);

        self.assistant.send_prompt(&prompt.context_id, &prompt.value).await?;
        Ok(prompt)
    }

    /// Free-form message; the reply is returned, nothing is recorded.
    pub async fn generate_and_send_message(&self, req: CreateMessageRequest) -> ServiceResult<String> {
        require(&req.context_id, "context id")?;
        require(&req.value, "value")?;
        let text = self.renderer.generate_message(&req.value);
        Ok(self.assistant.send_prompt(&req.context_id, &text).await?)
    }

    /// Deletes the row, then asks the assistant to forget its content.
    pub async fn delete_one(&self, id: &str) -> ServiceResult<()> {
        let prompt = self.get_one(id).await?;
        self.repo.delete(id).await?;
        debug!("Deleted prompt {}", id);

        let forget = self
            .renderer
            .generate_prompt_with(&PromptSource::Text(prompt.value), PromptAction::Forget)
            .await?;
        self.assistant.send_prompt(&prompt.context_id, &forget).await?;
        Ok(())
    }

    /// Deletes the prompt correlated with an entity. Nothing to delete is not an error.
    pub async fn delete_for_entity(&self, entity_id: &str, context_id: &str) -> ServiceResult<()> {
        let req = FindPromptByEntityAndContextRequest {
            entity_id: entity_id.to_string(),
            context_id: Some(context_id.to_string()),
        };
        match self.find_by_entity_and_context(req).await {
            Ok(prompt) => self.delete_one(&prompt.base.id).await,
            Err(ServiceError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Replaces the entity's prompt with a freshly rendered one.
    pub async fn update_prompt(&self, req: CreatePromptRequest) -> ServiceResult<Prompt> {
        if let Some(entity_id) = req.entity_id.as_deref() {
            self.delete_for_entity(entity_id, &req.context_id).await?;
        }
        self.generate_and_send_prompt(req).await
    }
}
