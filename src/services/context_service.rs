use std::sync::Arc;

use tracing::{debug, warn};

use super::{paginate, require, where_in, ServiceResult};
use crate::database::models::Context;
use crate::database::Repository;
use crate::dto::context::{CreateContextRequest, FilterContextsRequest, UpdateContextRequest};
use crate::dto::{non_empty, PageRequest, PaginationResponse};
use crate::ports::AssistantClient;

#[derive(Clone)]
pub struct ContextService {
    repo: Arc<dyn Repository<Context>>,
    assistant: Arc<dyn AssistantClient>,
}

impl ContextService {
    pub fn new(repo: Arc<dyn Repository<Context>>, assistant: Arc<dyn AssistantClient>) -> Self {
        Self { repo, assistant }
    }

    pub async fn check_if_belongs_to_user(&self, id: &str, user_id: &str) -> ServiceResult<bool> {
        let context = self.repo.get(id, false).await?;
        Ok(context.user_id == user_id)
    }

    pub async fn get_one(&self, id: &str) -> ServiceResult<Context> {
        Ok(self.repo.get(id, true).await?)
    }

    pub async fn filter_all(
        &self,
        req: FilterContextsRequest,
        page: PageRequest,
    ) -> ServiceResult<PaginationResponse<Context>> {
        let mut filter = self.repo.query();
        filter = where_in(filter, "id", req.ids);
        filter = where_in(filter, "user_id", req.user_ids);
        filter = where_in(filter, "language_id", req.language_ids);

        paginate(self.repo.as_ref(), filter, page, false).await
    }

    /// Stores the context, then opens the matching assistant conversation. An assistant
    /// failure leaves `external_id` empty.
    pub async fn create_one(&self, req: CreateContextRequest) -> ServiceResult<Context> {
        require(&req.user_id, "user id")?;
        require(&req.language_id, "language id")?;

        let mut context = self
            .repo
            .create(Context { user_id: req.user_id, language_id: req.language_id, ..Default::default() })
            .await?;

        match self.assistant.create_context(&context.base.id).await {
            Ok(external_id) => {
                context.external_id = external_id;
                context = self.repo.update(context).await?;
            }
            Err(e) => warn!("Assistant context for {} was not opened: {}", context.base.id, e),
        }

        debug!("Created context {}", context.base.id);
        Ok(context)
    }

    pub async fn update_one(&self, req: UpdateContextRequest) -> ServiceResult<Context> {
        require(&req.id, "id")?;
        let mut context = self.repo.get(&req.id, false).await?;
        if let Some(language_id) = non_empty(req.language_id) {
            context.language_id = language_id;
        }
        if let Some(external_id) = non_empty(req.external_id) {
            context.external_id = external_id;
        }
        Ok(self.repo.update(context).await?)
    }

    pub async fn delete_one(&self, id: &str) -> ServiceResult<()> {
        self.repo.delete(id).await?;
        if let Err(e) = self.assistant.delete_context(id, true).await {
            warn!("Assistant context for {} was not deleted: {}", id, e);
        }
        debug!("Deleted context {}", id);
        Ok(())
    }

    /// Clears the assistant-side conversation; `hard` drops its history entirely.
    pub async fn reset(&self, id: &str, hard: bool) -> ServiceResult<()> {
        self.repo.get(id, false).await?;
        self.assistant.reset_context(id, hard).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StubAssistantClient;
    use crate::database::InMemoryRepository;
    use crate::services::ServiceError;

    fn service(assistant_enabled: bool) -> ContextService {
        ContextService::new(
            Arc::new(InMemoryRepository::<Context>::new()),
            Arc::new(StubAssistantClient::new(assistant_enabled)),
        )
    }

    fn request() -> CreateContextRequest {
        CreateContextRequest { user_id: "1".into(), language_id: "2".into() }
    }

    #[tokio::test]
    async fn create_stores_external_id() {
        let contexts = service(false);
        let context = contexts.create_one(request()).await.unwrap();
        assert_eq!(context.external_id, context.base.id);
        assert_eq!(contexts.get_one(&context.base.id).await.unwrap().external_id, context.base.id);
    }

    #[tokio::test]
    async fn assistant_failure_does_not_block_create() {
        let contexts = service(true);
        let context = contexts.create_one(request()).await.unwrap();
        assert!(context.external_id.is_empty());
        assert!(matches!(contexts.reset(&context.base.id, false).await, Err(ServiceError::Unsupported(_))));
    }

    #[tokio::test]
    async fn requires_user_and_language() {
        let contexts = service(false);
        let missing = CreateContextRequest { user_id: String::new(), language_id: "2".into() };
        assert!(matches!(contexts.create_one(missing).await, Err(ServiceError::Argument(_))));
        let missing = CreateContextRequest { user_id: "1".into(), language_id: " ".into() };
        assert!(matches!(contexts.create_one(missing).await, Err(ServiceError::Argument(_))));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let contexts = service(false);
        let context = contexts.create_one(request()).await.unwrap();
        let id = context.base.id.clone();

        let updated = contexts
            .update_one(UpdateContextRequest { id: id.clone(), language_id: Some("3".into()), external_id: None })
            .await
            .unwrap();
        assert_eq!(updated.language_id, "3");
        assert_eq!(updated.external_id, id);
        assert!(contexts.check_if_belongs_to_user(&id, "1").await.unwrap());

        contexts.delete_one(&id).await.unwrap();
        assert!(matches!(contexts.delete_one(&id).await, Err(ServiceError::NotFound(_))));
    }
}
