//! Fixtures for unit tests: services over `InMemoryRepository` and a scratch storage directory.

pub mod fixtures;

pub use fixtures::TestContext;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::context::CreateContextRequest;
    use crate::dto::note::CreateNoteRequest;
    use crate::dto::prompt::{CreatePromptRequest, FindPromptByEntityAndContextRequest};
    use crate::ports::PromptSource;
    use crate::services::ServiceError;

    #[tokio::test]
    async fn note_lifecycle_keeps_prompt_in_step() {
        let ctx = TestContext::new();
        let state = &ctx.state;

        let user = state.users.create_one(fixtures::user_request("ana@example.com")).await.unwrap();
        let context = state
            .contexts
            .create_one(CreateContextRequest { user_id: user.base.id.clone(), language_id: "1".into() })
            .await
            .unwrap();
        let note = state
            .notes
            .create_one(CreateNoteRequest {
                header: "verbs".into(),
                payload: "ser and estar".into(),
                language_id: "1".into(),
                user_id: Some(user.base.id.clone()),
                context_id: context.base.id.clone(),
            })
            .await
            .unwrap();

        let prompt = state
            .prompts
            .generate_and_send_prompt(CreatePromptRequest::remember(
                PromptSource::Note(note.clone()),
                context.base.id.clone(),
                Some(note.base.id.clone()),
            ))
            .await
            .unwrap();
        assert_eq!(prompt.value, "Prompt(Remember(ser and estar))");

        state.notes.delete_one(&note.base.id).await.unwrap();
        state.prompts.delete_for_entity(&note.base.id, &context.base.id).await.unwrap();

        let lookup = FindPromptByEntityAndContextRequest {
            entity_id: note.base.id.clone(),
            context_id: Some(context.base.id.clone()),
        };
        assert!(matches!(state.prompts.find_by_entity_and_context(lookup).await, Err(ServiceError::NotFound(_))));
    }
}
