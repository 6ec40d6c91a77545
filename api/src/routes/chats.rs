use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_core::chats::ChatModelSelection;
use parley_core::error::ApiError;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/chats/model", post(update_chat_model))
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChatModelRequest {
    pub chat_id: Uuid,
    pub model: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UpdateChatModelResponse {
    pub success: bool,
}

/// Update a chat's model selection.
///
/// The supplied identifier is normalized to its canonical form before the
/// write, so renamed upstream models keep resolving for existing chats.
/// Storage-less deployments acknowledge the update without persisting.
#[utoipa::path(
    post,
    path = "/v1/chats/model",
    request_body = UpdateChatModelRequest,
    responses(
        (status = 200, description = "Model selection updated", body = UpdateChatModelResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Persistence failed", body = ApiError)
    ),
    tag = "chats"
)]
pub async fn update_chat_model(
    State(state): State<AppState>,
    AppJson(req): AppJson<UpdateChatModelRequest>,
) -> Result<Json<UpdateChatModelResponse>, AppError> {
    let model = req.model.trim();
    if model.is_empty() {
        return Err(AppError::Validation {
            message: "model must not be empty".to_string(),
            field: Some("model".to_string()),
            received: Some(serde_json::Value::String(req.model.clone())),
            docs_hint: None,
        });
    }

    let selection = ChatModelSelection::canonical(req.chat_id, model);

    match &state.chats {
        Some(store) => store.update_model(&selection).await?,
        None => {
            // Best-effort: normalization succeeded, storage is simply not
            // part of this deployment.
            tracing::debug!(
                chat_id = %selection.chat_id,
                model = %selection.model_id,
                "chat storage not configured; skipping model persistence"
            );
        }
    }

    Ok(Json(UpdateChatModelResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::extract::State;
    use parley_core::chats::{ChatModelSelection, ChatStore, PersistenceError};
    use uuid::Uuid;

    use super::{UpdateChatModelRequest, update_chat_model};
    use crate::error::AppError;
    use crate::extract::AppJson;
    use crate::state::AppState;

    #[derive(Default)]
    struct RecordingChatStore {
        writes: Mutex<Vec<ChatModelSelection>>,
        fail: bool,
    }

    #[async_trait]
    impl ChatStore for RecordingChatStore {
        async fn update_model(
            &self,
            selection: &ChatModelSelection,
        ) -> Result<(), PersistenceError> {
            if self.fail {
                return Err(PersistenceError("chats relation missing".to_string()));
            }
            self.writes.lock().unwrap().push(selection.clone());
            Ok(())
        }
    }

    fn state_with(store: Option<Arc<RecordingChatStore>>) -> AppState {
        AppState {
            db: None,
            key_status: None,
            chats: store.map(|s| s as Arc<dyn ChatStore>),
        }
    }

    #[test]
    fn request_uses_camel_case_field_names() {
        let chat_id = Uuid::now_v7();
        let req: UpdateChatModelRequest = serde_json::from_value(serde_json::json!({
            "chatId": chat_id.to_string(),
            "model": "grok-4-fast",
        }))
        .unwrap();
        assert_eq!(req.chat_id, chat_id);
        assert_eq!(req.model, "grok-4-fast");
    }

    #[tokio::test]
    async fn persists_the_canonical_id_for_an_aliased_model() {
        let store = Arc::new(RecordingChatStore::default());
        let chat_id = Uuid::now_v7();

        let response = update_chat_model(
            State(state_with(Some(store.clone()))),
            AppJson(UpdateChatModelRequest {
                chat_id,
                model: "grok-4-fast".to_string(),
            }),
        )
        .await
        .unwrap();

        assert!(response.0.success);
        let writes = store.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].chat_id, chat_id);
        assert_eq!(writes[0].model_id, "grok-4.1-fast");
    }

    #[tokio::test]
    async fn persists_canonical_ids_unchanged() {
        let store = Arc::new(RecordingChatStore::default());

        update_chat_model(
            State(state_with(Some(store.clone()))),
            AppJson(UpdateChatModelRequest {
                chat_id: Uuid::now_v7(),
                model: "grok-4.1-fast".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(
            store.writes.lock().unwrap()[0].model_id,
            "grok-4.1-fast"
        );
    }

    #[tokio::test]
    async fn empty_model_is_a_validation_error_and_nothing_is_persisted() {
        let store = Arc::new(RecordingChatStore::default());

        let err = update_chat_model(
            State(state_with(Some(store.clone()))),
            AppJson(UpdateChatModelRequest {
                chat_id: Uuid::now_v7(),
                model: "   ".to_string(),
            }),
        )
        .await
        .expect_err("blank model must fail validation");

        match err {
            AppError::Validation { field, .. } => assert_eq!(field.as_deref(), Some("model")),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(store.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_storage_still_acknowledges_the_update() {
        let response = update_chat_model(
            State(state_with(None)),
            AppJson(UpdateChatModelRequest {
                chat_id: Uuid::now_v7(),
                model: "grok-4-fast".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(response.0.success);
    }

    #[tokio::test]
    async fn failing_storage_surfaces_the_persistence_message() {
        let store = Arc::new(RecordingChatStore {
            fail: true,
            ..RecordingChatStore::default()
        });

        let err = update_chat_model(
            State(state_with(Some(store))),
            AppJson(UpdateChatModelRequest {
                chat_id: Uuid::now_v7(),
                model: "grok-4-fast".to_string(),
            }),
        )
        .await
        .expect_err("failing store must surface");

        match err {
            AppError::Persistence(message) => {
                assert!(message.contains("chats relation missing"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
