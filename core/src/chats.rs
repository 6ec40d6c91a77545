//! Chat persistence seam.
//!
//! The core only writes one chat field: the model selection, and only after
//! it has been through [`crate::models::normalize_model_id`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chat's current model choice. Constructed exclusively via
/// [`ChatModelSelection::canonical`], so the carried id is always canonical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatModelSelection {
    pub chat_id: Uuid,
    pub model_id: String,
}

impl ChatModelSelection {
    /// Normalize `model_id` and bind it to the chat.
    pub fn canonical(chat_id: Uuid, model_id: &str) -> Self {
        Self {
            chat_id,
            model_id: crate::models::normalize_model_id(model_id).to_string(),
        }
    }
}

/// A write to chat storage failed after validation already passed. The
/// underlying message is preserved for the caller to surface.
#[derive(Debug, thiserror::Error)]
#[error("chat persistence failed: {0}")]
pub struct PersistenceError(pub String);

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Persist the chat's model selection. The selection's id is already
    /// canonical; implementations store it verbatim.
    async fn update_model(&self, selection: &ChatModelSelection) -> Result<(), PersistenceError>;
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::ChatModelSelection;

    #[test]
    fn canonical_selection_applies_alias_normalization() {
        let chat_id = Uuid::now_v7();
        let selection = ChatModelSelection::canonical(chat_id, "grok-4-fast");
        assert_eq!(selection.chat_id, chat_id);
        assert_eq!(selection.model_id, "grok-4.1-fast");
    }

    #[test]
    fn canonical_selection_keeps_canonical_ids_unchanged() {
        let selection = ChatModelSelection::canonical(Uuid::now_v7(), "grok-4.1-fast");
        assert_eq!(selection.model_id, "grok-4.1-fast");
    }
}
