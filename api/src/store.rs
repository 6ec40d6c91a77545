//! Postgres implementations of the core's store seams.

use async_trait::async_trait;
use parley_core::chats::{ChatModelSelection, ChatStore, PersistenceError};
use parley_core::credentials::{CredentialStore, StoreError};
use parley_core::providers::Provider;
use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn get(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<SecretString>, StoreError> {
        let secret = sqlx::query_scalar::<_, String>(
            "SELECT secret FROM provider_credentials WHERE user_id = $1 AND provider = $2",
        )
        .bind(user_id)
        .bind(provider.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, provider = provider.as_str(), "provider credential lookup failed");
            StoreError::new(err.to_string())
        })?;

        Ok(secret.map(SecretString::from))
    }
}

pub struct PgChatStore {
    pool: PgPool,
}

impl PgChatStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStore for PgChatStore {
    async fn update_model(&self, selection: &ChatModelSelection) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            "UPDATE chats SET model = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(selection.chat_id)
        .bind(&selection.model_id)
        .execute(&self.pool)
        .await
        .map_err(|err| PersistenceError(err.to_string()))?;

        if result.rows_affected() == 0 {
            tracing::warn!(chat_id = %selection.chat_id, "model update matched no chat row");
        }
        Ok(())
    }
}
