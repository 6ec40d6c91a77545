//! Key-ownership reporting.
//!
//! Answers "does this user have their own key for this provider?" without
//! ever returning the key. A resolvable key is not enough to say yes: when
//! the resolver fell back to the process-wide default, the system is
//! silently paying on the user's behalf and the answer is no.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use secrecy::ExposeSecret;

use crate::credentials::{EffectiveKeyResolver, StoreError};
use crate::providers::Provider;

/// Outcome of a key-ownership query. Carries the boolean and the provider,
/// nothing else — no code path serializes the resolved secret.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatus {
    pub has_user_key: bool,
    pub provider: Provider,
}

#[derive(Debug, thiserror::Error)]
pub enum KeyStatusError {
    /// Callers may only query their own key configuration; anything else
    /// would let a user probe someone else's setup.
    #[error("requester does not match the queried user")]
    Unauthorized,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Thin composition over [`EffectiveKeyResolver`].
#[derive(Clone)]
pub struct ProviderKeyStatusService {
    resolver: EffectiveKeyResolver,
}

impl ProviderKeyStatusService {
    pub fn new(resolver: EffectiveKeyResolver) -> Self {
        Self { resolver }
    }

    /// Report whether `user_id` has configured their own key for
    /// `provider`, distinct from the environment default.
    pub async fn has_own_key(
        &self,
        requester_id: Uuid,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<KeyStatus, KeyStatusError> {
        if requester_id != user_id {
            tracing::warn!(
                requester_id = %requester_id,
                user_id = %user_id,
                provider = provider.as_str(),
                decision = "deny",
                "key status authorization decision"
            );
            return Err(KeyStatusError::Unauthorized);
        }

        if !provider.requires_credential() {
            return Ok(KeyStatus {
                has_user_key: false,
                provider,
            });
        }

        let has_user_key = match self.resolver.resolve(user_id, provider).await? {
            Some(secret) => match self.resolver.defaults().default_for(provider) {
                // A key that byte-equals the default is indistinguishable
                // from the silent fallback and is reported as not owned.
                Some(default) => secret.expose_secret() != default.expose_secret(),
                None => true,
            },
            None => false,
        };

        Ok(KeyStatus {
            has_user_key,
            provider,
        })
    }
}
