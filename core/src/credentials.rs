//! Effective-key resolution.
//!
//! For every outbound call the service has to answer: which API key is in
//! effect for this user and provider? The chain is fixed — the user's own
//! stored credential wins, else the process-wide environment default, else
//! none. Key material is carried as [`SecretString`] throughout so it stays
//! out of `Debug` output and serialized responses.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use uuid::Uuid;

use crate::providers::Provider;

/// The backing credential store could not be reached.
///
/// Deliberately distinct from "no credential on file", which is a normal
/// `Ok(None)` — conflating the two would silently downgrade an outage into
/// a wrong ownership answer.
#[derive(Debug, thiserror::Error)]
#[error("credential store unavailable: {reason}")]
pub struct StoreError {
    reason: String,
}

impl StoreError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Read-only view of per-user stored credentials. Writes are owned by the
/// surrounding application; this core never mutates the store.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch the live credential for `(user_id, provider)`, if any.
    async fn get(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<SecretString>, StoreError>;
}

/// Process-wide fallback keys, read once at startup and injected — never
/// re-read from the environment mid-request.
#[derive(Clone, Default)]
pub struct EnvironmentDefaults {
    defaults: HashMap<Provider, SecretString>,
}

impl EnvironmentDefaults {
    /// Load fallback keys from the provider key env vars. Unset and blank
    /// values are treated as "no default configured".
    pub fn from_env() -> Self {
        let mut defaults = HashMap::new();
        for provider in Provider::ALL {
            let Some(var) = provider.default_key_env() else {
                continue;
            };
            match std::env::var(var) {
                Ok(value) if !value.trim().is_empty() => {
                    defaults.insert(*provider, SecretString::from(value));
                }
                _ => {}
            }
        }
        Self { defaults }
    }

    /// Builder used by callers that assemble defaults without the process
    /// environment (primarily tests).
    pub fn with_default(mut self, provider: Provider, secret: impl Into<String>) -> Self {
        self.defaults
            .insert(provider, SecretString::from(secret.into()));
        self
    }

    pub fn default_for(&self, provider: Provider) -> Option<&SecretString> {
        self.defaults.get(&provider)
    }
}

/// Applies the fallback chain: user credential → environment default → none.
#[derive(Clone)]
pub struct EffectiveKeyResolver {
    store: Arc<dyn CredentialStore>,
    defaults: Arc<EnvironmentDefaults>,
}

impl EffectiveKeyResolver {
    pub fn new(store: Arc<dyn CredentialStore>, defaults: Arc<EnvironmentDefaults>) -> Self {
        Self { store, defaults }
    }

    pub fn defaults(&self) -> &EnvironmentDefaults {
        &self.defaults
    }

    /// The key an outbound call for `(user_id, provider)` would actually
    /// use. Absence is a normal outcome; only a failing store is an error.
    ///
    /// At most one store read per call, and none at all for the
    /// credential-exempt provider.
    pub async fn resolve(
        &self,
        user_id: Uuid,
        provider: Provider,
    ) -> Result<Option<SecretString>, StoreError> {
        if !provider.requires_credential() {
            return Ok(None);
        }
        if let Some(secret) = self.store.get(user_id, provider).await? {
            return Ok(Some(secret));
        }
        Ok(self.defaults.default_for(provider).cloned())
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use secrecy::ExposeSecret;
    use uuid::Uuid;

    use super::test_support::FakeStore;
    use super::{EffectiveKeyResolver, EnvironmentDefaults};
    use crate::providers::Provider;

    fn resolver(store: Arc<FakeStore>, defaults: EnvironmentDefaults) -> EffectiveKeyResolver {
        EffectiveKeyResolver::new(store, Arc::new(defaults))
    }

    #[tokio::test]
    async fn user_credential_wins_over_environment_default() {
        let user_id = Uuid::now_v7();
        let store = FakeStore::default()
            .with_credential(user_id, Provider::Xai, "xai-user-key")
            .into_arc();
        let defaults = EnvironmentDefaults::default().with_default(Provider::Xai, "xai-default");

        let resolved = resolver(store, defaults)
            .resolve(user_id, Provider::Xai)
            .await
            .unwrap()
            .expect("a key should resolve");
        assert_eq!(resolved.expose_secret(), "xai-user-key");
    }

    #[tokio::test]
    async fn falls_back_to_environment_default_when_no_user_credential() {
        let store = FakeStore::default().into_arc();
        let defaults = EnvironmentDefaults::default().with_default(Provider::Xai, "xai-default");

        let resolved = resolver(store.clone(), defaults)
            .resolve(Uuid::now_v7(), Provider::Xai)
            .await
            .unwrap()
            .expect("default should resolve");
        assert_eq!(resolved.expose_secret(), "xai-default");
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn resolves_to_none_when_neither_is_configured() {
        let store = FakeStore::default().into_arc();
        let resolved = resolver(store, EnvironmentDefaults::default())
            .resolve(Uuid::now_v7(), Provider::OpenRouter)
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn exempt_provider_never_touches_the_store() {
        let store = FakeStore::failing().into_arc();
        let resolved = resolver(store.clone(), EnvironmentDefaults::default())
            .resolve(Uuid::now_v7(), Provider::Ollama)
            .await
            .unwrap();
        assert!(resolved.is_none());
        assert_eq!(store.reads(), 0);
    }

    #[tokio::test]
    async fn store_failure_is_an_error_not_an_absent_credential() {
        let store = FakeStore::failing().into_arc();
        let err = resolver(store, EnvironmentDefaults::default())
            .resolve(Uuid::now_v7(), Provider::Xai)
            .await
            .expect_err("store outage must surface");
        assert!(err.reason().contains("connection refused"));
    }

    #[test]
    fn defaults_are_absent_unless_configured() {
        let defaults = EnvironmentDefaults::default().with_default(Provider::Xai, "xai-default");
        assert!(defaults.default_for(Provider::Xai).is_some());
        assert!(defaults.default_for(Provider::OpenRouter).is_none());
        assert!(defaults.default_for(Provider::Ollama).is_none());
    }
}
