use std::sync::Arc;

use parley_core::chats::ChatStore;
use parley_core::credentials::{EffectiveKeyResolver, EnvironmentDefaults};
use parley_core::status::ProviderKeyStatusService;
use sqlx::PgPool;

use crate::store::{PgChatStore, PgCredentialStore};

#[derive(Clone)]
pub struct AppState {
    /// Absent when the service runs storage-less (no DATABASE_URL).
    pub db: Option<PgPool>,
    /// Absent together with `db`; handlers treat that as store-unavailable.
    pub key_status: Option<ProviderKeyStatusService>,
    /// Absent together with `db`; model updates then succeed best-effort.
    pub chats: Option<Arc<dyn ChatStore>>,
}

impl AppState {
    pub fn new(db: Option<PgPool>, defaults: EnvironmentDefaults) -> Self {
        let defaults = Arc::new(defaults);
        let key_status = db.clone().map(|pool| {
            ProviderKeyStatusService::new(EffectiveKeyResolver::new(
                Arc::new(PgCredentialStore::new(pool)),
                defaults.clone(),
            ))
        });
        let chats = db
            .clone()
            .map(|pool| Arc::new(PgChatStore::new(pool)) as Arc<dyn ChatStore>);
        Self {
            db,
            key_status,
            chats,
        }
    }
}
