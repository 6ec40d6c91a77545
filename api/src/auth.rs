use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::Utc;
use parley_core::auth::{API_KEY_PREFIX, hash_token};
use parley_core::credentials::StoreError;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// The identity verifier: resolves the request's authenticated principal
/// from the `Authorization: Bearer parley_sk_…` header.
///
/// Handlers compare `user_id` against caller-supplied identifiers; the raw
/// key never leaves this module.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub key_id: Uuid,
}

/// Strip the Bearer scheme from an Authorization header value.
fn strip_bearer(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Fast path: a layer (or a test) already resolved the principal.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(user.clone());
        }

        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing Authorization header".to_string(),
                docs_hint: Some(
                    "Include 'Authorization: Bearer <token>' with a parley_sk_ API key."
                        .to_string(),
                ),
            })?;

        let token = strip_bearer(header).ok_or_else(|| AppError::Unauthorized {
            message: "Authorization header must use Bearer scheme".to_string(),
            docs_hint: Some("Format: 'Authorization: Bearer <token>'".to_string()),
        })?;

        if !token.starts_with(API_KEY_PREFIX) {
            return Err(AppError::Unauthorized {
                message: "Invalid token format".to_string(),
                docs_hint: Some(format!("API keys start with '{API_KEY_PREFIX}'.")),
            });
        }

        let Some(pool) = &state.db else {
            // Authentication needs the same backing store as everything
            // else; without it the principal cannot be verified.
            return Err(AppError::StoreUnavailable(StoreError::new(
                "auth store not configured (DATABASE_URL unset)",
            )));
        };

        authenticate_api_key(token, pool).await
    }
}

async fn authenticate_api_key(
    token: &str,
    pool: &sqlx::PgPool,
) -> Result<AuthenticatedUser, AppError> {
    let key_hash = hash_token(token);

    let row = sqlx::query_as::<_, ApiKeyRow>(
        "SELECT id, user_id, expires_at FROM api_keys \
         WHERE key_hash = $1 AND is_revoked = FALSE",
    )
    .bind(&key_hash)
    .fetch_optional(pool)
    .await
    .map_err(|err| {
        tracing::error!(error = %err, "api key lookup failed");
        AppError::StoreUnavailable(StoreError::new(err.to_string()))
    })?
    .ok_or_else(|| AppError::Unauthorized {
        message: "Invalid API key".to_string(),
        docs_hint: Some("Check that the API key is correct and has not been revoked.".to_string()),
    })?;

    if let Some(expires_at) = row.expires_at {
        if Utc::now() > expires_at {
            return Err(AppError::Unauthorized {
                message: "API key has expired".to_string(),
                docs_hint: Some("Issue a new API key from the account settings.".to_string()),
            });
        }
    }

    Ok(AuthenticatedUser {
        user_id: row.user_id,
        key_id: row.id,
    })
}

#[derive(sqlx::FromRow)]
struct ApiKeyRow {
    id: Uuid,
    user_id: Uuid,
    expires_at: Option<chrono::DateTime<Utc>>,
}
