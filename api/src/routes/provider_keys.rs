use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parley_core::credentials::StoreError;
use parley_core::error::ApiError;
use parley_core::providers::Provider;
use parley_core::status::KeyStatus;

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/providers/keys/status", post(provider_key_status))
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatusRequest {
    pub provider: String,
    pub user_id: Uuid,
}

fn validate_provider(value: &str) -> Result<Provider, AppError> {
    Provider::parse(value).ok_or_else(|| AppError::Validation {
        message: "provider must be one of ollama, xai, openrouter".to_string(),
        field: Some("provider".to_string()),
        received: Some(serde_json::Value::String(value.to_string())),
        docs_hint: None,
    })
}

/// Report whether the authenticated user has configured their own API key
/// for a provider, distinct from the system default. The key itself is
/// never part of the response.
#[utoipa::path(
    post,
    path = "/v1/providers/keys/status",
    request_body = KeyStatusRequest,
    responses(
        (status = 200, description = "Key ownership status", body = KeyStatus),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Credential store unavailable", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "providers"
)]
pub async fn provider_key_status(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(req): AppJson<KeyStatusRequest>,
) -> Result<Json<KeyStatus>, AppError> {
    let provider = validate_provider(&req.provider)?;

    let service = state.key_status.as_ref().ok_or_else(|| {
        AppError::StoreUnavailable(StoreError::new(
            "credential store not configured (DATABASE_URL unset)",
        ))
    })?;

    let status = service
        .has_own_key(auth.user_id, req.user_id, provider)
        .await?;
    Ok(Json(status))
}
