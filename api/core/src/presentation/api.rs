// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP routes of the `/v3` API.
//!
//! | Method | Path | Service |
//! |--------|------|---------|
//! | `GET` | `/v3/repo/{repo_id}/env_var/{env_var_id}` | [`EnvVarFindService`] |
//! | `PATCH` | `/v3/repo/{repo_id}/env_var/{env_var_id}` | [`EnvVarUpdateService`] |
//! | `GET` | `/v3/insights/metrics` | [`InsightsProxyService`] |
//! | `GET` | `/health` | |

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::application::env_var::{
    EnvVarDeps, EnvVarFindService, EnvVarUpdateService, StandardEnvVarFindService,
    StandardEnvVarUpdateService,
};
use crate::application::error::ServiceError;
use crate::application::insights::{InsightsProxyService, StandardInsightsProxyService};
use crate::domain::actor::Actor;
use crate::domain::cipher::SecretCipher;
use crate::domain::env_var::EnvVarId;
use crate::domain::insights::InsightsClient;
use crate::domain::policy::AuthPolicy;
use crate::domain::repo::RepoId;
use crate::domain::repository::AccessTokenRepository;
use crate::infrastructure::repositories::InMemoryStores;
use crate::presentation::representation::render_env_var_standard;

pub struct AppState {
    pub tokens: Arc<dyn AccessTokenRepository>,
    pub env_var_find: Arc<dyn EnvVarFindService>,
    pub env_var_update: Arc<dyn EnvVarUpdateService>,
    pub insights: Arc<dyn InsightsProxyService>,
}

impl AppState {
    /// Wire the standard services over the in-memory stores
    pub fn with_stores(
        policy: AuthPolicy,
        stores: &InMemoryStores,
        cipher: Arc<dyn SecretCipher>,
        insights_client: Arc<dyn InsightsClient>,
    ) -> Self {
        let deps = EnvVarDeps {
            repos: Arc::new(stores.repos.clone()),
            permissions: Arc::new(stores.permissions.clone()),
            settings: Arc::new(stores.settings.clone()),
            cipher,
            policy,
        };

        Self {
            tokens: Arc::new(stores.tokens.clone()),
            env_var_find: Arc::new(StandardEnvVarFindService::new(deps.clone())),
            env_var_update: Arc::new(StandardEnvVarUpdateService::new(deps)),
            insights: Arc::new(StandardInsightsProxyService::new(
                policy,
                Arc::new(stores.memberships.clone()),
                insights_client,
            )),
        }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/v3/repo/{repo_id}/env_var/{env_var_id}",
            get(find_env_var).patch(update_env_var),
        )
        .route("/v3/insights/metrics", get(insights_metrics))
        .with_state(Arc::new(state))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Unknown or non-numeric repository ids are indistinguishable from missing ones.
fn parse_repo_id(raw: &str) -> Result<RepoId, ServiceError> {
    raw.parse::<u64>()
        .map(RepoId)
        .map_err(|_| ServiceError::NotFound { resource_type: "repository" })
}

/// Request params from a PATCH body; an empty body means no params.
///
/// Only the JSON syntax is checked here. Field types are checked by the
/// update service after the repository state and permission checks.
fn parse_params(body: &[u8]) -> Result<Map<String, Value>, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ServiceError::InvalidParams("request body must be a JSON object".to_string())),
        Err(e) => Err(ServiceError::InvalidParams(format!("invalid JSON body: {}", e))),
    }
}

async fn find_env_var(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path((repo_id, env_var_id)): Path<(String, String)>,
) -> Result<Json<Value>, ServiceError> {
    let repo_id = parse_repo_id(&repo_id)?;
    let view = state
        .env_var_find
        .find(&actor, repo_id, &EnvVarId(env_var_id))
        .await?;
    Ok(Json(render_env_var_standard(&view)))
}

async fn update_env_var(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path((repo_id, env_var_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Value>, ServiceError> {
    // Authentication is decided before the body is looked at.
    if !actor.is_authenticated() {
        return Err(ServiceError::LoginRequired);
    }
    let repo_id = parse_repo_id(&repo_id)?;
    let params = parse_params(&body)?;

    let view = state
        .env_var_update
        .update(&actor, repo_id, &EnvVarId(env_var_id), &params)
        .await?;
    Ok(Json(render_env_var_standard(&view)))
}

async fn insights_metrics(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    RawQuery(query): RawQuery,
) -> Result<Response, ServiceError> {
    let response = state
        .insights
        .fetch(&actor, query.as_deref().unwrap_or_default())
        .await?;

    let status = StatusCode::from_u16(response.status).map_err(|_| {
        ServiceError::Upstream(format!("invalid upstream status {}", response.status))
    })?;
    Ok((status, Json(json!({ "data": response.data }))).into_response())
}
