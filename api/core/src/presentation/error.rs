// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Error Responder
//!
//! Renders every [`ServiceError`] as the API's error envelope:
//!
//! ```json
//! {"@type": "error", "error_type": "...", "error_message": "...", ...}
//! ```
//!
//! | Variant | Status | `error_type` | Extra keys |
//! |---------|--------|--------------|------------|
//! | `LoginRequired` | 403 | `login_required` | |
//! | `NotFound` | 404 | `not_found` | `resource_type` |
//! | `InsufficientAccess` | 403 | `insufficient_access` | `permission`, `resource_type`, `<resource_type>` |
//! | `RepoMigrated` | 406 | `repo_migrated` | |
//! | `InvalidParams` | 400 | `wrong_params` | |
//! | `Conflict` | 409 | `conflict` | |
//! | `Upstream` | 502 | `upstream_error` | |
//! | `Internal` | 500 | `server_error` | |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use tracing::error;

use crate::application::error::ServiceError;
use crate::presentation::representation::render_env_var_minimal;

pub const REPO_MIGRATED_MESSAGE: &str = "This repository has been migrated to travis-ci.com. \
Modifications to repositories, builds, and jobs are disabled on travis-ci.org. \
If you have any questions please contact us at support@travis-ci.com";

fn envelope(error_type: &str, error_message: &str) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("@type".to_string(), json!("error"));
    body.insert("error_type".to_string(), json!(error_type));
    body.insert("error_message".to_string(), json!(error_message));
    body
}

/// Status code and JSON body for a service error
pub fn render_error(err: &ServiceError) -> (StatusCode, Value) {
    let (status, body) = match err {
        ServiceError::LoginRequired => (StatusCode::FORBIDDEN, envelope("login_required", "login required")),
        ServiceError::NotFound { resource_type } => {
            let mut body = envelope("not_found", &err.to_string());
            body.insert("resource_type".to_string(), json!(resource_type));
            (StatusCode::NOT_FOUND, body)
        }
        ServiceError::InsufficientAccess { permission, resource_type, resource } => {
            let mut body = envelope("insufficient_access", &err.to_string());
            body.insert("permission".to_string(), json!(permission.as_str()));
            body.insert("resource_type".to_string(), json!(resource_type));
            if let Some(resource) = resource {
                body.insert(resource_type.to_string(), render_env_var_minimal(resource));
            }
            (StatusCode::FORBIDDEN, body)
        }
        ServiceError::RepoMigrated { .. } => (
            StatusCode::NOT_ACCEPTABLE,
            envelope("repo_migrated", REPO_MIGRATED_MESSAGE),
        ),
        ServiceError::InvalidParams(message) => (StatusCode::BAD_REQUEST, envelope("wrong_params", message)),
        ServiceError::Conflict(_) => (
            StatusCode::CONFLICT,
            envelope("conflict", "settings were modified concurrently, please retry"),
        ),
        ServiceError::Upstream(_) => (
            StatusCode::BAD_GATEWAY,
            envelope("upstream_error", "insights service unavailable"),
        ),
        ServiceError::Internal(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            envelope("server_error", "internal server error"),
        ),
    };
    (status, Value::Object(body))
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            ServiceError::Internal(detail) => error!(%detail, "Request failed"),
            ServiceError::Upstream(detail) => error!(%detail, "Insights service unreachable"),
            _ => {}
        }
        let (status, body) = render_error(&self);
        (status, Json(body)).into_response()
    }
}
