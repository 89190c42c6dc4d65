// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Env var renderers for the `standard` and `minimal` representations.

use serde_json::{json, Value};

use crate::application::env_var::{EnvVarSummary, EnvVarView};
use crate::domain::env_var::EnvVarId;
use crate::domain::repo::RepoId;

pub fn env_var_href(repository_id: RepoId, id: &EnvVarId) -> String {
    format!("/v3/repo/{}/env_var/{}", repository_id, id)
}

/// Full representation including the decrypted value
pub fn render_env_var_standard(view: &EnvVarView) -> Value {
    json!({
        "@type": "env_var",
        "@href": env_var_href(view.repository_id, &view.id),
        "@representation": "standard",
        "@permissions": {
            "read": view.permissions.read,
            "write": view.permissions.write,
        },
        "id": view.id,
        "name": view.name,
        "value": view.value,
        "public": view.public,
    })
}

/// Representation without value or permissions
pub fn render_env_var_minimal(summary: &EnvVarSummary) -> Value {
    json!({
        "@type": "env_var",
        "@href": env_var_href(summary.repository_id, &summary.id),
        "@representation": "minimal",
        "id": summary.id,
        "name": summary.name,
        "public": summary.public,
    })
}
