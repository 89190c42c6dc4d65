// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Request authentication
//!
//! Resolves the [`Actor`] from the `Authorization` header. Both
//! `token <t>` and `Bearer <t>` schemes are accepted. A request without the
//! header is anonymous; a header carrying an unknown token is rejected
//! outright rather than downgraded to anonymous.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;
use tracing::debug;

use crate::application::error::ServiceError;
use crate::domain::actor::Actor;
use crate::presentation::api::AppState;

/// Extract the token from an `Authorization` header value
pub fn parse_authorization(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !(scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

impl FromRequestParts<Arc<AppState>> for Actor {
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Actor::Anonymous);
        };

        let token = header
            .to_str()
            .ok()
            .and_then(parse_authorization)
            .ok_or(ServiceError::LoginRequired)?;

        match state.tokens.find_user(token).await? {
            Some(user) => Ok(Actor::User(user)),
            None => {
                debug!("Rejected unknown access token");
                Err(ServiceError::LoginRequired)
            }
        }
    }
}
