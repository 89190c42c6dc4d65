// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Insights Proxy Use Case
//!
//! Decides whether a metrics request may be forwarded to the insights
//! service and, if so, relays the upstream answer verbatim.
//!
//! # Flow
//!
//! 1. Anonymous callers are refused
//! 2. `owner_type` / `owner_id` are validated
//! 3. AuthPolicy decides for the configured site (membership role looked up
//!    only when the decision depends on it)
//! 4. Exactly one upstream call; status and body are passed through
//!
//! Steps 1-3 never reach the [`InsightsClient`]: a refused request makes no
//! outbound call at all.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::error::ServiceError;
use crate::domain::actor::{Actor, Owner};
use crate::domain::insights::{InsightsClient, InsightsQuery, Site, UpstreamResponse};
use crate::domain::policy::AuthPolicy;
use crate::domain::repository::MembershipRepository;

/// Proxy outcome: upstream status plus its body under `data`
#[derive(Debug, Clone, PartialEq)]
pub struct InsightsResponse {
    pub status: u16,
    pub data: Value,
}

impl InsightsResponse {
    /// JSON bodies are embedded as parsed JSON, anything else as a string.
    pub fn from_upstream(upstream: UpstreamResponse) -> Self {
        let data = serde_json::from_str(&upstream.body).unwrap_or(Value::String(upstream.body));
        Self {
            status: upstream.status,
            data,
        }
    }
}

#[async_trait]
pub trait InsightsProxyService: Send + Sync {
    /// Forward a metrics query on behalf of `actor`
    ///
    /// `raw_query` is the request's query string without the leading `?`.
    async fn fetch(&self, actor: &Actor, raw_query: &str) -> Result<InsightsResponse, ServiceError>;
}

pub struct StandardInsightsProxyService {
    policy: AuthPolicy,
    memberships: Arc<dyn MembershipRepository>,
    client: Arc<dyn InsightsClient>,
}

impl StandardInsightsProxyService {
    pub fn new(
        policy: AuthPolicy,
        memberships: Arc<dyn MembershipRepository>,
        client: Arc<dyn InsightsClient>,
    ) -> Self {
        Self {
            policy,
            memberships,
            client,
        }
    }
}

#[async_trait]
impl InsightsProxyService for StandardInsightsProxyService {
    async fn fetch(&self, actor: &Actor, raw_query: &str) -> Result<InsightsResponse, ServiceError> {
        let user = actor.user().ok_or(ServiceError::LoginRequired)?;

        let query = InsightsQuery::parse(raw_query)
            .map_err(|e| ServiceError::InvalidParams(e.to_string()))?;

        let role = match (self.policy.site(), query.owner) {
            (Site::Com, Owner::Organization(organization_id)) => {
                self.memberships.find_role(organization_id, user.id).await?
            }
            _ => None,
        };

        if let Err(violation) = self.policy.check_insights_access(actor, &query.owner, role) {
            info!(
                user = %user.login,
                owner = ?query.owner,
                site = %self.policy.site(),
                "Blocked insights request"
            );
            return Err(violation.into());
        }

        debug!(owner = ?query.owner, "Forwarding insights request");
        let upstream = self.client.metrics(&query.raw_query).await?;
        debug!(status = upstream.status, "Insights service responded");

        Ok(InsightsResponse::from_upstream(upstream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_is_embedded_parsed() {
        let response = InsightsResponse::from_upstream(UpstreamResponse {
            status: 200,
            body: r#"{"metrics":["whatever"]}"#.to_string(),
        });
        assert_eq!(response.status, 200);
        assert_eq!(response.data, json!({"metrics": ["whatever"]}));
    }

    #[test]
    fn test_plain_body_is_embedded_as_string() {
        let response = InsightsResponse::from_upstream(UpstreamResponse {
            status: 400,
            body: "This is an error message".to_string(),
        });
        assert_eq!(response.status, 400);
        assert_eq!(response.data, json!("This is an error message"));
    }
}
