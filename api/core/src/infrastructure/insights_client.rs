// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Insights Service Client
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Forward metrics queries to the insights service
//! - **Integration:** CI API → insights HTTP API
//!
//! The client adds the service credential and nothing else: the caller's
//! query string goes out byte-for-byte and whatever comes back (any status,
//! any body) is returned to the application layer.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::domain::api_config::InsightsConfig;
use crate::domain::insights::{InsightsClient, InsightsClientError, UpstreamResponse};

pub struct HttpInsightsClient {
    /// Base URL of the insights service
    endpoint: String,

    /// Service credential
    auth_token: String,

    client: Client,
}

impl HttpInsightsClient {
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<String>, timeout: Duration) -> Result<Self, InsightsClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InsightsClientError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
            client,
        })
    }

    pub fn from_config(config: &InsightsConfig) -> Result<Self, InsightsClientError> {
        Self::new(
            config.endpoint.clone(),
            config.auth_token.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn metrics_url(&self, raw_query: &str) -> String {
        if raw_query.is_empty() {
            format!("{}/metrics", self.endpoint)
        } else {
            format!("{}/metrics?{}", self.endpoint, raw_query)
        }
    }
}

#[async_trait]
impl InsightsClient for HttpInsightsClient {
    async fn metrics(&self, raw_query: &str) -> Result<UpstreamResponse, InsightsClientError> {
        let url = self.metrics_url(raw_query);
        debug!(%url, "Requesting insights metrics");

        let response = self
            .client
            .get(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Token token=\"{}\"", self.auth_token),
            )
            .send()
            .await
            .map_err(|e| InsightsClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| InsightsClientError::Body(e.to_string()))?;

        Ok(UpstreamResponse { status, body })
    }
}
