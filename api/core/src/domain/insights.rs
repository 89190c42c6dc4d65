// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::actor::{OrganizationId, Owner, OwnerType, UserId};

/// Deployment variant the process serves; fixed for its whole lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Site {
    /// Public (open source) deployment
    Org,
    /// Commercial deployment
    Com,
}

impl Site {
    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Org => "org",
            Site::Com => "com",
        }
    }
}

impl std::str::FromStr for Site {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "org" => Ok(Site::Org),
            "com" => Ok(Site::Com),
            other => Err(format!("unknown site '{}', expected 'org' or 'com'", other)),
        }
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsightsQueryError {
    #[error("invalid owner_type")]
    InvalidOwnerType,

    #[error("invalid owner_id")]
    InvalidOwnerId,
}

/// A metrics query as received from the caller.
///
/// Only `owner_type` and `owner_id` are interpreted. The raw query string is
/// kept verbatim so it can be forwarded upstream with every other parameter
/// intact, including ones this service has never heard of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightsQuery {
    pub owner: Owner,
    pub raw_query: String,
}

impl InsightsQuery {
    pub fn parse(raw_query: &str) -> Result<Self, InsightsQueryError> {
        let mut owner_type = None;
        let mut owner_id = None;
        for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
            match key.as_ref() {
                "owner_type" if owner_type.is_none() => owner_type = Some(value.into_owned()),
                "owner_id" if owner_id.is_none() => owner_id = Some(value.into_owned()),
                _ => {}
            }
        }

        let owner_type: OwnerType = owner_type
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| InsightsQueryError::InvalidOwnerType)?;
        let owner_id: u64 = owner_id
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|_| InsightsQueryError::InvalidOwnerId)?;

        let owner = match owner_type {
            OwnerType::User => Owner::User(UserId(owner_id)),
            OwnerType::Organization => Owner::Organization(OrganizationId(owner_id)),
        };

        Ok(Self {
            owner,
            raw_query: raw_query.to_string(),
        })
    }
}

/// What the upstream insights service answered, relayed as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum InsightsClientError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Outbound port to the insights service.
///
/// Any HTTP status, including 4xx/5xx, is a successful call; only a missing
/// response is an error.
#[async_trait::async_trait]
pub trait InsightsClient: Send + Sync {
    /// `GET <endpoint>/metrics?<raw_query>` with the service credentials
    async fn metrics(&self, raw_query: &str) -> Result<UpstreamResponse, InsightsClientError>;
}
