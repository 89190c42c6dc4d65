// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Service Errors
//!
//! The one error type every application service returns. Each variant maps
//! to exactly one error envelope in `crate::presentation::error`; nothing
//! here knows about HTTP.

use thiserror::Error;

use crate::application::env_var::EnvVarSummary;
use crate::domain::cipher::CipherError;
use crate::domain::insights::InsightsClientError;
use crate::domain::permission::AccessLevel;
use crate::domain::policy::PolicyViolation;
use crate::domain::repo::RepoId;
use crate::domain::repository::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("login required")]
    LoginRequired,

    #[error("{resource_type} not found (or insufficient access)")]
    NotFound { resource_type: &'static str },

    #[error("operation requires {permission} access to {resource_type}")]
    InsufficientAccess {
        permission: AccessLevel,
        resource_type: &'static str,
        /// Minimal snapshot of the resource the caller was denied
        resource: Option<EnvVarSummary>,
    },

    #[error("repository {repository_id} has been migrated")]
    RepoMigrated { repository_id: RepoId },

    #[error("{0}")]
    InvalidParams(String),

    #[error("{0}")]
    Conflict(String),

    #[error("insights service unreachable: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Convert a policy denial, attaching the resource snapshot to access errors.
    pub fn from_violation(violation: PolicyViolation, resource: Option<EnvVarSummary>) -> Self {
        match violation {
            PolicyViolation::LoginRequired => ServiceError::LoginRequired,
            PolicyViolation::InsufficientAccess { permission, resource_type } => {
                ServiceError::InsufficientAccess {
                    permission,
                    resource_type,
                    resource,
                }
            }
            PolicyViolation::RepoMigrated { repository_id } => {
                ServiceError::RepoMigrated { repository_id }
            }
            PolicyViolation::InsightsForbidden { .. } => ServiceError::InsufficientAccess {
                permission: AccessLevel::Read,
                resource_type: "insights",
                resource: None,
            },
        }
    }
}

impl From<PolicyViolation> for ServiceError {
    fn from(violation: PolicyViolation) -> Self {
        Self::from_violation(violation, None)
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict { .. } => ServiceError::Conflict(err.to_string()),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<CipherError> for ServiceError {
    fn from(err: CipherError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<InsightsClientError> for ServiceError {
    fn from(err: InsightsClientError) -> Self {
        ServiceError::Upstream(err.to_string())
    }
}
