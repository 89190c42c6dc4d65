// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Env Var Use Cases
//!
//! Application services reading and updating a single env var inside a
//! repository's settings blob.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Sequence the guard and policy checks, then mutate settings
//! - **Collaborators:**
//!   - Domain: AuthPolicy, RepositoryStateGuard, RepoSettings, EnvVar
//!   - Infrastructure: RepoRepository, PermissionRepository, SettingsRepository, SecretCipher
//!
//! # Update Flow
//!
//! The order is fixed so that concurrent administration of a repository
//! always produces the same error for the same state:
//!
//! 1. Caller must be logged in
//! 2. Repository must exist
//! 3. Repository must not be migrating or migrated
//! 4. Env var must exist in the settings
//! 5. Caller must hold write permission
//! 6. Params must form a valid patch
//! 7. Patch the one entry and save the whole blob at the version read in 4
//!
//! Every fallible step, including decrypting the value for the response,
//! runs before the save.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::error::ServiceError;
use crate::domain::actor::Actor;
use crate::domain::cipher::SecretCipher;
use crate::domain::env_var::{EnvVar, EnvVarId, EnvVarPatch};
use crate::domain::permission::AccessLevel;
use crate::domain::policy::AuthPolicy;
use crate::domain::repo::{Repo, RepoId, RepositoryStateGuard};
use crate::domain::repository::{PermissionRepository, RepoRepository, SettingsRepository};

const RESOURCE_TYPE: &str = "env_var";

/// Env var without its value, safe to show to callers lacking access
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVarSummary {
    pub repository_id: RepoId,
    pub id: EnvVarId,
    pub name: String,
    pub public: bool,
}

impl From<&EnvVar> for EnvVarSummary {
    fn from(env_var: &EnvVar) -> Self {
        Self {
            repository_id: env_var.repository_id,
            id: env_var.id.clone(),
            name: env_var.name.clone(),
            public: env_var.public,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvVarPermissions {
    pub read: bool,
    pub write: bool,
}

/// Env var with its decrypted value and the caller's permissions on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVarView {
    pub repository_id: RepoId,
    pub id: EnvVarId,
    pub name: String,
    pub value: String,
    pub public: bool,
    pub permissions: EnvVarPermissions,
}

impl EnvVarView {
    fn new(env_var: &EnvVar, value: String, permissions: EnvVarPermissions) -> Self {
        Self {
            repository_id: env_var.repository_id,
            id: env_var.id.clone(),
            name: env_var.name.clone(),
            value,
            public: env_var.public,
            permissions,
        }
    }
}

/// Dependencies shared by the env var use cases
#[derive(Clone)]
pub struct EnvVarDeps {
    pub repos: Arc<dyn RepoRepository>,
    pub permissions: Arc<dyn PermissionRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub cipher: Arc<dyn SecretCipher>,
    pub policy: AuthPolicy,
}

impl EnvVarDeps {
    async fn find_repo(&self, repository_id: RepoId) -> Result<Repo, ServiceError> {
        self.repos
            .find_by_id(repository_id)
            .await?
            .ok_or(ServiceError::NotFound { resource_type: "repository" })
    }
}

// ============================================================================
// Update
// ============================================================================

#[async_trait]
pub trait EnvVarUpdateService: Send + Sync {
    /// Apply the request `params` to one env var of a repository
    ///
    /// `params` are validated only once the caller is known to be allowed
    /// to write, so a malformed patch never masks a state or access error.
    ///
    /// # Errors
    ///
    /// - `LoginRequired`: anonymous caller
    /// - `NotFound`: repository or env var missing
    /// - `RepoMigrated`: repository is migrating or migrated
    /// - `InsufficientAccess`: caller lacks write permission
    /// - `InvalidParams`: a known field has the wrong type
    /// - `Conflict`: settings changed since they were read
    async fn update(
        &self,
        actor: &Actor,
        repository_id: RepoId,
        env_var_id: &EnvVarId,
        params: &Map<String, Value>,
    ) -> Result<EnvVarView, ServiceError>;
}

pub struct StandardEnvVarUpdateService {
    deps: EnvVarDeps,
    guard: RepositoryStateGuard,
}

impl StandardEnvVarUpdateService {
    pub fn new(deps: EnvVarDeps) -> Self {
        Self {
            deps,
            guard: RepositoryStateGuard::new(),
        }
    }
}

#[async_trait]
impl EnvVarUpdateService for StandardEnvVarUpdateService {
    async fn update(
        &self,
        actor: &Actor,
        repository_id: RepoId,
        env_var_id: &EnvVarId,
        params: &Map<String, Value>,
    ) -> Result<EnvVarView, ServiceError> {
        let user = actor.user().ok_or(ServiceError::LoginRequired)?;

        let repo = self.deps.find_repo(repository_id).await?;

        if let Err(violation) = self.guard.check(&repo) {
            warn!(repository = %repo.slug(), "Rejected env var update on migrated repository");
            return Err(violation.into());
        }

        let loaded = self.deps.settings.load(repo.id).await?;
        let mut settings = loaded.settings;
        let summary = settings
            .env_var(env_var_id)
            .map(EnvVarSummary::from)
            .ok_or(ServiceError::NotFound { resource_type: RESOURCE_TYPE })?;

        let permission = self.deps.permissions.find(repo.id, user.id).await?;
        self.deps
            .policy
            .check_repo_permission(actor, repo.id, permission.as_ref(), AccessLevel::Write, RESOURCE_TYPE)
            .map_err(|violation| ServiceError::from_violation(violation, Some(summary)))?;

        let patch = EnvVarPatch::from_params(params).map_err(|e| ServiceError::InvalidParams(e.to_string()))?;
        if patch.is_empty() {
            debug!(env_var = %env_var_id, "Empty env var patch, saving unchanged entry");
        }

        let entry = settings
            .env_var_mut(env_var_id)
            .ok_or(ServiceError::NotFound { resource_type: RESOURCE_TYPE })?;
        entry.apply(&patch, self.deps.cipher.as_ref())?;
        let updated = entry.clone();
        let value = self.deps.cipher.decrypt(&updated.value)?;

        let version = self.deps.settings.save(repo.id, &settings, loaded.version).await?;

        info!(
            repository = %repo.slug(),
            env_var = %updated.id,
            user = %user.login,
            %version,
            "Updated env var"
        );

        Ok(EnvVarView::new(
            &updated,
            value,
            EnvVarPermissions { read: true, write: true },
        ))
    }
}

// ============================================================================
// Find
// ============================================================================

#[async_trait]
pub trait EnvVarFindService: Send + Sync {
    /// Read one env var, decrypted, if the caller may read the repository
    async fn find(
        &self,
        actor: &Actor,
        repository_id: RepoId,
        env_var_id: &EnvVarId,
    ) -> Result<EnvVarView, ServiceError>;
}

pub struct StandardEnvVarFindService {
    deps: EnvVarDeps,
}

impl StandardEnvVarFindService {
    pub fn new(deps: EnvVarDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl EnvVarFindService for StandardEnvVarFindService {
    async fn find(
        &self,
        actor: &Actor,
        repository_id: RepoId,
        env_var_id: &EnvVarId,
    ) -> Result<EnvVarView, ServiceError> {
        let user = actor.user().ok_or(ServiceError::LoginRequired)?;

        let repo = self.deps.find_repo(repository_id).await?;

        let settings = self.deps.settings.load(repo.id).await?.settings;
        let env_var = settings
            .env_var(env_var_id)
            .ok_or(ServiceError::NotFound { resource_type: RESOURCE_TYPE })?;

        let permission = self.deps.permissions.find(repo.id, user.id).await?;
        self.deps
            .policy
            .check_repo_permission(actor, repo.id, permission.as_ref(), AccessLevel::Read, RESOURCE_TYPE)
            .map_err(|violation| ServiceError::from_violation(violation, Some(env_var.into())))?;

        // Migrated repositories stay readable but never writable.
        let write = !repo.is_migrated()
            && self
                .deps
                .policy
                .check_repo_permission(actor, repo.id, permission.as_ref(), AccessLevel::Write, RESOURCE_TYPE)
                .is_ok();

        let value = self.deps.cipher.decrypt(&env_var.value)?;
        Ok(EnvVarView::new(env_var, value, EnvVarPermissions { read: true, write }))
    }
}
