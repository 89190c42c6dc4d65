// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! In-memory implementations of the repository abstractions defined in
//! `crate::domain::repository`.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve domain aggregates
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! Accounts, repositories and memberships are owned elsewhere on the
//! platform; these stores are filled from a seed file at startup (see
//! [`crate::infrastructure::seed`]) and by tests.
//!
//! `InMemorySettingsRepository` is the one store written at request time. It
//! keeps a version counter per repository and compares it under the write
//! lock, so two concurrent read-modify-write cycles on the same blob cannot
//! both succeed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::actor::{Membership, MembershipRole, OrganizationId, User, UserId};
use crate::domain::permission::Permission;
use crate::domain::repo::{Repo, RepoId};
use crate::domain::repository::{
    AccessTokenRepository, MembershipRepository, PermissionRepository, RepoRepository,
    RepositoryError, SettingsRepository,
};
use crate::domain::settings::{RepoSettings, SettingsVersion, VersionedSettings};

#[derive(Clone, Default)]
pub struct InMemoryRepoRepository {
    repos: Arc<RwLock<HashMap<RepoId, Repo>>>,
}

impl InMemoryRepoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RepoRepository for InMemoryRepoRepository {
    async fn find_by_id(&self, id: RepoId) -> Result<Option<Repo>, RepositoryError> {
        let repos = self.repos.read().await;
        Ok(repos.get(&id).cloned())
    }

    async fn save(&self, repo: &Repo) -> Result<(), RepositoryError> {
        let mut repos = self.repos.write().await;
        repos.insert(repo.id, repo.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryPermissionRepository {
    permissions: Arc<RwLock<HashMap<(RepoId, UserId), Permission>>>,
}

impl InMemoryPermissionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn find(&self, repository_id: RepoId, user_id: UserId) -> Result<Option<Permission>, RepositoryError> {
        let permissions = self.permissions.read().await;
        Ok(permissions.get(&(repository_id, user_id)).cloned())
    }

    async fn save(&self, permission: &Permission) -> Result<(), RepositoryError> {
        let mut permissions = self.permissions.write().await;
        permissions.insert((permission.repository_id, permission.user_id), permission.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryMembershipRepository {
    memberships: Arc<RwLock<HashMap<(OrganizationId, UserId), MembershipRole>>>,
}

impl InMemoryMembershipRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MembershipRepository for InMemoryMembershipRepository {
    async fn find_role(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<MembershipRole>, RepositoryError> {
        let memberships = self.memberships.read().await;
        Ok(memberships.get(&(organization_id, user_id)).copied())
    }

    async fn save(&self, membership: &Membership) -> Result<(), RepositoryError> {
        let mut memberships = self.memberships.write().await;
        memberships.insert((membership.organization_id, membership.user_id), membership.role);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySettingsRepository {
    settings: Arc<RwLock<HashMap<RepoId, VersionedSettings>>>,
}

impl InMemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsRepository {
    async fn load(&self, repository_id: RepoId) -> Result<VersionedSettings, RepositoryError> {
        let settings = self.settings.read().await;
        Ok(settings.get(&repository_id).cloned().unwrap_or(VersionedSettings {
            settings: RepoSettings::default(),
            version: SettingsVersion::default(),
        }))
    }

    async fn save(
        &self,
        repository_id: RepoId,
        settings: &RepoSettings,
        expected: SettingsVersion,
    ) -> Result<SettingsVersion, RepositoryError> {
        let mut stored = self.settings.write().await;
        let actual = stored
            .get(&repository_id)
            .map(|s| s.version)
            .unwrap_or_default();

        if actual != expected {
            return Err(RepositoryError::Conflict {
                repository_id,
                expected,
                actual,
            });
        }

        let version = actual.next();
        stored.insert(
            repository_id,
            VersionedSettings {
                settings: settings.clone(),
                version,
            },
        );
        Ok(version)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAccessTokenRepository {
    tokens: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryAccessTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessTokenRepository for InMemoryAccessTokenRepository {
    async fn find_user(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token).cloned())
    }

    async fn save(&self, token: &str, user: &User) -> Result<(), RepositoryError> {
        let mut tokens = self.tokens.write().await;
        tokens.insert(token.to_string(), user.clone());
        Ok(())
    }
}

/// Every in-memory store, wired together for the binary and for tests
#[derive(Clone, Default)]
pub struct InMemoryStores {
    pub repos: InMemoryRepoRepository,
    pub permissions: InMemoryPermissionRepository,
    pub memberships: InMemoryMembershipRepository,
    pub settings: InMemorySettingsRepository,
    pub tokens: InMemoryAccessTokenRepository,
}

impl InMemoryStores {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_settings_start_empty_at_version_zero() {
        let repo = InMemorySettingsRepository::new();
        let loaded = repo.load(RepoId(1)).await.unwrap();
        assert!(loaded.settings.env_vars.is_empty());
        assert_eq!(loaded.version, SettingsVersion(0));
    }

    #[tokio::test]
    async fn test_settings_save_bumps_version() {
        let repo = InMemorySettingsRepository::new();
        let mut settings = RepoSettings::default();
        settings.other.insert("foo".into(), json!("bar"));

        let v1 = repo.save(RepoId(1), &settings, SettingsVersion(0)).await.unwrap();
        assert_eq!(v1, SettingsVersion(1));

        let loaded = repo.load(RepoId(1)).await.unwrap();
        assert_eq!(loaded.version, v1);
        assert_eq!(loaded.settings.other.get("foo"), Some(&json!("bar")));
    }

    #[tokio::test]
    async fn test_stale_save_is_rejected_without_writing() {
        let repo = InMemorySettingsRepository::new();
        let first = RepoSettings::default();
        repo.save(RepoId(1), &first, SettingsVersion(0)).await.unwrap();

        let mut second = RepoSettings::default();
        second.other.insert("foo".into(), json!("clobbered"));
        let err = repo.save(RepoId(1), &second, SettingsVersion(0)).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Conflict { expected: SettingsVersion(0), actual: SettingsVersion(1), .. }
        ));

        let loaded = repo.load(RepoId(1)).await.unwrap();
        assert!(loaded.settings.other.is_empty());
    }

    #[tokio::test]
    async fn test_membership_lookup() {
        let repo = InMemoryMembershipRepository::new();
        repo.save(&Membership {
            organization_id: OrganizationId(3),
            user_id: UserId(1),
            role: MembershipRole::Admin,
        })
        .await
        .unwrap();

        assert_eq!(
            repo.find_role(OrganizationId(3), UserId(1)).await.unwrap(),
            Some(MembershipRole::Admin)
        );
        assert_eq!(repo.find_role(OrganizationId(3), UserId(2)).await.unwrap(), None);
    }
}
