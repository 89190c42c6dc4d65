// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts consumed by the application services. Accounts,
//! repositories and memberships are owned by other parts of the platform;
//! this core only reads them. The settings blob is the single thing written.
//!
//! | Trait | Reads | Writes | Implementations |
//! |-------|-------|--------|-----------------|
//! | `RepoRepository` | `Repo` | seeding only | `InMemoryRepoRepository` |
//! | `PermissionRepository` | `Permission` | seeding only | `InMemoryPermissionRepository` |
//! | `MembershipRepository` | `MembershipRole` | seeding only | `InMemoryMembershipRepository` |
//! | `SettingsRepository` | `VersionedSettings` | whole blob, versioned | `InMemorySettingsRepository` |
//! | `AccessTokenRepository` | `User` by token | seeding only | `InMemoryAccessTokenRepository` |

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::actor::{Membership, MembershipRole, OrganizationId, User, UserId};
use crate::domain::permission::Permission;
use crate::domain::repo::{Repo, RepoId};
use crate::domain::settings::{RepoSettings, SettingsVersion, VersionedSettings};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Stale settings for repository {repository_id}: expected {expected}, found {actual}")]
    Conflict {
        repository_id: RepoId,
        expected: SettingsVersion,
        actual: SettingsVersion,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Repository interface for `Repo` aggregates
#[async_trait]
pub trait RepoRepository: Send + Sync {
    async fn find_by_id(&self, id: RepoId) -> Result<Option<Repo>, RepositoryError>;

    async fn save(&self, repo: &Repo) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Find the permission record of `user_id` on `repository_id`
    async fn find(&self, repository_id: RepoId, user_id: UserId) -> Result<Option<Permission>, RepositoryError>;

    /// Save permission (create or replace)
    async fn save(&self, permission: &Permission) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find_role(
        &self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<Option<MembershipRole>, RepositoryError>;

    async fn save(&self, membership: &Membership) -> Result<(), RepositoryError>;
}

/// Whole-document storage of repository settings with optimistic versioning
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load the settings of a repository.
    ///
    /// A repository that never stored settings yields empty settings at
    /// version 0.
    async fn load(&self, repository_id: RepoId) -> Result<VersionedSettings, RepositoryError>;

    /// Replace the whole settings blob if it is still at `expected`.
    ///
    /// Returns the new version, or `RepositoryError::Conflict` without writing
    /// anything when another writer got there first.
    async fn save(
        &self,
        repository_id: RepoId,
        settings: &RepoSettings,
        expected: SettingsVersion,
    ) -> Result<SettingsVersion, RepositoryError>;
}

#[async_trait]
pub trait AccessTokenRepository: Send + Sync {
    async fn find_user(&self, token: &str) -> Result<Option<User>, RepositoryError>;

    async fn save(&self, token: &str, user: &User) -> Result<(), RepositoryError>;
}
