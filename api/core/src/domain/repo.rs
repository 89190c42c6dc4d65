// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::actor::Owner;
use crate::domain::policy::PolicyViolation;

/// Numeric identifier of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoId(pub u64);

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A source repository registered with the CI platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub id: RepoId,
    pub owner: Owner,
    pub owner_name: String,
    pub name: String,

    /// Migration to the commercial site is in progress
    #[serde(default)]
    pub migrating: bool,

    /// Set once the repository has been moved to the commercial site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<DateTime<Utc>>,
}

impl Repo {
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner_name, self.name)
    }

    /// Migrating and migrated repositories are both terminal for mutations.
    pub fn is_migrated(&self) -> bool {
        self.migrating || self.migrated_at.is_some()
    }
}

/// Gate in front of every mutating, repository-scoped operation.
///
/// Runs before any permission check so that a migrated repository is
/// rejected the same way for every caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositoryStateGuard;

impl RepositoryStateGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, repo: &Repo) -> Result<(), PolicyViolation> {
        if repo.is_migrated() {
            return Err(PolicyViolation::RepoMigrated { repository_id: repo.id });
        }
        Ok(())
    }
}
