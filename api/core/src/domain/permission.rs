// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

use crate::domain::actor::UserId;
use crate::domain::repo::RepoId;

/// Access level an operation requires on a repository-scoped resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Read,
    Write,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Read => "read",
            AccessLevel::Write => "write",
        }
    }
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's capability flags on one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub repository_id: RepoId,
    pub user_id: UserId,
    #[serde(default)]
    pub pull: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub admin: bool,
}

impl Permission {
    pub fn can_write(&self) -> bool {
        self.push || self.admin
    }

    /// Write implies read
    pub fn can_read(&self) -> bool {
        self.pull || self.can_write()
    }

    pub fn grants(&self, level: AccessLevel) -> bool {
        match level {
            AccessLevel::Read => self.can_read(),
            AccessLevel::Write => self.can_write(),
        }
    }
}
