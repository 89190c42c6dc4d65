// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Seed data loader
//!
//! Fills the in-memory stores from a YAML file so the API can run without
//! the platform database. Env var values are written in plaintext in the
//! seed file and encrypted with the configured cipher while loading.
//!
//! ```yaml
//! users:
//!   - { id: 1, login: svenfuchs, token: "secret-token" }
//! memberships:
//!   - { organization_id: 3, user_id: 1, role: admin }
//! permissions:
//!   - { repository_id: 1, user_id: 1, push: true }
//! repositories:
//!   - id: 1
//!     owner: { type: User, id: 1 }
//!     owner_name: svenfuchs
//!     name: minimal
//!     env_vars:
//!       - { id: abc, name: FOO, value: bar, public: true }
//!     settings:
//!       foo: bar
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

use crate::domain::actor::{Membership, User};
use crate::domain::cipher::SecretCipher;
use crate::domain::env_var::{EnvVar, EnvVarId};
use crate::domain::permission::Permission;
use crate::domain::repo::Repo;
use crate::domain::repository::{
    AccessTokenRepository, MembershipRepository, PermissionRepository, RepoRepository,
    SettingsRepository,
};
use crate::domain::settings::RepoSettings;
use crate::infrastructure::repositories::InMemoryStores;

#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub repositories: Vec<SeedRepo>,
}

#[derive(Debug, Deserialize)]
pub struct SeedUser {
    #[serde(flatten)]
    pub user: User,
    /// Access token accepted for this user
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedRepo {
    #[serde(flatten)]
    pub repo: Repo,
    #[serde(default)]
    pub env_vars: Vec<SeedEnvVar>,
    /// Every other settings key
    #[serde(default)]
    pub settings: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct SeedEnvVar {
    pub id: Option<String>,
    pub name: String,
    /// Plaintext; encrypted on load
    pub value: String,
    #[serde(default)]
    pub public: bool,
}

impl SeedData {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file: {:?}", path))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse seed file: {:?}", path))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Write the seed data into `stores`
    pub async fn apply(&self, stores: &InMemoryStores, cipher: &dyn SecretCipher) -> Result<()> {
        for seed in &self.users {
            if let Some(token) = &seed.token {
                stores.tokens.save(token, &seed.user).await?;
            }
        }

        for membership in &self.memberships {
            stores.memberships.save(membership).await?;
        }

        for permission in &self.permissions {
            stores.permissions.save(permission).await?;
        }

        for seed in &self.repositories {
            stores.repos.save(&seed.repo).await?;

            let mut settings = RepoSettings::with_other(seed.settings.clone());
            for env_var in &seed.env_vars {
                let value = cipher
                    .encrypt(&env_var.value)
                    .with_context(|| format!("Failed to encrypt env var {}", env_var.name))?;
                let mut entry = EnvVar::new(seed.repo.id, env_var.name.clone(), value, env_var.public);
                if let Some(id) = &env_var.id {
                    entry.id = EnvVarId(id.clone());
                }
                if !settings.insert_env_var(entry) {
                    anyhow::bail!(
                        "Duplicate env var id in repository {}: {:?}",
                        seed.repo.slug(),
                        env_var.id
                    );
                }
            }

            let current = stores.settings.load(seed.repo.id).await?;
            stores
                .settings
                .save(seed.repo.id, &settings, current.version)
                .await?;
        }

        info!(
            users = self.users.len(),
            repositories = self.repositories.len(),
            "Loaded seed data"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::actor::{Owner, UserId};
    use crate::domain::repo::RepoId;
    use crate::infrastructure::cipher::AesGcmCipher;
    use serde_json::json;

    const SEED: &str = r#"
users:
  - { id: 1, login: svenfuchs, token: "secret-token" }
permissions:
  - { repository_id: 1, user_id: 1, push: true }
repositories:
  - id: 1
    owner: { type: User, id: 1 }
    owner_name: svenfuchs
    name: minimal
    env_vars:
      - { id: abc, name: FOO, value: bar, public: true }
    settings:
      foo: bar
"#;

    #[tokio::test]
    async fn test_seed_fills_stores_and_encrypts_values() {
        let stores = InMemoryStores::new();
        let cipher = AesGcmCipher::new(&[3u8; 32]);
        SeedData::from_yaml_str(SEED).unwrap().apply(&stores, &cipher).await.unwrap();

        let user = stores.tokens.find_user("secret-token").await.unwrap().unwrap();
        assert_eq!(user.id, UserId(1));

        let repo = stores.repos.find_by_id(RepoId(1)).await.unwrap().unwrap();
        assert_eq!(repo.owner, Owner::User(UserId(1)));
        assert!(!repo.is_migrated());

        let loaded = stores.settings.load(RepoId(1)).await.unwrap();
        let env_var = loaded.settings.env_var(&EnvVarId::from("abc")).unwrap();
        assert_ne!(env_var.value.0, "bar");
        assert_eq!(cipher.decrypt(&env_var.value).unwrap(), "bar");
        assert_eq!(loaded.settings.other.get("foo"), Some(&json!("bar")));

        assert!(stores.permissions.find(RepoId(1), UserId(1)).await.unwrap().unwrap().push);
    }

    #[tokio::test]
    async fn test_duplicate_env_var_ids_are_rejected() {
        let yaml = r#"
repositories:
  - id: 1
    owner: { type: User, id: 1 }
    owner_name: a
    name: b
    env_vars:
      - { id: abc, name: FOO, value: bar }
      - { id: abc, name: BAZ, value: qux }
"#;
        let stores = InMemoryStores::new();
        let cipher = AesGcmCipher::new(&[3u8; 32]);
        let err = SeedData::from_yaml_str(yaml).unwrap().apply(&stores, &cipher).await.unwrap_err();
        assert!(err.to_string().contains("Duplicate env var id"));
    }
}
