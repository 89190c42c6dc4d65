// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Env Var Entity
//!
//! An env var is a named value exposed to the build environment of one
//! repository. It has no table of its own: every env var lives as an element
//! of the `env_vars` list inside the repository settings blob (see
//! [`crate::domain::settings`]). Values are stored encrypted and only
//! decrypted when rendered for a caller holding read access.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::cipher::{CipherError, SecretCipher};
use crate::domain::repo::RepoId;

/// Opaque env var identifier, unique within one repository's settings
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvVarId(pub String);

impl EnvVarId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EnvVarId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for EnvVarId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for EnvVarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ciphertext produced by a [`SecretCipher`]; never holds plaintext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedValue(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvVar {
    pub id: EnvVarId,
    pub name: String,
    pub value: EncryptedValue,
    #[serde(default)]
    pub public: bool,
    pub repository_id: RepoId,

    /// Keys this version does not know about, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnvVar {
    pub fn new(
        repository_id: RepoId,
        name: impl Into<String>,
        value: EncryptedValue,
        public: bool,
    ) -> Self {
        Self {
            id: EnvVarId::new(),
            name: name.into(),
            value,
            public,
            repository_id,
            extra: Map::new(),
        }
    }

    /// Apply the fields present in `patch`; absent fields keep their value.
    ///
    /// A new value is encrypted before the entry is touched, so a cipher
    /// failure leaves the entry unchanged.
    pub fn apply(&mut self, patch: &EnvVarPatch, cipher: &dyn SecretCipher) -> Result<(), CipherError> {
        let value = match &patch.value {
            Some(plaintext) => Some(cipher.encrypt(plaintext)?),
            None => None,
        };
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(value) = value {
            self.value = value;
        }
        if let Some(public) = patch.public {
            self.public = public;
        }
        Ok(())
    }
}

// ============================================================================
// Partial update
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("env_var.{field} must be a {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Partial update of one env var; `None` means "leave as is"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVarPatch {
    pub name: Option<String>,
    pub value: Option<String>,
    pub public: Option<bool>,
}

impl EnvVarPatch {
    /// Build a patch from request params.
    ///
    /// Accepts `env_var.<field>` keys as well as bare `<field>` keys; the
    /// prefixed form wins when both are given. Unknown keys are ignored.
    pub fn from_params(params: &Map<String, Value>) -> Result<Self, PatchError> {
        let lookup = |field: &str| {
            params
                .get(&format!("env_var.{}", field))
                .or_else(|| params.get(field))
        };

        let name = match lookup("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(PatchError::InvalidType { field: "name", expected: "string" }),
        };
        let value = match lookup("value") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(PatchError::InvalidType { field: "value", expected: "string" }),
        };
        let public = match lookup("public") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(_) => return Err(PatchError::InvalidType { field: "public", expected: "boolean" }),
        };

        Ok(Self { name, value, public })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.value.is_none() && self.public.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct ReverseCipher;

    impl SecretCipher for ReverseCipher {
        fn encrypt(&self, plaintext: &str) -> Result<EncryptedValue, CipherError> {
            Ok(EncryptedValue(plaintext.chars().rev().collect()))
        }

        fn decrypt(&self, value: &EncryptedValue) -> Result<String, CipherError> {
            Ok(value.0.chars().rev().collect())
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_patch_reads_prefixed_keys() {
        let patch = EnvVarPatch::from_params(&params(json!({"env_var.name": "QUX"}))).unwrap();
        assert_eq!(patch.name.as_deref(), Some("QUX"));
        assert!(patch.value.is_none());
        assert!(patch.public.is_none());
    }

    #[test]
    fn test_prefixed_key_wins_over_bare_key() {
        let patch = EnvVarPatch::from_params(&params(json!({
            "name": "BARE",
            "env_var.name": "PREFIXED",
            "public": false
        })))
        .unwrap();
        assert_eq!(patch.name.as_deref(), Some("PREFIXED"));
        assert_eq!(patch.public, Some(false));
    }

    #[test]
    fn test_patch_rejects_wrong_types() {
        let err = EnvVarPatch::from_params(&params(json!({"env_var.public": "yes"}))).unwrap_err();
        assert_eq!(err, PatchError::InvalidType { field: "public", expected: "boolean" });
    }

    #[test]
    fn test_apply_only_touches_present_fields() {
        let mut env_var = EnvVar::new(RepoId(1), "FOO", EncryptedValue("rab".into()), true);
        let patch = EnvVarPatch { name: Some("QUX".into()), ..Default::default() };
        env_var.apply(&patch, &ReverseCipher).unwrap();

        assert_eq!(env_var.name, "QUX");
        assert_eq!(env_var.value, EncryptedValue("rab".into()));
        assert!(env_var.public);
    }

    #[test]
    fn test_apply_encrypts_new_value() {
        let mut env_var = EnvVar::new(RepoId(1), "FOO", EncryptedValue("rab".into()), true);
        let patch = EnvVarPatch { value: Some("secret".into()), public: Some(false), ..Default::default() };
        env_var.apply(&patch, &ReverseCipher).unwrap();

        assert_eq!(env_var.value, EncryptedValue("terces".into()));
        assert!(!env_var.public);
    }

    #[test]
    fn test_unknown_entry_keys_round_trip() {
        let raw = json!({
            "id": "abc",
            "name": "FOO",
            "value": "xyz",
            "public": true,
            "repository_id": 1,
            "branch": "main"
        });
        let env_var: EnvVar = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(env_var.extra.get("branch"), Some(&json!("main")));
        assert_eq!(serde_json::to_value(&env_var).unwrap(), raw);
    }
}
