// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Repository Settings Blob
//!
//! A repository's settings are one loosely structured JSON document. This
//! module only knows the shape of `env_vars`; every other top-level key is
//! kept in an ordered open map so that a read-modify-write of the blob hands
//! sibling settings back exactly as they were read. The position of
//! `env_vars` among the top-level keys is remembered too, so a rewritten blob
//! serializes with the key order it was read with.
//!
//! Storage has no sub-document update, so callers always load the whole blob,
//! change it in memory and save the whole blob back together with the
//! [`SettingsVersion`] they loaded (optimistic concurrency, see
//! [`crate::domain::repository::SettingsRepository`]).

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::domain::env_var::{EnvVar, EnvVarId};

const ENV_VARS_KEY: &str = "env_vars";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoSettings {
    pub env_vars: Vec<EnvVar>,

    /// Every other settings key, in its original order
    pub other: Map<String, Value>,

    /// Index of `env_vars` among the top-level keys as read; first when unknown
    env_vars_position: Option<usize>,
}

impl RepoSettings {
    /// Settings with no env vars and the given sibling keys
    pub fn with_other(other: Map<String, Value>) -> Self {
        Self {
            other,
            ..Self::default()
        }
    }

    pub fn env_var(&self, id: &EnvVarId) -> Option<&EnvVar> {
        self.env_vars.iter().find(|e| &e.id == id)
    }

    pub fn env_var_mut(&mut self, id: &EnvVarId) -> Option<&mut EnvVar> {
        self.env_vars.iter_mut().find(|e| &e.id == id)
    }

    /// Append an env var unless its id is already taken.
    ///
    /// Returns `false` and leaves the list unchanged on a duplicate id.
    pub fn insert_env_var(&mut self, env_var: EnvVar) -> bool {
        if self.env_var(&env_var.id).is_some() {
            return false;
        }
        self.env_vars.push(env_var);
        true
    }
}

impl Serialize for RepoSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let position = self.env_vars_position.unwrap_or(0).min(self.other.len());
        let mut map = serializer.serialize_map(Some(self.other.len() + 1))?;
        for (index, (key, value)) in self.other.iter().enumerate() {
            if index == position {
                map.serialize_entry(ENV_VARS_KEY, &self.env_vars)?;
            }
            map.serialize_entry(key, value)?;
        }
        if position == self.other.len() {
            map.serialize_entry(ENV_VARS_KEY, &self.env_vars)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RepoSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut other = Map::<String, Value>::deserialize(deserializer)?;
        let env_vars_position = other.keys().position(|key| key == ENV_VARS_KEY);
        let env_vars = match other.shift_remove(ENV_VARS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value).map_err(D::Error::custom)?,
        };

        Ok(Self {
            env_vars,
            other,
            env_vars_position,
        })
    }
}

/// Monotonic version of a stored settings blob; 0 means "never saved"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SettingsVersion(pub u64);

impl SettingsVersion {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SettingsVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Settings as loaded from storage, tagged with the version they were read at
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedSettings {
    pub settings: RepoSettings,
    pub version: SettingsVersion,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn blob() -> Value {
        json!({
            "builds_only_with_travis_yml": true,
            "env_vars": [
                {"id": "abc", "name": "FOO", "value": "enc", "public": true, "repository_id": 1}
            ],
            "foo": "bar",
            "maximum_number_of_builds": 0
        })
    }

    #[test]
    fn test_sibling_keys_survive_round_trip() {
        let settings: RepoSettings = serde_json::from_value(blob()).unwrap();
        assert_eq!(settings.env_vars.len(), 1);
        assert_eq!(settings.other.get("foo"), Some(&json!("bar")));

        let keys: Vec<&String> = settings.other.keys().collect();
        assert_eq!(keys, ["builds_only_with_travis_yml", "foo", "maximum_number_of_builds"]);

        assert_eq!(serde_json::to_value(&settings).unwrap(), blob());
    }

    #[test]
    fn test_top_level_key_order_survives_round_trip() {
        let raw = r#"{"foo":"bar","env_vars":[{"id":"abc","name":"FOO","value":"enc","public":true,"repository_id":1}],"maximum_number_of_builds":0}"#;
        let settings: RepoSettings = serde_json::from_str(raw).unwrap();
        assert_eq!(serde_json::to_string(&settings).unwrap(), raw);

        let last = r#"{"foo":"bar","env_vars":[]}"#;
        let settings: RepoSettings = serde_json::from_str(last).unwrap();
        assert_eq!(serde_json::to_string(&settings).unwrap(), last);
    }

    #[test]
    fn test_new_settings_write_env_vars_first() {
        let mut other = Map::new();
        other.insert("foo".to_string(), json!("bar"));
        let settings = RepoSettings::with_other(other);
        assert_eq!(serde_json::to_string(&settings).unwrap(), r#"{"env_vars":[],"foo":"bar"}"#);
    }

    #[test]
    fn test_missing_env_vars_key_defaults_to_empty() {
        let settings: RepoSettings = serde_json::from_value(json!({"foo": "bar"})).unwrap();
        assert!(settings.env_vars.is_empty());
        assert_eq!(settings.other.len(), 1);
    }

    #[test]
    fn test_lookup_by_id() {
        let mut settings: RepoSettings = serde_json::from_value(blob()).unwrap();
        assert!(settings.env_var(&EnvVarId::from("abc")).is_some());
        assert!(settings.env_var(&EnvVarId::from("foo")).is_none());

        settings.env_var_mut(&EnvVarId::from("abc")).unwrap().name = "QUX".into();
        assert_eq!(settings.env_vars[0].name, "QUX");
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut settings: RepoSettings = serde_json::from_value(blob()).unwrap();
        let mut duplicate = settings.env_vars[0].clone();
        duplicate.name = "OTHER".into();

        assert!(!settings.insert_env_var(duplicate));
        assert_eq!(settings.env_vars.len(), 1);
        assert_eq!(settings.env_vars[0].name, "FOO");
    }
}
