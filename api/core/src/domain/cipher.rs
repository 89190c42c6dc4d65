// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

use crate::domain::env_var::EncryptedValue;

#[derive(Debug, Error)]
pub enum CipherError {
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Encryption failed: {0}")]
    Encrypt(String),

    #[error("Decryption failed: {0}")]
    Decrypt(String),
}

/// Reversible transform applied to env var values at rest
pub trait SecretCipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<EncryptedValue, CipherError>;

    fn decrypt(&self, value: &EncryptedValue) -> Result<String, CipherError>;
}
