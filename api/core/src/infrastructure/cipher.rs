// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! AES-256-GCM implementation of [`SecretCipher`].
//!
//! Stored form is `base64(nonce || ciphertext)` with a fresh random 96-bit
//! nonce per encryption, so encrypting the same value twice yields different
//! ciphertexts.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::domain::cipher::{CipherError, SecretCipher};
use crate::domain::env_var::EncryptedValue;

const NONCE_LEN: usize = 12;

pub struct AesGcmCipher {
    cipher: Aes256Gcm,
}

impl AesGcmCipher {
    pub fn new(key: &[u8; 32]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Build from the base64 key found in `encryption.key`
    pub fn from_base64_key(encoded: &str) -> Result<Self, CipherError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| CipherError::InvalidKey(format!("expected 32 bytes, got {}", b.len())))?;
        Ok(Self::new(&key))
    }
}

impl SecretCipher for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> Result<EncryptedValue, CipherError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(EncryptedValue(STANDARD.encode(sealed)))
    }

    fn decrypt(&self, value: &EncryptedValue) -> Result<String, CipherError> {
        let sealed = STANDARD
            .decode(&value.0)
            .map_err(|e| CipherError::Decrypt(format!("invalid base64: {}", e)))?;
        if sealed.len() < NONCE_LEN {
            return Err(CipherError::Decrypt("ciphertext too short".to_string()));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| CipherError::Decrypt(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| CipherError::Decrypt(e.to_string()))
    }
}
