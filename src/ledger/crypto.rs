// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Passphrase encryption for backup artifacts.
//!
//! Artifact layout, base64 encoded: `salt(16) || nonce(12) || ciphertext`.
//! The key is Argon2id over the passphrase with the artifact's salt and the
//! crate's default cost parameters; the cipher is AES-256-GCM, so a wrong
//! passphrase and a tampered file fail the same way.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use argon2::Argon2;
use rand::RngCore;

use crate::error::{LedgerError, Result};

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

fn derive_key(salt: &[u8], passphrase: &str) -> Result<Key<Aes256Gcm>> {
    let mut key = [0u8; KEY_LEN];
    Argon2::default()
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| LedgerError::InvalidBackup(format!("key derivation failed: {}", e)))?;
    Ok(*Key::<Aes256Gcm>::from_slice(&key))
}

pub fn encrypt(plaintext: &str, passphrase: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new(&derive_key(&salt, passphrase)?);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| LedgerError::InvalidBackup("encryption failed".into()))?;

    let mut blob = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(blob))
}

pub fn decrypt(artifact: &str, passphrase: &str) -> Result<String> {
    let blob = STANDARD
        .decode(artifact.trim())
        .map_err(|_| LedgerError::InvalidBackup("not a backup artifact".into()))?;
    if blob.len() <= SALT_LEN + NONCE_LEN {
        return Err(LedgerError::InvalidBackup("artifact too short".into()));
    }
    let (salt, rest) = blob.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(&derive_key(salt, passphrase)?);
    let plain = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| LedgerError::InvalidBackup("decryption failed".into()))?;
    let text = String::from_utf8(plain)
        .map_err(|_| LedgerError::InvalidBackup("decrypted content is not text".into()))?;
    if text.trim().is_empty() {
        return Err(LedgerError::InvalidBackup("decrypted content is empty".into()));
    }
    Ok(text)
}
