// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Card Number Codec
//!
//! Deterministic authenticated encryption of card numbers.
//!
//! ## Scheme
//!
//! Two 256-bit keys are derived from the configured secret with SHA-256 under
//! distinct labels: a cipher key and a nonce key. For each plaintext:
//!
//! ```text
//! nonce  = HMAC-SHA256(nonce_key, plaintext)[..12]
//! sealed = AES-256-GCM(cipher_key, nonce, plaintext)     // ciphertext || tag
//! output = base64(nonce || sealed)
//! ```
//!
//! The same card number therefore always encrypts to the same text under the
//! same secret. This reveals when two records hold the same number; callers
//! only ever decrypt and mask, so no code depends on searching by ciphertext.
//!
//! Decryption authenticates the GCM tag and then recomputes the nonce from the
//! recovered plaintext, rejecting any mismatch.
//!
//! ## Errors
//!
//! Errors are opaque on purpose. They never carry plaintext, ciphertext or
//! the reason a particular input failed.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

const CIPHER_KEY_LABEL: &[u8] = b"bank-cards/card-number/cipher-key/v1";
const NONCE_KEY_LABEL: &[u8] = b"bank-cards/card-number/nonce-key/v1";

const MASK_PREFIX: &str = "**** **** **** ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("card number encryption failed")]
    Encryption,

    #[error("card number decryption failed")]
    Decryption,
}

fn derive_key(label: &[u8], secret: &[u8]) -> [u8; 32] {
    Sha256::new()
        .chain_update(label)
        .chain_update(secret)
        .finalize()
        .into()
}

/// Symmetric codec for card numbers, built once from configuration.
#[derive(Clone)]
pub struct CardCodec {
    cipher: Aes256Gcm,
    nonce_key: [u8; 32],
}

impl std::fmt::Debug for CardCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardCodec").finish_non_exhaustive()
    }
}

impl CardCodec {
    pub fn new(secret: &str) -> Self {
        let cipher_key = derive_key(CIPHER_KEY_LABEL, secret.as_bytes());
        Self {
            cipher: Aes256Gcm::new(&cipher_key.into()),
            nonce_key: derive_key(NONCE_KEY_LABEL, secret.as_bytes()),
        }
    }

    fn nonce_mac(&self, plaintext: &[u8]) -> Result<HmacSha256, CodecError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.nonce_key)
            .map_err(|_| CodecError::Encryption)?;
        mac.update(plaintext);
        Ok(mac)
    }

    /// Encrypt a card number into base64 text.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CodecError> {
        let tag = self.nonce_mac(plaintext.as_bytes())?.finalize().into_bytes();
        let nonce_bytes = &tag[..NONCE_LEN];

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(nonce_bytes), plaintext.as_bytes())
            .map_err(|_| CodecError::Encryption)?;

        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(nonce_bytes);
        out.extend_from_slice(&sealed);
        Ok(Base64::encode_string(&out))
    }

    /// Decrypt text produced by [`CardCodec::encrypt`].
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CodecError> {
        let data = Base64::decode_vec(ciphertext).map_err(|_| CodecError::Decryption)?;
        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(CodecError::Decryption);
        }

        let (nonce_bytes, sealed) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| CodecError::Decryption)?;

        self.nonce_mac(&plaintext)
            .map_err(|_| CodecError::Decryption)?
            .verify_truncated_left(nonce_bytes)
            .map_err(|_| CodecError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| CodecError::Decryption)
    }

    /// Decrypt and mask in one step, for display.
    pub fn masked(&self, ciphertext: &str) -> Result<String, CodecError> {
        self.decrypt(ciphertext).map(|plain| mask_card_number(&plain))
    }
}

/// Mask a plaintext card number down to its last four characters.
pub fn mask_card_number(number: &str) -> String {
    let count = number.chars().count();
    let last_four: String = number.chars().skip(count.saturating_sub(4)).collect();
    format!("{MASK_PREFIX}{last_four}")
}
