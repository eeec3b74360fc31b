//! # Crypto Provider
//!
//! Symmetric protection for encrypted rcon requests.
//!
//! The shared secret is a configured password; the cipher key is its SHA-256
//! digest. Sealed payloads are laid out as `nonce || ciphertext` with a
//! random 24-byte XChaCha20-Poly1305 nonce, then base64-encoded for the text
//! wire format.
//!
//! `open` collapses every failure mode into one generic error so a sender
//! cannot distinguish a bad tag from a truncated payload.

use crate::error::{RconError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Nonce length prepended to each sealed payload.
pub const NONCE_LEN: usize = 24;

/// Derive the symmetric key from the shared password.
pub fn derive_key(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

/// AEAD cipher keyed from the shared password.
pub struct Crypto {
    cipher: XChaCha20Poly1305,
}

impl Crypto {
    pub fn from_password(password: &str) -> Self {
        let mut key = derive_key(password);
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&key));
        key.zeroize();
        Self { cipher }
    }

    /// Seal plaintext under a fresh random nonce; output is
    /// `nonce || ciphertext`.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|_| RconError::EncryptionFailed)?;

        let mut payload = nonce.to_vec();
        payload.extend(ciphertext);
        Ok(payload)
    }

    /// Open a `nonce || ciphertext` payload.
    pub fn open(&self, payload: &[u8]) -> Result<Vec<u8>> {
        if payload.len() < NONCE_LEN {
            return Err(RconError::DecryptionFailed);
        }

        let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
        self.cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| RconError::DecryptionFailed)
    }
}

pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}

pub fn base64_decode(text: &str) -> Result<Vec<u8>> {
    BASE64.decode(text).map_err(|_| RconError::InvalidBase64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let crypto = Crypto::from_password("secret");
        let sealed = crypto.seal(b"map ffa").unwrap();
        assert_eq!(crypto.open(&sealed).unwrap(), b"map ffa");
    }

    #[test]
    fn nonce_makes_ciphertexts_differ() {
        let crypto = Crypto::from_password("secret");
        let a = crypto.seal(b"status").unwrap();
        let b = crypto.seal(b"status").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = Crypto::from_password("secret").seal(b"status").unwrap();
        let result = Crypto::from_password("wrong").open(&sealed);
        assert!(matches!(result, Err(RconError::DecryptionFailed)));
    }

    #[test]
    fn tampered_ciphertext_fails_to_open() {
        let crypto = Crypto::from_password("secret");
        let mut sealed = crypto.seal(b"status").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xFF;
        assert!(matches!(
            crypto.open(&sealed),
            Err(RconError::DecryptionFailed)
        ));
    }

    #[test]
    fn truncated_payload_fails_to_open() {
        let crypto = Crypto::from_password("secret");
        assert!(matches!(
            crypto.open(&[0u8; NONCE_LEN - 1]),
            Err(RconError::DecryptionFailed)
        ));
    }

    #[test]
    fn key_derivation_is_deterministic() {
        assert_eq!(derive_key("secret"), derive_key("secret"));
        assert_ne!(derive_key("secret"), derive_key("Secret"));
    }

    #[test]
    fn base64_rejects_garbage() {
        assert!(matches!(
            base64_decode("!!!not-base64!!!"),
            Err(RconError::InvalidBase64)
        ));
    }
}
