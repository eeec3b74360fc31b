//! # Utility Modules
//!
//! Supporting utilities for cryptography and logging.
//!
//! ## Components
//! - **Crypto**: SHA-256 key derivation, XChaCha20-Poly1305 AEAD, base64
//! - **Logging**: structured logging configuration
//!
//! ## Security
//! - Cryptographically secure RNG for nonces
//! - Derived key material wiped after cipher initialization (zeroize crate)

pub mod crypto;
pub mod logging;

pub use crypto::Crypto;
