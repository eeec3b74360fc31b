//! # Error Types
//!
//! All failure paths of the rcon protocol core.
//!
//! Every rejection a datagram can earn — malformed input, cryptographic
//! failure, policy failure — is a distinct variant whose `Display` string is
//! the reason reported to server-side logs. The strings are stable: operators
//! grep for them.
//!
//! ## Error Categories
//! - **Malformed input**: too few tokens, unknown keyword, unknown method —
//!   operator-caused, reported verbatim.
//! - **Cryptographic failure**: bad base64, failed decryption — reported with
//!   a deliberately generic message so a sender learns nothing about *why*.
//! - **Policy failure**: weak security, bad password, mismatched challenge —
//!   reported distinctly for server-side diagnosis, never echoed on the wire.
//! - **I/O**: transport-edge failures, converted from `std::io::Error`.
//!
//! None of these are fatal to the process; each rejection is scoped to a
//! single datagram.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Primary error type for all rcon protocol operations.
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum RconError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    /// Datagram had fewer than three tokens or an unknown leading keyword.
    #[error("Invalid command")]
    InvalidCommand,

    /// Decode ran against a server with no configured secret.
    #[error("password not configured")]
    PasswordUnset,

    /// The `srcon` payload was not valid base64.
    #[error("Invalid Base64 string")]
    InvalidBase64,

    /// AEAD open failed. One generic reason for every cause (truncated nonce,
    /// bad tag, non-UTF-8 plaintext) so the sender gets no decryption oracle.
    #[error("Error during decryption")]
    DecryptionFailed,

    #[error("Error during encryption")]
    EncryptionFailed,

    /// Security method outside the known set.
    #[error("Unknown secure protocol")]
    UnknownSecureProtocol,

    #[error("Missing password")]
    MissingPassword,

    #[error("Missing command")]
    MissingCommand,

    #[error("Missing challenge")]
    MissingChallenge,

    /// Request level below the configured minimum.
    #[error("Weak security")]
    WeakSecurity,

    #[error("No server password configured")]
    NoServerPassword,

    #[error("Bad password")]
    BadPassword,

    /// Challenge absent, expired, already consumed, or for another address.
    #[error("Mismatched challenge")]
    MismatchedChallenge,

    /// Wire frame without the connectionless prefix.
    #[error("Invalid packet header")]
    InvalidHeader,

    #[error("Timeout occurred")]
    Timeout,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using `RconError`.
pub type Result<T> = std::result::Result<T, RconError>;
