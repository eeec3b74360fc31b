//! # Message Model
//!
//! The value type for one remote-console request and its structural checks.
//!
//! A [`Message`] is built exactly once — by [`crate::core::codec::decode`] for
//! an inbound datagram, or by a client composing an outbound request — and is
//! consumed by a single evaluate-or-encode call. There is no mutation after
//! construction and no persistence.

use crate::error::{RconError, Result};
use std::fmt;
use std::net::SocketAddr;

/// Transport-protection strength of a request, weakest to strongest.
///
/// `Invalid` sits outside the order: it tags a decoded request whose
/// security-method field was unrecognized, so the structural check can report
/// a specific reason instead of a generic parse error. It never compares as
/// stronger or weaker than a real level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    /// Password and command travel in cleartext.
    Unencrypted,
    /// Command encrypted under a key derived from the shared password.
    EncryptedPlain,
    /// Encrypted, and carrying a server-issued one-shot challenge nonce.
    EncryptedChallenge,
    /// Unrecognized security method on the wire.
    Invalid,
}

impl SecurityLevel {
    /// Ordinal strength of a real level. `None` for `Invalid`.
    pub fn rank(self) -> Option<u8> {
        match self {
            SecurityLevel::Unencrypted => Some(0),
            SecurityLevel::EncryptedPlain => Some(1),
            SecurityLevel::EncryptedChallenge => Some(2),
            SecurityLevel::Invalid => None,
        }
    }

    /// Whether this level satisfies a configured minimum.
    ///
    /// `Invalid` satisfies nothing, and nothing is measured against it.
    pub fn meets(self, minimum: SecurityLevel) -> bool {
        match (self.rank(), minimum.rank()) {
            (Some(own), Some(min)) => own >= min,
            _ => false,
        }
    }

    /// Wire name of the encrypted method, if this level has one.
    pub fn method(self) -> Option<&'static str> {
        match self {
            SecurityLevel::EncryptedPlain => Some("PLAIN"),
            SecurityLevel::EncryptedChallenge => Some("CHALLENGE"),
            SecurityLevel::Unencrypted | SecurityLevel::Invalid => None,
        }
    }
}

impl TryFrom<u8> for SecurityLevel {
    type Error = RconError;

    /// Maps the configured integer onto a real level. `Invalid` is
    /// unreachable from configuration.
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(SecurityLevel::Unencrypted),
            1 => Ok(SecurityLevel::EncryptedPlain),
            2 => Ok(SecurityLevel::EncryptedChallenge),
            _ => Err(RconError::UnknownSecureProtocol),
        }
    }
}

/// One decoded or to-be-sent remote-console request.
pub struct Message {
    /// Transport protection this request claims.
    pub level: SecurityLevel,
    /// Hex freshness token; meaningful only at `EncryptedChallenge`.
    pub challenge: String,
    /// The literal command line to execute.
    pub command: String,
    /// Credential presented by the sender. Redacted from `Debug` output.
    pub password: String,
    /// Sender address from the transport envelope, not the wire payload.
    /// Identifies which issued challenge to match against.
    pub remote: SocketAddr,
}

impl Message {
    /// Compose a request without a challenge token.
    pub fn new(
        remote: SocketAddr,
        level: SecurityLevel,
        command: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            level,
            challenge: String::new(),
            command: command.into(),
            password: password.into(),
            remote,
        }
    }

    /// Compose an `EncryptedChallenge` request carrying an issued nonce.
    pub fn with_challenge(
        remote: SocketAddr,
        command: impl Into<String>,
        password: impl Into<String>,
        challenge: impl Into<String>,
    ) -> Self {
        Self {
            level: SecurityLevel::EncryptedChallenge,
            challenge: challenge.into(),
            command: command.into(),
            password: password.into(),
            remote,
        }
    }

    /// Structural check: is this a syntactically complete request?
    ///
    /// Pure and policy-independent. Checks run in a fixed order and the first
    /// violated rule is the reported reason, so diagnostics are deterministic.
    pub fn validate(&self) -> Result<()> {
        if self.level == SecurityLevel::Invalid {
            return Err(RconError::UnknownSecureProtocol);
        }

        if self.password.is_empty() {
            return Err(RconError::MissingPassword);
        }

        if self.command.is_empty() {
            return Err(RconError::MissingCommand);
        }

        if self.level == SecurityLevel::EncryptedChallenge && self.challenge.is_empty() {
            return Err(RconError::MissingChallenge);
        }

        Ok(())
    }
}

// Credentials must never reach logs, so Debug is written by hand.
impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("level", &self.level)
            .field("challenge", &self.challenge)
            .field("command", &self.command)
            .field("password", &"<redacted>")
            .field("remote", &self.remote)
            .finish()
    }
}
