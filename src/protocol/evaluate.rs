//! # Trust Evaluation
//!
//! The policy gate: decides whether a structurally valid request is strong
//! and authentic enough to execute right now.
//!
//! A request passes through exactly two gates. [`Message::validate`] answers
//! "is this a syntactically complete request"; [`acceptable`] answers the
//! policy question against an immutable [`Policy`] snapshot and the challenge
//! registry. There is no retry or partial state: each decoded datagram yields
//! one terminal accept-or-reject decision.

use crate::config::Policy;
use crate::core::message::{Message, SecurityLevel};
use crate::error::{RconError, Result};
use crate::protocol::challenge::ChallengeRegistry;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Judge a request against server policy and anti-replay state.
///
/// Re-runs the structural check first and surfaces its reason unchanged.
/// On success for the `EncryptedChallenge` level, the matched nonce has been
/// consumed: the identical datagram cannot be accepted again.
pub fn acceptable(
    message: &Message,
    policy: &Policy,
    registry: &ChallengeRegistry,
) -> Result<()> {
    message.validate()?;

    // Anti-downgrade: a weaker-but-well-formed request never satisfies a
    // stricter configured minimum.
    if !message.level.meets(policy.min_level) {
        return Err(RconError::WeakSecurity);
    }

    if policy.password.is_empty() {
        return Err(RconError::NoServerPassword);
    }

    if !passwords_match(&message.password, &policy.password) {
        return Err(RconError::BadPassword);
    }

    if message.level == SecurityLevel::EncryptedChallenge
        && !registry.match_and_consume(message.remote, &message.challenge)
    {
        return Err(RconError::MismatchedChallenge);
    }

    debug!(remote = %message.remote, level = ?message.level, "Request acceptable");
    Ok(())
}

/// Credential comparison without early exit. Both sides are digested so the
/// comparison touches a fixed length regardless of input.
fn passwords_match(presented: &str, configured: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let configured = Sha256::digest(configured.as_bytes());

    presented
        .iter()
        .zip(configured.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn addr() -> SocketAddr {
        "192.0.2.7:27960".parse().unwrap()
    }

    fn policy(min_level: SecurityLevel, password: &str) -> Policy {
        Policy {
            min_level,
            password: password.to_string(),
        }
    }

    #[test]
    fn sufficient_level_and_password_accepted() {
        let registry = ChallengeRegistry::new();
        let msg = Message::new(addr(), SecurityLevel::Unencrypted, "status", "secret");
        let result = acceptable(&msg, &policy(SecurityLevel::Unencrypted, "secret"), &registry);
        assert!(result.is_ok());
    }

    #[test]
    fn structural_failure_surfaces_unchanged() {
        let registry = ChallengeRegistry::new();
        let msg = Message::new(addr(), SecurityLevel::Unencrypted, "", "secret");
        let result = acceptable(&msg, &policy(SecurityLevel::Unencrypted, "secret"), &registry);
        assert!(matches!(result, Err(RconError::MissingCommand)));
    }

    #[test]
    fn every_downgrade_pair_is_weak() {
        use SecurityLevel::*;
        let registry = ChallengeRegistry::new();

        let pairs = [
            (Unencrypted, EncryptedPlain),
            (Unencrypted, EncryptedChallenge),
            (EncryptedPlain, EncryptedChallenge),
        ];
        for (level, minimum) in pairs {
            let mut msg = Message::new(addr(), level, "status", "secret");
            msg.challenge = "abc123".to_string();
            let result = acceptable(&msg, &policy(minimum, "secret"), &registry);
            assert!(
                matches!(result, Err(RconError::WeakSecurity)),
                "{level:?} against minimum {minimum:?}"
            );
        }
    }

    #[test]
    fn empty_server_password_rejected() {
        let registry = ChallengeRegistry::new();
        let msg = Message::new(addr(), SecurityLevel::Unencrypted, "status", "secret");
        let result = acceptable(&msg, &policy(SecurityLevel::Unencrypted, ""), &registry);
        assert!(matches!(result, Err(RconError::NoServerPassword)));
    }

    #[test]
    fn password_mismatch_rejected() {
        let registry = ChallengeRegistry::new();
        let msg = Message::new(addr(), SecurityLevel::Unencrypted, "status", "wrong");
        let result = acceptable(&msg, &policy(SecurityLevel::Unencrypted, "secret"), &registry);
        assert!(matches!(result, Err(RconError::BadPassword)));
    }

    #[test]
    fn challenge_level_consults_registry() {
        let registry = ChallengeRegistry::new();
        let challenge = registry.issue(addr());
        let msg = Message::with_challenge(addr(), "map ffa", "secret", challenge);
        let policy = policy(SecurityLevel::EncryptedChallenge, "secret");

        assert!(acceptable(&msg, &policy, &registry).is_ok());
        // The nonce was consumed; the identical message replays to a reject.
        assert!(matches!(
            acceptable(&msg, &policy, &registry),
            Err(RconError::MismatchedChallenge)
        ));
    }

    #[test]
    fn unissued_challenge_rejected() {
        let registry = ChallengeRegistry::new();
        let msg = Message::with_challenge(addr(), "map ffa", "secret", "deadbeef");
        let result = acceptable(
            &msg,
            &policy(SecurityLevel::EncryptedChallenge, "secret"),
            &registry,
        );
        assert!(matches!(result, Err(RconError::MismatchedChallenge)));
    }

    #[test]
    fn digest_compare_agrees_with_equality() {
        assert!(passwords_match("secret", "secret"));
        assert!(!passwords_match("secret", "secrets"));
        assert!(!passwords_match("", "secret"));
        assert!(passwords_match("", ""));
    }
}
