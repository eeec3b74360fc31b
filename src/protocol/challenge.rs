//! # Challenge Registry
//!
//! Per-address one-shot nonce store backing the `EncryptedChallenge` level.
//!
//! Each remote address holds at most one outstanding challenge. A challenge
//! is matched and invalidated at most once: racing consumers for the same
//! address are serialized by the interior lock, so a replayed datagram can
//! never be accepted twice. Entries expire after a TTL and total count is
//! bounded with O(1) FIFO eviction to prevent unbounded growth.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::RngCore;
use tracing::{debug, warn};

/// Bytes of entropy per challenge; rendered as lowercase hex.
const CHALLENGE_BYTES: usize = 12;

#[derive(Debug)]
struct IssuedChallenge {
    challenge: String,
    issued_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<SocketAddr, IssuedChallenge>,
    insertion_order: VecDeque<SocketAddr>,
}

/// One-shot challenge store keyed by remote address.
#[derive(Debug)]
pub struct ChallengeRegistry {
    inner: Mutex<Inner>,
    ttl: Duration,
    max_entries: usize,
}

impl ChallengeRegistry {
    /// Default TTL: 60 seconds. Default capacity: 10,000 addresses.
    pub fn new() -> Self {
        Self::with_settings(Duration::from_secs(60), 10_000)
    }

    pub fn with_settings(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl,
            max_entries,
        }
    }

    /// Issue a fresh challenge for an address, replacing any outstanding one.
    pub fn issue(&self, remote: SocketAddr) -> String {
        let challenge = random_hex();

        let mut inner = self.lock();
        Self::cleanup_expired(&mut inner, self.ttl);

        if inner.entries.len() >= self.max_entries && !inner.entries.contains_key(&remote) {
            Self::evict_oldest(&mut inner);
        }

        // One outstanding challenge per address.
        inner.insertion_order.retain(|addr| addr != &remote);
        inner.insertion_order.push_back(remote);
        inner.entries.insert(
            remote,
            IssuedChallenge {
                challenge: challenge.clone(),
                issued_at: Instant::now(),
            },
        );

        debug!(%remote, "Issued challenge");
        challenge
    }

    /// Match a presented challenge against the one issued for this address.
    ///
    /// A successful match consumes the stored nonce, so an identical replay
    /// fails. A failed guess does not consume it: an attacker must not be
    /// able to invalidate an operator's outstanding challenge.
    pub fn match_and_consume(&self, remote: SocketAddr, challenge: &str) -> bool {
        let mut inner = self.lock();
        Self::cleanup_expired(&mut inner, self.ttl);

        let matched = inner
            .entries
            .get(&remote)
            .is_some_and(|issued| issued.challenge == challenge);

        if matched {
            inner.entries.remove(&remote);
            inner.insertion_order.retain(|addr| addr != &remote);
            debug!(%remote, "Challenge matched and consumed");
        } else {
            warn!(%remote, "Challenge mismatch");
        }

        matched
    }

    /// Current number of outstanding challenges.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every outstanding challenge.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.insertion_order.clear();
        debug!("Challenge registry cleared");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means another thread panicked mid-update;
        // the map itself is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cleanup_expired(inner: &mut Inner, ttl: Duration) {
        let now = Instant::now();
        let before = inner.entries.len();

        inner
            .entries
            .retain(|_, issued| now.duration_since(issued.issued_at) < ttl);

        while let Some(addr) = inner.insertion_order.front() {
            if !inner.entries.contains_key(addr) {
                inner.insertion_order.pop_front();
            } else {
                break;
            }
        }

        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!("Expired {} challenge entries", removed);
        }
    }

    fn evict_oldest(inner: &mut Inner) {
        if let Some(addr) = inner.insertion_order.pop_front() {
            inner.entries.remove(&addr);
            debug!(%addr, "Evicted oldest challenge at capacity");
        }
    }
}

impl Default for ChallengeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn random_hex() -> String {
    let mut bytes = [0u8; CHALLENGE_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::thread;

    fn addr(port: u16) -> SocketAddr {
        format!("127.0.0.1:{port}").parse().unwrap()
    }

    #[test]
    fn issued_challenge_matches_once() {
        let registry = ChallengeRegistry::new();
        let challenge = registry.issue(addr(1000));

        assert!(registry.match_and_consume(addr(1000), &challenge));
        // Consumed; the identical replay must fail.
        assert!(!registry.match_and_consume(addr(1000), &challenge));
    }

    #[test]
    fn wrong_challenge_does_not_consume() {
        let registry = ChallengeRegistry::new();
        let challenge = registry.issue(addr(1001));

        assert!(!registry.match_and_consume(addr(1001), "bogus"));
        assert!(registry.match_and_consume(addr(1001), &challenge));
    }

    #[test]
    fn challenge_is_bound_to_address() {
        let registry = ChallengeRegistry::new();
        let challenge = registry.issue(addr(1002));

        assert!(!registry.match_and_consume(addr(1003), &challenge));
        assert!(registry.match_and_consume(addr(1002), &challenge));
    }

    #[test]
    fn reissue_replaces_outstanding_challenge() {
        let registry = ChallengeRegistry::new();
        let old = registry.issue(addr(1004));
        let new = registry.issue(addr(1004));

        assert!(!registry.match_and_consume(addr(1004), &old));
        assert!(registry.match_and_consume(addr(1004), &new));
    }

    #[test]
    fn expired_challenge_no_longer_matches() {
        let registry = ChallengeRegistry::with_settings(Duration::from_millis(10), 100);
        let challenge = registry.issue(addr(1005));

        thread::sleep(Duration::from_millis(20));
        assert!(!registry.match_and_consume(addr(1005), &challenge));
    }

    #[test]
    fn capacity_evicts_oldest_address() {
        let registry = ChallengeRegistry::with_settings(Duration::from_secs(60), 3);
        let first = registry.issue(addr(2000));
        for port in 2001..2004 {
            registry.issue(addr(port));
        }

        assert!(registry.len() <= 3);
        assert!(!registry.match_and_consume(addr(2000), &first));
    }

    #[test]
    fn challenges_are_unique_hex() {
        let registry = ChallengeRegistry::new();
        let a = registry.issue(addr(3000));
        let b = registry.issue(addr(3001));

        assert_ne!(a, b);
        assert_eq!(a.len(), CHALLENGE_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
