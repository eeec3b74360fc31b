//! # Protocol Logic
//!
//! Trust evaluation and the anti-replay challenge registry.
//!
//! ## Components
//! - **Evaluate**: the policy gate deciding execute-or-reject
//! - **Challenge**: per-address one-shot nonce issuance and matching

pub mod challenge;
pub mod evaluate;

pub use challenge::ChallengeRegistry;
