//! # rcon-protocol
//!
//! Secure remote-console protocol core for network services.
//!
//! A remote operator submits a one-line command over UDP; the receiving
//! server decides — cheaply, without per-client session state beyond a
//! short-lived nonce — whether to execute it. The crate provides the message
//! model, the wire codec, and the two-stage trust decision, plus the UDP
//! services, challenge registry, crypto provider, and configuration stack
//! around them.
//!
//! ## Trust Decision
//! Every inbound datagram passes through exactly two gates:
//! 1. **Structural** ([`core::message::Message::validate`]): is this a
//!    syntactically complete request?
//! 2. **Policy** ([`protocol::evaluate::acceptable`]): is it strong and
//!    authentic enough right now, given the configured minimum security
//!    level, the shared secret, and the anti-replay registry?
//!
//! Failures are values, never panics; each carries the reason logged
//! server-side. Nothing is ever reported back to the unauthenticated sender.
//!
//! ## Security Levels
//! - `Unencrypted` — `rcon <password> <command>` in cleartext
//! - `EncryptedPlain` — command sealed under a key derived from the password
//! - `EncryptedChallenge` — sealed and bound to a server-issued one-shot
//!   nonce, defeating replay of captured datagrams
//!
//! A server-configured minimum level rejects downgrade attempts outright.
//!
//! ## Example
//! ```no_run
//! use rcon_protocol::config::RconConfig;
//! use rcon_protocol::service::RconServer;
//!
//! #[tokio::main]
//! async fn main() -> rcon_protocol::error::Result<()> {
//!     let config = RconConfig::default_with_overrides(|c| {
//!         c.server.password = "secret".to_string();
//!     });
//!
//!     let server = RconServer::bind(config).await?;
//!     server.run(|command| println!("execute: {command}")).await
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod utils;

pub use crate::config::{Policy, RconConfig};
pub use crate::core::message::{Message, SecurityLevel};
pub use crate::error::{RconError, Result};
pub use crate::protocol::ChallengeRegistry;
