//! # Services
//!
//! UDP-facing server and client built on the protocol core.

pub mod client;
pub mod server;

pub use client::RconClient;
pub use server::RconServer;
