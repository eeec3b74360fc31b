//! # Core Protocol Components
//!
//! Message model, tokenization, and wire codec.
//!
//! ## Components
//! - **Message**: the value type for one remote-console request
//! - **Args**: command-line tokenizer and word re-quoting
//! - **Codec**: connectionless-packet framing plus decode/encode between
//!   tokens and Messages
//!
//! ## Wire Format
//! ```text
//! [0xFF 0xFF 0xFF 0xFF] [text payload]
//! ```
//!
//! ## Security
//! - Decode never panics; every failure is a reason-carrying error value
//! - Cryptographic failures collapse to one generic reason (no oracle)
//! - Encrypted payloads are AEAD-sealed; tampering fails the open

pub mod args;
pub mod codec;
pub mod message;
