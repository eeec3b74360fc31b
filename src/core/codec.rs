//! # Protocol Codec
//!
//! Wire framing for connectionless packets and the decode/encode paths that
//! turn tokens into a [`Message`] and back.
//!
//! ## Wire Format
//! ```text
//! [0xFF 0xFF 0xFF 0xFF] [text payload]
//!
//! rcon  <password> <command...>
//! srcon <METHOD> <base64(nonce || ciphertext)>     METHOD ∈ {PLAIN, CHALLENGE}
//! ```
//!
//! `decode` never panics: every failure path is an [`RconError`] carrying the
//! exact reason callers log before dropping the datagram.

use crate::config::Policy;
use crate::core::args::Args;
use crate::core::message::{Message, SecurityLevel};
use crate::error::{RconError, Result};
use crate::utils::crypto::{base64_decode, base64_encode, Crypto};
use bytes::{BufMut, BytesMut};
use std::net::SocketAddr;
use tokio_util::codec::{Decoder, Encoder};

/// Marker prefix of a connectionless packet.
pub const OOB_PREFIX: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Frames datagrams as `prefix || text`, one frame per datagram.
pub struct OobCodec;

impl Decoder for OobCodec {
    type Item = String;
    type Error = RconError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if src.is_empty() {
            return Ok(None);
        }

        // A datagram is one frame; consume it whole.
        let frame = src.split_to(src.len());

        if frame.len() < OOB_PREFIX.len() || frame[..OOB_PREFIX.len()] != OOB_PREFIX {
            return Err(RconError::InvalidHeader);
        }

        let text = String::from_utf8_lossy(&frame[OOB_PREFIX.len()..]);
        Ok(Some(text.trim_end_matches(['\n', '\0']).to_string()))
    }
}

impl Encoder<String> for OobCodec {
    type Error = RconError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(OOB_PREFIX.len() + item.len());
        dst.put_slice(&OOB_PREFIX);
        dst.put_slice(item.as_bytes());
        Ok(())
    }
}

/// Decode inbound tokens into a [`Message`].
///
/// The sender address comes from the transport envelope and is attached here
/// so later evaluation can look up the issued challenge. For encrypted forms,
/// successful decryption under the server's own derived key is the
/// authentication proof; the configured password is substituted into the
/// Message so downstream validation has one uniform credential check for
/// every level.
pub fn decode(remote: SocketAddr, args: &Args, policy: &Policy) -> Result<Message> {
    let (Some(keyword), Some(second), Some(third)) = (args.get(0), args.get(1), args.get(2))
    else {
        return Err(RconError::InvalidCommand);
    };

    if keyword != "rcon" && keyword != "srcon" {
        return Err(RconError::InvalidCommand);
    }

    if policy.password.is_empty() {
        // Nothing to check requests against.
        return Err(RconError::PasswordUnset);
    }

    if keyword == "rcon" {
        return Ok(Message::new(
            remote,
            SecurityLevel::Unencrypted,
            args.escaped_from(2),
            second,
        ));
    }

    let payload = base64_decode(third)?;
    let crypto = Crypto::from_password(&policy.password);
    let plaintext =
        String::from_utf8(crypto.open(&payload)?).map_err(|_| RconError::DecryptionFailed)?;

    match second {
        "CHALLENGE" => {
            let (challenge, command) = match plaintext.split_once(char::is_whitespace) {
                Some((challenge, rest)) => (challenge.to_string(), rest.trim_start().to_string()),
                None => (plaintext, String::new()),
            };
            Ok(Message::with_challenge(
                remote,
                command,
                policy.password.clone(),
                challenge,
            ))
        }
        "PLAIN" => Ok(Message::new(
            remote,
            SecurityLevel::EncryptedPlain,
            plaintext,
            policy.password.clone(),
        )),
        // Keep the command so the structural check reports the specific
        // reason instead of a generic parse error.
        _ => Ok(Message::new(
            remote,
            SecurityLevel::Invalid,
            plaintext,
            policy.password.clone(),
        )),
    }
}

/// Serialize an outbound [`Message`] into its wire line.
pub fn encode(message: &Message) -> Result<String> {
    match message.level {
        SecurityLevel::Unencrypted => {
            Ok(format!("rcon {} {}", message.password, message.command))
        }
        SecurityLevel::EncryptedPlain | SecurityLevel::EncryptedChallenge => {
            let plaintext = if message.level == SecurityLevel::EncryptedChallenge {
                format!("{} {}", message.challenge, message.command)
            } else {
                message.command.clone()
            };

            let method = match message.level {
                SecurityLevel::EncryptedChallenge => "CHALLENGE",
                _ => "PLAIN",
            };

            let sealed = Crypto::from_password(&message.password).seal(plaintext.as_bytes())?;
            Ok(format!("srcon {} {}", method, base64_encode(&sealed)))
        }
        SecurityLevel::Invalid => Err(RconError::UnknownSecureProtocol),
    }
}
