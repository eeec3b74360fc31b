//! # Rcon Client Service
//!
//! Composes remote-console requests at the configured security level and
//! transmits them as single datagrams.
//!
//! For the challenge level the client first runs the freshness exchange:
//! `getchallenge` out, `challengeResponse <hex>` back (bounded by the
//! configured timeout), then the encrypted request carrying that nonce.

use crate::config::ClientConfig;
use crate::core::args::Args;
use crate::core::codec::{self, OobCodec};
use crate::core::message::{Message, SecurityLevel};
use crate::error::{RconError, Result};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tokio_util::udp::UdpFramed;
use tracing::{debug, instrument};

/// UDP client submitting remote-console commands.
pub struct RconClient {
    framed: UdpFramed<OobCodec>,
    destination: SocketAddr,
    config: ClientConfig,
}

impl RconClient {
    /// Resolve the configured destination and bind an ephemeral socket.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let destination: SocketAddr = config.destination.parse().map_err(|_| {
            RconError::ConfigError(format!(
                "Invalid client destination: '{}'",
                config.destination
            ))
        })?;

        let bind_addr = if destination.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;

        Ok(Self {
            framed: UdpFramed::new(socket, OobCodec),
            destination,
            config,
        })
    }

    /// Submit one command at the configured security level.
    #[instrument(skip(self, command))]
    pub async fn send_command(&mut self, command: &str) -> Result<()> {
        let message = match self.config.secure {
            SecurityLevel::Unencrypted | SecurityLevel::EncryptedPlain => Message::new(
                self.destination,
                self.config.secure,
                command,
                self.config.password.clone(),
            ),
            SecurityLevel::EncryptedChallenge => {
                let challenge = self.request_challenge().await?;
                Message::with_challenge(
                    self.destination,
                    command,
                    self.config.password.clone(),
                    challenge,
                )
            }
            SecurityLevel::Invalid => return Err(RconError::UnknownSecureProtocol),
        };

        self.send(&message).await
    }

    /// Transmit a caller-composed request as exactly one datagram.
    pub async fn send(&mut self, message: &Message) -> Result<()> {
        message.validate()?;
        let line = codec::encode(message)?;
        self.framed.send((line, message.remote)).await?;
        debug!(destination = %message.remote, level = ?message.level, "Sent rcon request");
        Ok(())
    }

    /// Run the freshness exchange and return the issued nonce.
    async fn request_challenge(&mut self) -> Result<String> {
        self.framed
            .send(("getchallenge".to_string(), self.destination))
            .await?;

        let destination = self.destination;
        let response_timeout = self.config.response_timeout;
        let wait = async {
            while let Some(frame) = self.framed.next().await {
                let (line, peer) = match frame {
                    Ok(frame) => frame,
                    Err(e) => {
                        debug!(error = %e, "Ignoring malformed frame");
                        continue;
                    }
                };

                // Anything not from the destination is noise.
                if peer != destination {
                    continue;
                }

                let args = Args::parse(&line);
                if args.get(0) == Some("challengeResponse") {
                    if let Some(challenge) = args.get(1) {
                        return Ok(challenge.to_string());
                    }
                }
            }

            Err(RconError::Timeout)
        };

        match timeout(response_timeout, wait).await {
            Ok(result) => result,
            Err(_) => Err(RconError::Timeout),
        }
    }
}
