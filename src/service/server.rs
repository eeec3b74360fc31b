//! # Rcon Server Service
//!
//! Receive loop tying the codec, trust evaluation, and challenge registry to
//! a UDP socket.
//!
//! Each datagram yields one terminal accept-or-reject decision. Accepted
//! commands are handed to the caller's handler; rejection reasons go to the
//! server log and are never echoed back to the unauthenticated sender. The
//! only wire responses are `challengeResponse` replies to `getchallenge`.

use crate::config::RconConfig;
use crate::core::args::Args;
use crate::core::codec::{self, OobCodec};
use crate::error::Result;
use crate::protocol::challenge::ChallengeRegistry;
use crate::protocol::evaluate;
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio_util::udp::UdpFramed;
use tracing::{debug, info, instrument, warn};

/// UDP server evaluating remote-console requests.
pub struct RconServer {
    framed: UdpFramed<OobCodec>,
    config: RconConfig,
    registry: ChallengeRegistry,
}

impl RconServer {
    /// Bind the configured address and prepare the challenge registry.
    pub async fn bind(config: RconConfig) -> Result<Self> {
        let socket = UdpSocket::bind(config.server.address.as_str()).await?;
        info!(address = %config.server.address, "Listening for rcon datagrams");

        let registry = ChallengeRegistry::with_settings(
            config.server.challenge_ttl,
            config.server.max_challenges,
        );

        Ok(Self {
            framed: UdpFramed::new(socket, OobCodec),
            config,
            registry,
        })
    }

    /// Address the server actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.framed.get_ref().local_addr()?)
    }

    /// Serve until CTRL+C.
    pub async fn run<H>(self, handler: H) -> Result<()>
    where
        H: FnMut(&str) + Send,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Received CTRL+C signal, shutting down");
                let _ = shutdown_tx.send(()).await;
            }
        });

        self.run_with_shutdown(handler, shutdown_rx).await
    }

    /// Serve until the shutdown channel fires.
    #[instrument(skip(self, handler, shutdown_rx))]
    pub async fn run_with_shutdown<H>(
        mut self,
        mut handler: H,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> Result<()>
    where
        H: FnMut(&str) + Send,
    {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutting down rcon server");
                    break;
                }
                frame = self.framed.next() => {
                    match frame {
                        None => break,
                        Some(Ok((line, peer))) => {
                            // A reply failure is scoped to this datagram.
                            if let Err(e) = self.handle_datagram(line, peer, &mut handler).await {
                                warn!(remote = %peer, error = %e, "Failed handling datagram");
                            }
                        }
                        Some(Err(e)) => {
                            warn!(error = %e, "Dropping malformed datagram");
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle_datagram<H>(
        &mut self,
        line: String,
        peer: SocketAddr,
        handler: &mut H,
    ) -> Result<()>
    where
        H: FnMut(&str),
    {
        let args = Args::parse(&line);

        match args.get(0) {
            Some("getchallenge") => {
                let challenge = self.registry.issue(peer);
                self.framed
                    .send((format!("challengeResponse {challenge}"), peer))
                    .await?;
            }
            Some("rcon") | Some("srcon") => {
                // Policy is snapshotted per datagram; a config change applies
                // to the next one.
                let policy = self.config.policy();

                let decision = codec::decode(peer, &args, &policy).and_then(|message| {
                    evaluate::acceptable(&message, &policy, &self.registry)?;
                    Ok(message)
                });

                match decision {
                    Ok(message) => {
                        info!(remote = %peer, command = %message.command, "Executing rcon command");
                        handler(&message.command);
                    }
                    Err(reason) => {
                        // Server-side log only; the sender learns nothing.
                        warn!(remote = %peer, %reason, "Rejected rcon request");
                    }
                }
            }
            _ => {
                debug!(remote = %peer, "Ignoring unrelated datagram");
            }
        }

        Ok(())
    }
}
