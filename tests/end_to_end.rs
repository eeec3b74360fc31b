#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Loopback tests driving the UDP server and client end to end, including
//! the challenge exchange.

use rcon_protocol::config::{ClientConfig, RconConfig};
use rcon_protocol::core::message::SecurityLevel;
use rcon_protocol::service::{RconClient, RconServer};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Spawn a server on a loopback port; returns its address, the stream of
/// executed commands, and the shutdown trigger.
async fn spawn_server(
    password: &str,
    min_level: SecurityLevel,
) -> (
    SocketAddr,
    mpsc::UnboundedReceiver<String>,
    mpsc::Sender<()>,
) {
    let password = password.to_string();
    let config = RconConfig::default_with_overrides(move |c| {
        c.server.address = "127.0.0.1:0".to_string();
        c.server.password = password;
        c.server.secure = min_level;
    });

    let server = RconServer::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();

    let (executed_tx, executed_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

    tokio::spawn(async move {
        server
            .run_with_shutdown(
                move |command: &str| {
                    let _ = executed_tx.send(command.to_string());
                },
                shutdown_rx,
            )
            .await
            .unwrap();
    });

    (addr, executed_rx, shutdown_tx)
}

fn client_config(addr: SocketAddr, password: &str, level: SecurityLevel) -> ClientConfig {
    ClientConfig {
        destination: addr.to_string(),
        password: password.to_string(),
        secure: level,
        response_timeout: Duration::from_secs(2),
    }
}

async fn recv_command(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for executed command")
        .expect("server handler dropped")
}

#[tokio::test]
async fn unencrypted_command_executes() {
    let (addr, mut executed, shutdown) =
        spawn_server("secret", SecurityLevel::Unencrypted).await;

    let mut client =
        RconClient::connect(client_config(addr, "secret", SecurityLevel::Unencrypted))
            .await
            .unwrap();
    client.send_command("status").await.unwrap();

    assert_eq!(recv_command(&mut executed).await, "status");
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn challenge_flow_executes_repeatedly() {
    let (addr, mut executed, shutdown) =
        spawn_server("secret", SecurityLevel::EncryptedChallenge).await;

    let mut client = RconClient::connect(client_config(
        addr,
        "secret",
        SecurityLevel::EncryptedChallenge,
    ))
    .await
    .unwrap();

    // Each submission runs its own getchallenge exchange, so consuming the
    // nonce on the first accept does not break the second.
    client.send_command("map ffa").await.unwrap();
    assert_eq!(recv_command(&mut executed).await, "map ffa");

    client.send_command("status").await.unwrap();
    assert_eq!(recv_command(&mut executed).await, "status");

    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn rejected_requests_never_execute() {
    let (addr, mut executed, shutdown) =
        spawn_server("secret", SecurityLevel::EncryptedPlain).await;

    // Wrong password at a sufficient level.
    let mut wrong_password =
        RconClient::connect(client_config(addr, "guessed", SecurityLevel::EncryptedPlain))
            .await
            .unwrap();
    wrong_password.send_command("kick everyone").await.unwrap();

    // Right password at an insufficient level.
    let mut weak_level =
        RconClient::connect(client_config(addr, "secret", SecurityLevel::Unencrypted))
            .await
            .unwrap();
    weak_level.send_command("kick everyone").await.unwrap();

    // An acceptable request afterwards; it must be the first one executed.
    let mut good =
        RconClient::connect(client_config(addr, "secret", SecurityLevel::EncryptedPlain))
            .await
            .unwrap();
    good.send_command("status").await.unwrap();

    assert_eq!(recv_command(&mut executed).await, "status");
    let _ = shutdown.send(()).await;
}

#[tokio::test]
async fn challenge_client_times_out_without_server() {
    // Nothing listening on this port; discard-adjacent loopback address.
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
    let mut config = client_config(addr, "secret", SecurityLevel::EncryptedChallenge);
    config.response_timeout = Duration::from_millis(200);

    let mut client = RconClient::connect(config).await.unwrap();
    let result = client.send_command("status").await;
    assert!(result.is_err());
}
