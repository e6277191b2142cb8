//! Gomoku relay server binary
//!
//! Binds the room-based matchmaking server and runs its event loop.

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use omok::protocol::DEFAULT_PORT;
use omok::server::Server;

#[derive(Debug, Parser)]
#[command(name = "omok-server", about = "Room-based Gomoku relay server")]
struct Args {
    /// Listen port
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let server = Server::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    server.run().await
}
