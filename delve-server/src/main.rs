mod protocol;
mod registry;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use protocol::Connection;
use registry::Registry;

#[derive(Debug, Parser)]
#[command(name = "delve-server", version)]
#[command(about = "Line-delimited TCP lobby for Delve")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on (0 picks a free port)
    #[arg(long, default_value_t = 5000)]
    port: u16,

    /// Seats available before new players are turned away
    #[arg(long, default_value_t = 16)]
    max_players: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let listener = TcpListener::bind((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", args.host, args.port))?;
    let local = listener.local_addr()?;
    println!("Server start on {local}");
    let registry = Registry::new(args.max_players);
    log::info!("accepting up to {} players", registry.capacity());

    loop {
        let (stream, peer) = listener.accept().await?;
        log::debug!("connection from {peer}");
        let registry = registry.clone();
        tokio::spawn(async move {
            match handle_client(stream, &registry).await {
                Ok(end) => log::debug!("{peer} session ended: {end:?}"),
                Err(err) => log::warn!("{peer} session failed: {err:#}"),
            }
        });
    }
}

async fn handle_client(stream: TcpStream, registry: &Registry) -> Result<session::SessionEnd> {
    let (read_half, write_half) = stream.into_split();
    let mut conn = Connection::new(BufReader::new(read_half), write_half);
    session::run_session(&mut conn, registry)
        .await
        .context("client stream error")
}
