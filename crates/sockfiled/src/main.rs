//! sockfiled: receive files over TCP.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use sockfile_core::config::SockfileConfig;
use sockfiled::{NamingScheme, Sink};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    if let Err(e) = SockfileConfig::write_default_if_missing(&SockfileConfig::file_path()) {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = SockfileConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        SockfileConfig::default()
    });
    let mut listener = config.listener;
    cli.apply(&mut listener);

    let bind_ip: IpAddr = listener
        .bind_ip
        .parse()
        .with_context(|| format!("invalid bind address '{}'", listener.bind_ip))?;
    let bind = SocketAddr::new(bind_ip, listener.bind_port);
    let naming = NamingScheme::from_config(&listener);

    let sink = Sink::bind(bind, naming).await?;
    tracing::info!(
        addr = %sink.local_addr()?,
        path = %listener.path.display(),
        "waiting for connection (press Ctrl+C to terminate)"
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("execution interrupted by the user");
        let _ = shutdown_tx.send(());
    });

    sink.run(shutdown_rx).await
}
