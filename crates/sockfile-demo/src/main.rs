//! sockfile-demo: writes three files on a running sockfiled.
//!
//!   1. two lines, an explicit flush, a third line sent on drop
//!   2. mixed values through `Append`, on an adapter opened after creation
//!   3. bulk transfer of a repeating A..Z buffer on the reopened adapter

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sockfile_core::config::{ClientConfig, SockfileConfig};
use sockfile_core::{Append, SocketFile};

/// Size of the buffer handed to one `write_bytes` call in the bulk session.
const BULK_BUFFER_SIZE: usize = 26 * 1000;

/// Pause between sessions so the listener can finish the previous file.
const SESSION_GAP: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(name = "sockfile-demo", version)]
#[command(about = "Send demo files to a sockfiled listener")]
struct Cli {
    /// Listener address in numeric format (e.g. 192.168.44.44)
    server_addr: Option<String>,

    /// Listener port
    #[arg(long)]
    port: Option<u16>,

    /// How many times the bulk buffer is sent
    #[arg(long, default_value_t = 1000)]
    buffer_count: usize,

    /// Delay before retrying the first connection
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Give up on one connection attempt after this long (0 = platform default)
    #[arg(long)]
    connect_timeout_ms: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = SockfileConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        SockfileConfig::default()
    });

    let addr = cli
        .server_addr
        .clone()
        .unwrap_or_else(|| config.client.server_addr.clone());
    if addr.is_empty() {
        bail!(
            "no server address provided; \
             give an IP address in numerical format (e.g. 192.168.44.44)"
        );
    }
    let port = cli.port.unwrap_or(config.client.server_port);
    let retry_delay =
        Duration::from_millis(cli.retry_delay_ms.unwrap_or(config.client.retry_delay_ms));

    if let Some(ms) = cli.connect_timeout_ms {
        config.client.connect_timeout_ms = ms;
    }
    let client = &config.client;

    hello_world(client, &addr, port, retry_delay)?;
    tracing::info!("\"Hello world\" sent");
    thread::sleep(SESSION_GAP);

    let mut f = SocketFile::with_connector(client.connector(), client.capacity());
    f.open(&addr, port).context("error on opening the socket")?;
    f.append('1')?.append("23456")?.append(78)?;
    f.close();
    tracing::info!("\"12345678\" sent");
    thread::sleep(SESSION_GAP);

    f.open(&addr, port).context("error on opening the socket")?;
    bulk(&mut f, cli.buffer_count)?;
    f.close();
    tracing::info!("buffer sent, all done");

    Ok(())
}

/// First session. Retries until the listener is reachable; a malformed
/// address ends the demo instead.
fn hello_world(client: &ClientConfig, addr: &str, port: u16, retry_delay: Duration) -> Result<()> {
    loop {
        tracing::info!(addr, port, "opening socket");
        let mut f = SocketFile::with_connector(client.connector(), client.capacity());
        match f.open(addr, port) {
            Ok(()) => {
                // '\n' alone does not flush; the first two lines share a chunk.
                f.append("Hello world!\n")?;
                f.append("I'm here.\n")?;
                f.sync()?;
                f.append("It worked.\n")?;
                // drop flushes "It worked.\n" and closes the connection
                return Ok(());
            }
            Err(e) if !e.is_retryable() => {
                return Err(e).context("error on opening the socket");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    delay_ms = retry_delay.as_millis() as u64,
                    "open failed, retrying"
                );
                thread::sleep(retry_delay);
            }
        }
    }
}

fn bulk(f: &mut SocketFile, count: usize) -> Result<()> {
    let buffer: Vec<u8> = (0..BULK_BUFFER_SIZE).map(|i| b'A' + (i % 26) as u8).collect();

    let started = Instant::now();
    for i in 0..count {
        let accepted = f.write_bytes(&buffer);
        if accepted != buffer.len() {
            bail!("bulk write {i} failed after {accepted} of {} bytes", buffer.len());
        }
    }
    f.sync().context("final flush failed")?;

    let elapsed = started.elapsed().as_secs_f64();
    let total = (count * BULK_BUFFER_SIZE) as f64;
    let mbps = if elapsed > 0.0 {
        total * 8.0 / elapsed / 1_000_000.0
    } else {
        0.0
    };
    tracing::info!(
        bytes = count * BULK_BUFFER_SIZE,
        transmissions = f.stats().transmissions,
        elapsed_ms = (elapsed * 1000.0) as u64,
        mbps = %format!("{mbps:.1}"),
        "bulk transfer done"
    );
    Ok(())
}
