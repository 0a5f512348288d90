//! Passive byte sink: every accepted connection becomes one file.
//!
//! Bytes are appended verbatim until the sender closes the connection.
//! A reset counts as end-of-stream: whatever arrived before it is kept.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bytes::BytesMut;
use chrono::Local;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};

use crate::naming::{human_bytes, NamingScheme};

const READ_CHUNK: usize = 4096;

/// Give up on a unique name after this many collisions.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// One finished session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub path: PathBuf,
    pub peer: SocketAddr,
    pub bytes: u64,
}

pub struct Sink {
    listener: TcpListener,
    naming: Arc<NamingScheme>,
    reports: Option<mpsc::UnboundedSender<SessionReport>>,
}

impl Sink {
    pub async fn bind(addr: SocketAddr, naming: NamingScheme) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))?;
        Ok(Self {
            listener,
            naming: Arc::new(naming),
            reports: None,
        })
    }

    /// Send a `SessionReport` to `tx` whenever a session file is complete.
    pub fn report_to(mut self, tx: mpsc::UnboundedSender<SessionReport>) -> Self {
        self.reports = Some(tx);
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("failed to read listener address")
    }

    /// Accept connections until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<()> {
        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("sink shutting down");
                    return Ok(());
                }

                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(a) => a,
                        Err(e) => {
                            tracing::warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    let naming = self.naming.clone();
                    let reports = self.reports.clone();
                    tokio::spawn(async move {
                        match receive_session(stream, peer, &naming).await {
                            Ok(report) => {
                                if let Some(tx) = reports {
                                    let _ = tx.send(report);
                                }
                            }
                            Err(e) => tracing::error!(%peer, error = %e, "session failed"),
                        }
                    });
                }
            }
        }
    }
}

/// Store everything `stream` delivers in a freshly named file.
pub async fn receive_session(
    mut stream: TcpStream,
    peer: SocketAddr,
    naming: &NamingScheme,
) -> Result<SessionReport> {
    let (mut file, path) = create_session_file(naming).await?;
    tracing::info!(%peer, path = %path.display(), "got connection");

    let mut buf = BytesMut::with_capacity(READ_CHUNK);
    let mut total: u64 = 0;

    loop {
        buf.clear();
        match stream.read_buf(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                file.write_all(&buf)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                total += n as u64;
                tracing::trace!(%peer, bytes = n, "data received");
            }
            Err(e) if e.kind() == io::ErrorKind::ConnectionReset => {
                tracing::debug!(%peer, "connection reset by peer");
                break;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read from {peer}"));
            }
        }
    }

    file.flush()
        .await
        .with_context(|| format!("failed to flush {}", path.display()))?;

    tracing::info!(
        %peer,
        path = %path.display(),
        bytes = total,
        "received total: {}",
        human_bytes(total)
    );

    Ok(SessionReport {
        path,
        peer,
        bytes: total,
    })
}

async fn create_session_file(naming: &NamingScheme) -> Result<(File, PathBuf)> {
    let accepted_at = Local::now();
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = naming.path_for(accepted_at, attempt);
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("unable to open file '{}'", path.display()));
            }
        }
    }
    bail!(
        "no free file name in {} after {MAX_NAME_ATTEMPTS} attempts",
        naming.dir().display()
    )
}
