//! sockfile integration test harness.
//!
//! Each test starts its own in-process `sockfiled` sink on 127.0.0.1
//! with a fresh temporary output directory, then drives a blocking
//! `SocketFile` against it over real loopback TCP.
//!
//!   cargo test --test integration
//!
//! Nothing is shared between tests; the sink stops when its
//! `Listener` is dropped.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tokio::sync::{broadcast, mpsc};

use sockfiled::{NamingScheme, SessionReport, Sink};

mod bulk;

// ── Harness ───────────────────────────────────────────────────────────────────

/// How long a test waits for the sink to finish a session file.
pub const REPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// A running sink plus everything needed to observe it.
pub struct Listener {
    runtime: Runtime,
    dir: tempfile::TempDir,
    addr: SocketAddr,
    reports: mpsc::UnboundedReceiver<SessionReport>,
    shutdown: broadcast::Sender<()>,
}

impl Listener {
    pub fn start() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("failed to build runtime")?;
        let dir = tempfile::tempdir().context("failed to create output dir")?;

        let naming = NamingScheme::new(dir.path(), "it", "txt");
        let sink = runtime.block_on(Sink::bind("127.0.0.1:0".parse()?, naming))?;
        let addr = sink.local_addr()?;

        let (tx, reports) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = broadcast::channel(1);
        runtime.spawn(sink.report_to(tx).run(shutdown_rx));

        Ok(Self {
            runtime,
            dir,
            addr,
            reports,
            shutdown,
        })
    }

    pub fn ip(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Block until the sink reports the next finished session.
    pub fn next_report(&mut self) -> Result<SessionReport> {
        let reports = &mut self.reports;
        self.runtime
            .block_on(async { tokio::time::timeout(REPORT_TIMEOUT, reports.recv()).await })
            .context("timed out waiting for a session report")?
            .context("sink closed its report channel")
    }

    /// Next finished session's file contents.
    pub fn next_contents(&mut self) -> Result<Vec<u8>> {
        let report = self.next_report()?;
        let bytes = std::fs::read(&report.path)
            .with_context(|| format!("failed to read {}", report.path.display()))?;
        assert_eq!(bytes.len() as u64, report.bytes, "report and file disagree");
        Ok(bytes)
    }

    pub fn file_count(&self) -> usize {
        std::fs::read_dir(self.dir()).map(|d| d.count()).unwrap_or(0)
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.shutdown.send(());
    }
}

/// A loopback port with nothing listening on it.
pub fn closed_port() -> u16 {
    let probe = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe listener");
    let port = probe.local_addr().expect("probe address").port();
    drop(probe);
    port
}

/// `len` bytes of the repeating A..Z pattern.
pub fn alphabet(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'A' + (i % 26) as u8).collect()
}
