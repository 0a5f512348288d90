//! Output file naming and size reporting.
//!
//! One file per accepted connection:
//!   [dir/]{prefix}_{YYMMDD}_{HHMMSS}.{FFFF}[.{ext}]
//! where FFFF is the first four digits of the accept time's microseconds.

use std::path::PathBuf;

use chrono::{DateTime, Local, Timelike};
use sockfile_core::config::ListenerConfig;

#[derive(Debug, Clone)]
pub struct NamingScheme {
    dir: PathBuf,
    prefix: String,
    ext: String,
}

impl NamingScheme {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, ext: &str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            ext: ext.trim_start_matches('.').to_string(),
        }
    }

    pub fn from_config(config: &ListenerConfig) -> Self {
        Self::new(config.path.clone(), config.prefix.clone(), &config.ext)
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    /// Path for a session accepted at `at`. `attempt` > 0 adds a `-N`
    /// disambiguator for sessions accepted within the same 100µs.
    pub fn path_for(&self, at: DateTime<Local>, attempt: u32) -> PathBuf {
        let micros = at.nanosecond().min(999_999_999) / 1_000;
        let mut name = format!(
            "{}{}.{:04}",
            self.prefix,
            at.format("_%y%m%d_%H%M%S"),
            micros / 100
        );
        if attempt > 0 {
            name.push_str(&format!("-{attempt}"));
        }
        if !self.ext.is_empty() {
            name.push('.');
            name.push_str(&self.ext);
        }
        self.dir.join(name)
    }
}

/// Byte count with binary units, e.g. `"1.50 KB"`.
pub fn human_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes > GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes > MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes > KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
