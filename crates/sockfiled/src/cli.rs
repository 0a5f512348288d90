//! Command-line options. Each one overrides the `[listener]` config section.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use sockfile_core::config::ListenerConfig;

#[derive(Debug, Parser)]
#[command(name = "sockfiled")]
#[command(version)]
#[command(about = "Receive data via IP socket; creates a file for each connection, \
    with a timestamp in the file name")]
pub struct Cli {
    /// Directory for storing the files; defaults to the current directory
    #[arg(long)]
    pub path: Option<String>,

    /// Prefix of the file name; defaults to "via_socket"
    #[arg(long)]
    pub prefix: Option<String>,

    /// Extension for the file name; defaults to "txt"
    #[arg(long)]
    pub ext: Option<String>,

    /// Local IP to bind the listener to; defaults to 0.0.0.0
    #[arg(long = "bind-ip", alias = "bind_ip")]
    pub bind_ip: Option<IpAddr>,

    /// Local port to listen on (1024..65535); defaults to 65432
    #[arg(
        long = "bind-port",
        alias = "bind_port",
        value_parser = clap::value_parser!(u16).range(1024..)
    )]
    pub bind_port: Option<u16>,
}

impl Cli {
    pub fn apply(&self, config: &mut ListenerConfig) {
        if let Some(path) = &self.path {
            config.path = trim_separators(path);
        }
        if let Some(prefix) = &self.prefix {
            config.prefix = prefix.clone();
        }
        if let Some(ext) = &self.ext {
            config.ext = ext.clone();
        }
        if let Some(ip) = self.bind_ip {
            config.bind_ip = ip.to_string();
        }
        if let Some(port) = self.bind_port {
            config.bind_port = port;
        }
    }
}

/// Strip trailing `/` and `\`. A bare root is kept as given.
fn trim_separators(path: &str) -> PathBuf {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() {
        PathBuf::from(path)
    } else {
        PathBuf::from(trimmed)
    }
}
