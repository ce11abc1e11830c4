//! Runtime configuration
//!
//! Built once from the command line and shared read-only afterwards.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Default listen port
pub const DEFAULT_PORT: u16 = 1080;

/// Default folder to serve
pub const DEFAULT_FOLDER: &str = "public";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// TCP port to listen on
    pub port: u16,
    /// Root directory served
    pub root: PathBuf,
    /// Suppress per-request log lines
    pub silent: bool,
    /// Serve over TLS with a generated self-signed certificate
    pub https: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            root: PathBuf::from(DEFAULT_FOLDER),
            silent: false,
            https: false,
        }
    }
}

impl ServeConfig {
    /// URL scheme matching the transport
    pub fn scheme(&self) -> &'static str {
        if self.https { "https" } else { "http" }
    }

    /// Address the listener binds to (all interfaces)
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
