use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::executor::AdminCli;

/// Default HTTP port for the observer.
const DEFAULT_PORT: u16 = 4040;

const DEFAULT_VMQ_ADMIN_BIN: &str = "/vernemq/bin/vmq-admin";

/// Default per-call timeout in milliseconds (180 seconds)
const DEFAULT_TIMEOUT_MS: u64 = 180_000;

/// Startup configuration. Built once in `main` and handed down; nothing
/// reads the environment after this.
#[derive(Parser, Debug, Clone)]
#[command(name = "vernemq-observer")]
#[command(about = "Read-only HTTP view of a VerneMQ node via vmq-admin")]
pub struct Config {
    /// Bind address for the HTTP server.
    #[arg(long, default_value = "0.0.0.0", env = "OBSERVER_HOST")]
    pub host: String,

    /// HTTP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT, env = "OBSERVER_PORT")]
    pub port: u16,

    /// Path to the vmq-admin executable.
    #[arg(long, default_value = DEFAULT_VMQ_ADMIN_BIN, env = "VMQ_ADMIN_BIN")]
    pub vmq_admin_bin: PathBuf,

    /// Kill vmq-admin calls running longer than this many milliseconds. 0 waits forever.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS, env = "VMQ_ADMIN_TIMEOUT_MS")]
    pub timeout_ms: u64,
}

impl Config {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// The command runner every route shares
    pub fn admin(&self) -> AdminCli {
        AdminCli::new(&self.vmq_admin_bin, self.timeout())
    }
}
