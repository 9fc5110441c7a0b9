//! Fixed probe settings

use std::time::Duration;

/// Target probed by the binary
pub const DEFAULT_TARGET: &str = "https://localhost:8080";

/// Number of concurrent workers
pub const DEFAULT_WORKERS: usize = 10;

/// Delay between consecutive worker spawns
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(100);

/// Per-request read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Probe settings.
///
/// The binary always runs with [`ProbeConfig::default`]; nothing here is
/// exposed as a flag or environment variable.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub target: String,
    pub workers: usize,
    pub stagger: Duration,
    pub read_timeout: Duration,
    /// Skip TLS certificate and hostname verification (local self-signed target)
    pub accept_invalid_certs: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET.to_string(),
            workers: DEFAULT_WORKERS,
            stagger: DEFAULT_STAGGER,
            read_timeout: DEFAULT_READ_TIMEOUT,
            accept_invalid_certs: true,
        }
    }
}
