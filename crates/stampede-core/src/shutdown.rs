//! Graceful shutdown support via atomic flag

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

/// Exit status when a second termination signal forces the process down
pub const FORCED_EXIT_CODE: i32 = 130;

/// Shared shutdown flag: set once by the signal listener, read by every worker.
///
/// Cloning shares the same flag. Once requested it never resets.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Idempotent; returns `true` if it was already requested.
    pub fn request(&self) -> bool {
        self.flag.swap(true, Ordering::Relaxed)
    }

    /// Check if shutdown was requested
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Forward SIGINT/SIGTERM to `shutdown` from a dedicated listener thread.
///
/// First signal: request graceful shutdown.
/// Second signal: force exit with [`FORCED_EXIT_CODE`].
pub fn install_signal_handlers(shutdown: &Shutdown) -> Result<JoinHandle<()>> {
    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;
    let shutdown = shutdown.clone();

    std::thread::Builder::new()
        .name("signal-listener".into())
        .spawn(move || {
            for signal in signals.forever() {
                let name = signal_name(signal);
                if shutdown.request() {
                    log::warn!("Received second {name}, forcing shutdown");
                    log::logger().flush();
                    std::process::exit(FORCED_EXIT_CODE);
                }
                log::info!("\nReceived {name}, initiating clean shutdown...");
            }
        })
        .context("Failed to spawn signal listener")
}

fn signal_name(signal: i32) -> &'static str {
    match signal {
        SIGINT => "SIGINT (Ctrl-C)",
        SIGTERM => "SIGTERM",
        _ => "signal",
    }
}
