//! Stampede Core - concurrent HTTP probing
//!
//! A fixed pool of blocking worker threads hammers one target over a shared
//! connection pool, logging every request, until shutdown is requested.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod shutdown;
pub mod worker;

// Re-exports for convenience
pub use client::{Fetch, HttpClient};
pub use config::ProbeConfig;
pub use error::ProbeError;
pub use logging::{init_logging, install_panic_hook};
pub use runner::{run, run_with_client};
pub use shutdown::{Shutdown, install_signal_handlers};
pub use worker::{Attempt, WorkerContext, WorkerOutcome, WorkerReport, run_worker, worker_loop};
