//! stampede - concurrent HTTP probe
//!
//! Ten worker threads GET a fixed local target in a hot loop until
//! Ctrl-C/SIGTERM. A second signal forces exit.

use anyhow::Result;
use clap::Parser;

use stampede_core::{ProbeConfig, Shutdown};

#[derive(Parser)]
#[command(name = "stampede")]
#[command(about = "Concurrent HTTP probe against a fixed local target")]
#[command(version)]
struct Cli {
    /// Also print debug lines
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    stampede_core::init_logging(cli.debug)?;
    stampede_core::install_panic_hook();

    let shutdown = Shutdown::new();
    let _listener = stampede_core::install_signal_handlers(&shutdown)?;

    let reports = stampede_core::run(&ProbeConfig::default(), &shutdown)?;

    let fatal = reports.iter().filter(|r| r.is_fatal()).count();
    if fatal > 0 {
        log::debug!("{fatal} worker(s) ended early on a fatal error");
    }
    Ok(())
}
