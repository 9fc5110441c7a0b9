//! Orchestration: spawn staggered workers, wait for all of them

use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Context;

use crate::client::{Fetch, HttpClient};
use crate::config::ProbeConfig;
use crate::shutdown::Shutdown;
use crate::worker::{WorkerOutcome, WorkerReport, panic_message, run_worker};

/// Run the probe until `shutdown` is requested and every worker has joined.
///
/// The shared client is built before the first worker starts and dropped
/// after the last one joins.
pub fn run(config: &ProbeConfig, shutdown: &Shutdown) -> anyhow::Result<Vec<WorkerReport>> {
    log_banner(config);

    let client = HttpClient::new(config)?;
    log::debug!(
        "HTTP client ready (read timeout {}ms, stagger {}ms)",
        client.read_timeout().as_millis(),
        config.stagger.as_millis()
    );

    let reports = run_with_client(config, Arc::new(client), shutdown)?;

    log::info!("\nAll threads have shut down cleanly. Exiting.");
    Ok(reports)
}

/// Spawn `config.workers` workers over `client` and join them all.
///
/// Workers start `config.stagger` apart; once shutdown is requested the
/// remaining workers are started without delay and exit immediately.
pub fn run_with_client<F: Fetch + 'static>(
    config: &ProbeConfig,
    client: Arc<F>,
    shutdown: &Shutdown,
) -> anyhow::Result<Vec<WorkerReport>> {
    let mut handles = Vec::with_capacity(config.workers);

    for thread_id in 1..=config.workers {
        match spawn_worker(thread_id, &client, shutdown, &config.target) {
            Ok(handle) => handles.push((thread_id, handle)),
            Err(e) => {
                log::error!("Failed to spawn worker {thread_id}: {e}");
                shutdown.request();
                join_all(handles);
                return Err(e).with_context(|| format!("Failed to spawn worker {thread_id}"));
            }
        }

        if thread_id < config.workers && !shutdown.is_requested() {
            std::thread::sleep(config.stagger);
        }
    }

    Ok(join_all(handles))
}

fn spawn_worker<F: Fetch + 'static>(
    thread_id: usize,
    client: &Arc<F>,
    shutdown: &Shutdown,
    target: &str,
) -> std::io::Result<JoinHandle<WorkerReport>> {
    let client = Arc::clone(client);
    let shutdown = shutdown.clone();
    let target = target.to_string();

    std::thread::Builder::new()
        .name(format!("worker-{thread_id}"))
        .spawn(move || run_worker(thread_id, client.as_ref(), &shutdown, &target))
}

/// Join every worker. A thread that died outside the worker's own
/// boundary is reported as fatal with an unknown request count.
fn join_all(handles: Vec<(usize, JoinHandle<WorkerReport>)>) -> Vec<WorkerReport> {
    handles
        .into_iter()
        .map(|(thread_id, handle)| match handle.join() {
            Ok(report) => report,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("[Thread {thread_id}] Worker thread panicked: {message}");
                WorkerReport {
                    thread_id,
                    requests: 0,
                    outcome: WorkerOutcome::Fatal(message),
                }
            }
        })
        .collect()
}

fn log_banner(config: &ProbeConfig) {
    log::info!("Starting multi-threaded HTTP worker");
    log::info!("Target: {}", config.target);
    log::info!("Threads: {}", config.workers);
    log::info!("Press Ctrl-C to initiate shutdown, and again to force it\n");
}
