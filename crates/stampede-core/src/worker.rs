//! Worker loop: one blocking GET after another until shutdown

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::client::Fetch;
use crate::error::ProbeError;
use crate::shutdown::Shutdown;

/// Per-worker identity and private request counter
#[derive(Debug)]
pub struct WorkerContext {
    thread_id: usize,
    request_count: u64,
}

impl WorkerContext {
    pub fn new(thread_id: usize) -> Self {
        Self {
            thread_id,
            request_count: 0,
        }
    }

    pub fn thread_id(&self) -> usize {
        self.thread_id
    }

    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Claim the next sequence number (1-based, gap-free)
    fn next_request(&mut self) -> u64 {
        self.request_count += 1;
        self.request_count
    }
}

/// One request and its classified outcome
#[derive(Debug)]
pub struct Attempt {
    pub thread_id: usize,
    pub seq: u64,
    pub result: Result<u16, ProbeError>,
}

impl std::fmt::Display for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (id, seq) = (self.thread_id, self.seq);
        match &self.result {
            Ok(status) => write!(f, "[Thread {id}] Request #{seq} - Status: {status}"),
            Err(e) if e.is_transport() => write!(
                f,
                "[Thread {id}] HTTP error on request #{seq}: {} - {e}",
                e.category()
            ),
            Err(e) => write!(
                f,
                "[Thread {id}] Error on request #{seq}: {} - {e}",
                e.category()
            ),
        }
    }
}

impl Attempt {
    /// Emit the per-request log line
    pub fn log(&self) {
        log::info!("{self}");
    }
}

/// How a worker ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Observed shutdown and exited normally
    Completed,
    /// A panic escaped the loop body
    Fatal(String),
}

/// Result of one worker, collected by the orchestrator
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub thread_id: usize,
    pub requests: u64,
    pub outcome: WorkerOutcome,
}

impl WorkerReport {
    pub fn is_fatal(&self) -> bool {
        matches!(self.outcome, WorkerOutcome::Fatal(_))
    }
}

/// The worker's closing line
impl std::fmt::Display for WorkerReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.thread_id;
        match &self.outcome {
            WorkerOutcome::Completed => {
                write!(f, "[Thread {id}] Shutting down after {} requests", self.requests)
            }
            WorkerOutcome::Fatal(message) => write!(
                f,
                "[Thread {id}] Fatal error: panic - {message} (stopped after {} requests)",
                self.requests
            ),
        }
    }
}

/// Issue requests to `target` until `shutdown` is requested.
///
/// The flag is checked only between requests: an in-flight request always
/// completes. A panic inside one request becomes a [`ProbeError::Runtime`]
/// for that attempt and the loop goes on. `observe` sees every attempt,
/// failures included.
pub fn worker_loop<F: Fetch + ?Sized>(
    ctx: &mut WorkerContext,
    client: &F,
    shutdown: &Shutdown,
    target: &str,
    mut observe: impl FnMut(&Attempt),
) {
    while !shutdown.is_requested() {
        let seq = ctx.next_request();
        let result = panic::catch_unwind(AssertUnwindSafe(|| client.get(target)))
            .unwrap_or_else(|payload| Err(ProbeError::Runtime(panic_message(payload.as_ref()))));
        observe(&Attempt {
            thread_id: ctx.thread_id,
            seq,
            result,
        });
    }
}

/// Run one worker with logging and a fatal-error boundary.
///
/// A panic escaping the loop body ends only this worker; it is reported as
/// [`WorkerOutcome::Fatal`] instead of unwinding into the caller. The panic
/// hook installed by [`crate::logging::install_panic_hook`] carries the
/// backtrace.
pub fn run_worker<F: Fetch + ?Sized>(
    thread_id: usize,
    client: &F,
    shutdown: &Shutdown,
    target: &str,
) -> WorkerReport {
    run_worker_with(thread_id, client, shutdown, target, Attempt::log)
}

fn run_worker_with<F: Fetch + ?Sized>(
    thread_id: usize,
    client: &F,
    shutdown: &Shutdown,
    target: &str,
    observe: impl FnMut(&Attempt),
) -> WorkerReport {
    log::info!("[Thread {thread_id}] Starting worker thread");
    let mut ctx = WorkerContext::new(thread_id);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        worker_loop(&mut ctx, client, shutdown, target, observe)
    }));

    let outcome = match result {
        Ok(()) => WorkerOutcome::Completed,
        Err(payload) => WorkerOutcome::Fatal(panic_message(payload.as_ref())),
    };
    let report = WorkerReport {
        thread_id,
        requests: ctx.request_count(),
        outcome,
    };

    if report.is_fatal() {
        log::error!("{report}");
    } else {
        log::info!("{report}");
    }
    report
}

/// Extract the message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
