//! Mock targets and client wrappers shared by the integration tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use stampede_core::{Fetch, HttpClient, ProbeError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A mock HTTP target living on its own runtime; stops when dropped.
pub struct MockTarget {
    pub url: String,
    _runtime: tokio::runtime::Runtime,
}

/// Start a target that answers every request with `status` after `delay`.
pub fn start_mock_target(status: u16, delay: Duration) -> MockTarget {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap();
    let listener = runtime
        .block_on(TcpListener::bind("127.0.0.1:0"))
        .unwrap();
    let addr = listener.local_addr().unwrap();

    runtime.spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                tokio::time::sleep(delay).await;
                let response = format!(
                    "HTTP/1.1 {status} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    reason(status)
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockTarget {
        url: format!("http://{addr}/"),
        _runtime: runtime,
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// A URL with nothing listening behind it
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

/// Wraps the real client and tallies outcomes by class.
pub struct Tally {
    inner: HttpClient,
    pub ok_200: AtomicU64,
    pub ok_other: AtomicU64,
    pub transport: AtomicU64,
    pub runtime: AtomicU64,
}

impl Tally {
    pub fn new(inner: HttpClient) -> Self {
        Self {
            inner,
            ok_200: AtomicU64::new(0),
            ok_other: AtomicU64::new(0),
            transport: AtomicU64::new(0),
            runtime: AtomicU64::new(0),
        }
    }

    pub fn total(&self) -> u64 {
        self.ok_200.load(Ordering::SeqCst)
            + self.ok_other.load(Ordering::SeqCst)
            + self.transport.load(Ordering::SeqCst)
            + self.runtime.load(Ordering::SeqCst)
    }
}

impl Fetch for Tally {
    fn get(&self, url: &str) -> Result<u16, ProbeError> {
        let result = self.inner.get(url);
        let counter = match &result {
            Ok(200) => &self.ok_200,
            Ok(_) => &self.ok_other,
            Err(e) if e.is_transport() => &self.transport,
            Err(_) => &self.runtime,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        result
    }
}
