//! Shared HTTP client with connection pooling and read timeout.
//!
//! Uses async reqwest internally with tokio::time::timeout as the read
//! ceiling, but presents a sync interface for the blocking worker threads.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::ProbeConfig;
use crate::error::ProbeError;

/// Runtime threads driving the connection pool
const RUNTIME_THREADS: usize = 2;

/// The single capability workers need: GET a URL, report the status code.
///
/// Any completed response is `Ok`, whatever its status.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> Result<u16, ProbeError>;
}

/// Client shared by every worker for the process lifetime.
///
/// Owns the reqwest connection pool and the tokio runtime that drives it.
/// Dropping it closes pooled connections.
pub struct HttpClient {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    read_timeout: Duration,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.workers.max(1))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .danger_accept_invalid_hostnames(config.accept_invalid_certs)
            .build()
            .context("Failed to build HTTP client")?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(RUNTIME_THREADS)
            .thread_name("stampede-http")
            .enable_all()
            .build()
            .context("Failed to build tokio runtime")?;

        Ok(Self {
            client,
            runtime,
            read_timeout: config.read_timeout,
        })
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

impl Fetch for HttpClient {
    fn get(&self, url: &str) -> Result<u16, ProbeError> {
        self.runtime.block_on(async {
            let request = async {
                let response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| ProbeError::from_reqwest(&e))?;
                let status = response.status().as_u16();

                // Drain body so the connection goes back to the pool
                response
                    .bytes()
                    .await
                    .map_err(|e| ProbeError::from_reqwest(&e))?;
                Ok::<_, ProbeError>(status)
            };

            match tokio::time::timeout(self.read_timeout, request).await {
                Ok(result) => result,
                Err(_) => Err(ProbeError::Timeout(self.read_timeout)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_config() -> ProbeConfig {
        ProbeConfig {
            workers: 2,
            read_timeout: Duration::from_millis(300),
            ..Default::default()
        }
    }

    /// Serve `response` to every connection; returns the base URL.
    fn serve(client: &HttpClient, response: &'static str, delay: Duration) -> String {
        let listener = client
            .runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .unwrap();
        let addr = listener.local_addr().unwrap();
        client.runtime.spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    tokio::time::sleep(delay).await;
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        format!("http://{addr}/")
    }

    #[test]
    fn get_returns_status() {
        let client = HttpClient::new(&test_config()).unwrap();
        let url = serve(
            &client,
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
            Duration::ZERO,
        );
        assert_eq!(client.get(&url).unwrap(), 200);
    }

    #[test]
    fn server_error_status_is_not_an_error() {
        let client = HttpClient::new(&test_config()).unwrap();
        let url = serve(
            &client,
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            Duration::ZERO,
        );
        assert_eq!(client.get(&url).unwrap(), 503);
    }

    #[test]
    fn slow_response_times_out() {
        let client = HttpClient::new(&test_config()).unwrap();
        let url = serve(
            &client,
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            Duration::from_secs(2),
        );
        let err = client.get(&url).unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(_)));
        assert!(err.is_transport());
    }

    #[test]
    fn refused_connection_is_transport_error() {
        let client = HttpClient::new(&test_config()).unwrap();
        // Bind then drop to get a port nothing listens on
        let addr = client
            .runtime
            .block_on(TcpListener::bind("127.0.0.1:0"))
            .unwrap()
            .local_addr()
            .unwrap();
        let err = client.get(&format!("http://{addr}/")).unwrap_err();
        assert!(err.is_transport(), "unexpected error: {err:?}");
    }

    #[test]
    fn invalid_url_is_runtime_error() {
        let client = HttpClient::new(&test_config()).unwrap();
        let err = client.get("not a url").unwrap_err();
        assert!(!err.is_transport(), "unexpected error: {err:?}");
    }
}
