// src/services/fetcher.rs

//! Bounded HTTP fetcher.
//!
//! Every request takes a permit from a fixed-size semaphore first, so the
//! number of in-flight GETs never exceeds the configured thread count no
//! matter how many per-URL tasks are running.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::sync::Semaphore;

use crate::error::{AppError, Result};
use crate::models::MonitorConfig;

/// Source of raw resource bodies.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the full body of `url` exactly as served, without any decoding.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &MonitorConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// HTTP fetcher capped at a fixed number of concurrent requests.
pub struct HttpFetcher {
    client: Client,
    permits: Semaphore,
    limit: usize,
}

impl HttpFetcher {
    /// Build a fetcher from monitor settings.
    pub fn new(config: &MonitorConfig) -> Result<Self> {
        let client = create_async_client(config)?;
        Ok(Self::with_client(client, config.threads))
    }

    /// Wrap an existing client. A limit of zero is raised to one.
    pub fn with_client(client: Client, concurrency: usize) -> Self {
        let limit = concurrency.max(1);
        Self {
            client,
            permits: Semaphore::new(limit),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Permits not currently held by an in-flight request.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        // Released on drop, so early returns below never leak a slot.
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Read until the end of the request head.
    async fn read_request(socket: &mut TcpStream) {
        let mut buf = vec![0u8; 4096];
        let mut read = 0;
        loop {
            let n = socket.read(&mut buf[read..]).await.unwrap();
            read += n;
            if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
    }

    /// Serve one canned HTTP response and return the base URL.
    async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/javascript; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{addr}")
    }

    /// Answer every request after a pause, recording how many were being
    /// served at the same time.
    async fn serve_slowly(active: Arc<AtomicUsize>, peak: Arc<AtomicUsize>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    // Leave before answering so a released permit is never counted twice.
                    active.fetch_sub(1, Ordering::SeqCst);
                    socket
                        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
                        .await
                        .ok();
                    socket.shutdown().await.ok();
                });
            }
        });

        format!("http://{addr}")
    }

    fn fetcher(concurrency: usize) -> HttpFetcher {
        HttpFetcher::new(&MonitorConfig {
            threads: concurrency,
            ..MonitorConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok_body() {
        let base = serve_once("200 OK", b"var x=1").await;
        let body = fetcher(2).fetch(&format!("{base}/a.js")).await.unwrap();
        assert_eq!(body, b"var x=1");
    }

    #[tokio::test]
    async fn test_fetch_keeps_non_utf8_bytes() {
        let fetcher = fetcher(2);

        let first = serve_once("200 OK", b"var s='\xff';").await;
        let second = serve_once("200 OK", b"var s='\xfe';").await;
        let a = fetcher.fetch(&format!("{first}/a.js")).await.unwrap();
        let b = fetcher.fetch(&format!("{second}/a.js")).await.unwrap();

        assert_eq!(a, b"var s='\xff';");
        assert_eq!(b, b"var s='\xfe';");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_status_error() {
        let base = serve_once("404 Not Found", b"missing").await;
        let fetcher = fetcher(2);

        let err = fetcher.fetch(&format!("{base}/gone.js")).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(matches!(err, AppError::HttpStatus { status: 404, .. }));
        assert_eq!(fetcher.available(), 2);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_releases_permit() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = fetcher(1);
        let err = fetcher.fetch(&format!("http://{addr}/a.js")).await.unwrap_err();
        assert!(matches!(err, AppError::Http(_)));
        assert_eq!(fetcher.available(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_requests_never_exceed_limit() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let base = serve_slowly(Arc::clone(&active), Arc::clone(&peak)).await;
        let fetcher = fetcher(3);

        let urls: Vec<String> = (0..10).map(|i| format!("{base}/{i}.js")).collect();
        let results = futures::future::join_all(urls.iter().map(|url| fetcher.fetch(url))).await;

        assert!(results.iter().all(|r| matches!(r, Ok(body) if body == b"ok")));
        assert_eq!(peak.load(Ordering::SeqCst), fetcher.limit());
        assert_eq!(fetcher.available(), fetcher.limit());
    }

    #[test]
    fn test_zero_threads_in_config_means_one() {
        assert_eq!(fetcher(0).limit(), 1);
    }

    #[test]
    fn test_zero_concurrency_is_raised_to_one() {
        let fetcher = HttpFetcher::with_client(Client::new(), 0);
        assert_eq!(fetcher.limit(), 1);
        assert_eq!(fetcher.available(), 1);
    }
}
