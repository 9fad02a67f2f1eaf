// tests/common/mod.rs
// Shared helpers: an in-memory fetcher and a one-shot loopback HTTP server.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use change_radar::config::{DetectorSettings, SourceConfig, SourceKind};
use change_radar::error::FetchError;
use change_radar::ingest::{Fetched, Fetcher};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// URL → canned response. Clones share the same table, so a test can swap
/// responses between runs while the detector owns its copy.
#[derive(Clone, Default)]
pub struct FakeFetcher {
    responses: Arc<Mutex<HashMap<String, Result<Fetched, FetchError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self, url: &str, body: &str) {
        self.set(url, Ok(Fetched::new(body, "text/html; charset=utf-8")));
    }

    pub fn plain(&self, url: &str, body: &str) {
        self.set(url, Ok(Fetched::new(body, "text/plain")));
    }

    pub fn xml(&self, url: &str, body: &str) {
        self.set(url, Ok(Fetched::new(body, "application/rss+xml")));
    }

    pub fn fail(&self, url: &str, status: u16) {
        self.set(
            url,
            Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
        );
    }

    pub fn set(&self, url: &str, resp: Result<Fetched, FetchError>) {
        self.responses.lock().unwrap().insert(url.to_string(), resp);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<Fetched, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(FetchError::Transport {
                    url: url.to_string(),
                    message: "no canned response".into(),
                })
            })
    }
}

pub fn detector_settings() -> DetectorSettings {
    DetectorSettings::default().without_delays()
}

pub fn page(id: &str, url: &str) -> SourceConfig {
    SourceConfig {
        id: id.into(),
        kind: SourceKind::Page,
        url: url.into(),
        name: None,
        tags: vec![],
    }
}

pub fn feed(id: &str, url: &str) -> SourceConfig {
    SourceConfig {
        id: id.into(),
        kind: SourceKind::Feed,
        url: url.into(),
        name: None,
        tags: vec!["api".into()],
    }
}

/// RSS 2.0 document with one `<item>` per guid, in the given order.
pub fn rss_with_guids(guids: &[&str]) -> String {
    let items: String = guids
        .iter()
        .map(|g| {
            format!(
                "<item><title>Post {g}</title><link>https://blog.test/{g}</link>\
                 <guid>{g}</guid><description>Body of {g}</description></item>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title>{items}</channel></rss>"#
    )
}

/// Raw HTTP/1.1 response with `Connection: close`.
pub fn http_response(status_line: &str, content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Serve each response to one connection, in order. The handle yields the raw
/// requests that were received.
pub async fn serve(responses: Vec<String>) -> (String, JoinHandle<Vec<String>>) {
    serve_delayed(responses, Duration::ZERO).await
}

/// Like [`serve`], but waits `delay` before writing each response.
pub async fn serve_delayed(
    responses: Vec<String>,
    delay: Duration,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for resp in responses {
            let (mut sock, _) = listener.accept().await.unwrap();
            let req = read_request(&mut sock).await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let _ = sock.write_all(resp.as_bytes()).await;
            let _ = sock.shutdown().await;
            seen.push(req);
        }
        seen
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(sock: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match sock.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_string();
            let body_len = head
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

/// Client that ignores proxy environment variables, for loopback tests.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .user_agent("change-radar-tests")
        .build()
        .unwrap()
}
