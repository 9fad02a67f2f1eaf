// src/ingest/fetch.rs
use std::time::Duration;

use async_trait::async_trait;
use metrics::histogram;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};

use crate::error::FetchError;
use crate::ingest::types::{Fetched, Fetcher};

/// `reqwest`-backed fetcher with a fixed polite `User-Agent`. No retries.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Self::client_builder(user_agent)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("building http client: {e}"),
            })?;
        Ok(Self { client })
    }

    /// Client settings used by [`HttpFetcher::new`], open for further tuning.
    pub fn client_builder(user_agent: &str) -> ClientBuilder {
        Client::builder().user_agent(user_agent.to_string())
    }

    /// Use a preconfigured client (proxy/TLS settings). It should carry the User-Agent.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Fetched, FetchError> {
        let t0 = std::time::Instant::now();
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        histogram!("monitor_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(%url, bytes = body.len(), %content_type, "fetched");
        Ok(Fetched { body, content_type })
    }
}
