//! Network access for license downloads and link verification.
//!
//! [`Fetcher`] is the seam between the cascade and the network:
//! `get_text` returns `Ok(Some(body))` on a successful response, `Ok(None)`
//! on a non-success status, and `Err` on transport failures (DNS, refused
//! connection, timeout). Callers treat both `Ok(None)` and `Err` as a miss.
//!
//! - [`github`] — raw LICENSE download candidates for a GitHub repository.
//! - [`links`] — canonical `blob/master` link verification.

pub mod github;
pub mod links;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::GenResult;

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get_text(&self, url: &str) -> GenResult<Option<String>>;

    /// Whether `url` answers with a success status.
    async fn exists(&self, url: &str) -> GenResult<bool> {
        Ok(self.get_text(url).await?.is_some())
    }
}

/// reqwest-backed [`Fetcher`] with a fixed per-request timeout.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> GenResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.to_string())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_text(&self, url: &str) -> GenResult<Option<String>> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "non-success response");
            return Ok(None);
        }

        Ok(Some(response.text().await?))
    }

    async fn exists(&self, url: &str) -> GenResult<bool> {
        let response = self.client.get(url).send().await?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
pub mod stub {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory fetcher: known URLs answer with their body, everything else 404s.
    #[derive(Default)]
    pub struct StubFetcher {
        pages: HashMap<String, String>,
        pub requests: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn get_text(&self, url: &str) -> GenResult<Option<String>> {
            self.requests.lock().unwrap().push(url.to_string());
            Ok(self.pages.get(url).cloned())
        }
    }
}
