//! HTTP page fetcher for listing endpoints shaped like `GET /assets`.

use std::marker::PhantomData;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    error::ApiError,
    protocol::{ListAssetsQuery, PageResult},
};
use thiserror::Error;
use url::Url;

use crate::fetcher::{PageFetcher, PageRequest};

/// Upper bound the listing backend accepts for `page_size`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Non-success response, or no response at all (`status == 0`).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpError {
    pub status: u16,
    pub message: String,
}

impl HttpError {
    fn from_body(status: StatusCode, body: &[u8]) -> Self {
        let message = serde_json::from_slice::<ApiError>(body)
            .ok()
            .and_then(|body| body.best_message().map(str::to_string))
            .unwrap_or_else(|| {
                format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                )
            });
        Self {
            status: status.as_u16(),
            message,
        }
    }

    fn transport(err: reqwest::Error) -> Self {
        Self {
            status: 0,
            message: err.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        self.status == 0
    }
}

/// Fetches pages with `?page=&page_size=&search=` and decodes
/// `{data, page, pageSize, total, hasMore}` bodies.
pub struct HttpPageFetcher<T> {
    http: Client,
    endpoint: Url,
    _item: PhantomData<fn() -> T>,
}

impl<T> HttpPageFetcher<T> {
    /// `base_url` such as `http://localhost:8000/api`, `path` such as `assets`.
    pub fn new(base_url: &str, path: &str) -> Result<Self> {
        Self::with_client(Client::new(), base_url, path)
    }

    pub fn with_client(http: Client, base_url: &str, path: &str) -> Result<Self> {
        let mut base = Url::parse(base_url).with_context(|| format!("invalid base url '{base_url}'"))?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        let endpoint = base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid listing path '{path}'"))?;
        Ok(Self {
            http,
            endpoint,
            _item: PhantomData,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl<T> PageFetcher<T> for HttpPageFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<T>> {
        let query = ListAssetsQuery {
            page: request.page.max(1),
            page_size: request.page_size.clamp(1, MAX_PAGE_SIZE),
            search: request.search,
        };

        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&query)
            .send()
            .await
            .map_err(HttpError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(HttpError::from_body(status, &body).into());
        }

        let page = response
            .json::<PageResult<T>>()
            .await
            .with_context(|| format!("malformed page {} from {}", query.page, self.endpoint))?;
        Ok(page)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
