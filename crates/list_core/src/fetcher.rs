//! The injected data source of a list, and a few ready-made ones.

use std::{future::Future, marker::PhantomData, sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use shared::{domain::Searchable, protocol::PageResult};
use tracing::warn;

/// Arguments of a single page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
    /// `None` when the list is not filtered.
    pub search: Option<String>,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32, search: &str) -> Self {
        Self {
            page: page.max(1),
            page_size,
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }

    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }
}

/// Loads one page of a listing.
///
/// Implementations may be slow, may fail, and may resolve in any order relative
/// to the order they were called in. Calling twice with the same request must be
/// safe. Timeouts are the implementation's business.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<T>>;
}

#[async_trait]
impl<T, F> PageFetcher<T> for Arc<F>
where
    T: Send + 'static,
    F: PageFetcher<T> + ?Sized,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<T>> {
        (**self).fetch_page(request).await
    }
}

/// Adapts an async closure into a [`PageFetcher`].
pub struct FnFetcher<F> {
    f: F,
}

pub fn fetcher_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher { f }
}

#[async_trait]
impl<T, F, Fut> PageFetcher<T> for FnFetcher<F>
where
    T: Send + 'static,
    F: Fn(PageRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<PageResult<T>>> + Send,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<T>> {
        (self.f)(request).await
    }
}

/// Serves pages out of an in-memory dataset, filtered by [`Searchable`].
pub struct StaticPageFetcher<T> {
    items: Arc<Vec<T>>,
    latency: Option<Duration>,
}

impl<T> StaticPageFetcher<T> {
    /// `items` are served in the order given.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
            latency: None,
        }
    }

    /// Delays every response, like a remote source would.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Searchable + Clone> StaticPageFetcher<T> {
    pub fn page(&self, request: &PageRequest) -> PageResult<T> {
        let needle = request.search_term().trim().to_lowercase();
        let matching: Vec<&T> = self
            .items
            .iter()
            .filter(|item| needle.is_empty() || item.matches(&needle))
            .collect();
        if matching.is_empty() {
            return PageResult::empty(request.page, request.page_size);
        }

        let page_size = request.page_size.max(1) as usize;
        let start = (request.page.max(1) as usize - 1).saturating_mul(page_size);
        let end = start.saturating_add(page_size);
        let data = matching
            .iter()
            .skip(start)
            .take(page_size)
            .map(|item| (*item).clone())
            .collect();

        PageResult {
            data,
            page: request.page,
            page_size: request.page_size,
            total: matching.len() as u64,
            has_more: end < matching.len(),
        }
    }
}

#[async_trait]
impl<T> PageFetcher<T> for StaticPageFetcher<T>
where
    T: Searchable + Clone + Send + Sync + 'static,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<T>> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self.page(&request))
    }
}

/// Tries `primary` and serves from `secondary` when it fails.
pub struct FallbackFetcher<T, P, S> {
    primary: P,
    secondary: S,
    _item: PhantomData<fn() -> T>,
}

impl<T, P, S> FallbackFetcher<T, P, S>
where
    P: PageFetcher<T>,
    S: PageFetcher<T>,
{
    pub fn new(primary: P, secondary: S) -> Self {
        Self {
            primary,
            secondary,
            _item: PhantomData,
        }
    }
}

#[async_trait]
impl<T, P, S> PageFetcher<T> for FallbackFetcher<T, P, S>
where
    T: Send + 'static,
    P: PageFetcher<T>,
    S: PageFetcher<T>,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<PageResult<T>> {
        match self.primary.fetch_page(request.clone()).await {
            Ok(page) => Ok(page),
            Err(err) => {
                warn!(
                    page = request.page,
                    search = request.search_term(),
                    error = %err,
                    "primary page fetcher failed; serving from fallback"
                );
                self.secondary.fetch_page(request).await
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/fetcher_tests.rs"]
mod tests;
