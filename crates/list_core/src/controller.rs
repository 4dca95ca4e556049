use std::{
    panic::AssertUnwindSafe,
    sync::{Arc, Weak},
};

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::{runtime::Handle, sync::watch};
use tracing::{debug, info, trace, warn};

use crate::{
    accumulator,
    arbiter::{RequestArbiter, RequestToken},
    config::ListConfig,
    error::{ConfigError, LoadError},
    fetcher::{PageFetcher, PageRequest},
    query_store::{
        parse_page, LocationChange, QueryLocation, QueryStore, QueryUpdate, SubscriptionId,
    },
    state::{ListState, ListView},
    sync::{SyncDecision, SyncWatcher},
};

/// Paginated, search-aware list kept in step with a [`QueryStore`].
///
/// The location is the single source of truth for which page and search term
/// the user is looking at. [`InfiniteList::load_more`] and
/// [`InfiniteList::search`] only write to the store; the loads themselves are
/// started by the store's change notification, the same way an external
/// navigation would start them. Fetches run on the tokio runtime the list was
/// created on and commit in the order they were accepted, never in the order
/// they complete.
pub struct InfiniteList<T: Clone + Send + Sync + 'static> {
    inner: Arc<ListInner<T>>,
    subscription: SubscriptionId,
}

struct ListInner<T> {
    config: ListConfig,
    fetcher: Arc<dyn PageFetcher<T>>,
    store: Arc<dyn QueryStore>,
    arbiter: RequestArbiter,
    state: watch::Sender<ListState<T>>,
    watcher: Mutex<SyncWatcher>,
    runtime: Handle,
}

/// A load that has been accepted and flagged in state but not fetched yet.
struct LoadTicket {
    token: RequestToken,
    page: u32,
    search: String,
}

impl<T: Clone + Send + Sync + 'static> InfiniteList<T> {
    /// Creates the list on the current tokio runtime and immediately loads
    /// whatever the store's location points at.
    pub fn new(
        fetcher: Arc<dyn PageFetcher<T>>,
        store: Arc<dyn QueryStore>,
        config: ListConfig,
    ) -> Result<Self, ConfigError> {
        let runtime = Handle::try_current().map_err(|_| ConfigError::MissingRuntime)?;
        Self::new_with_runtime(runtime, fetcher, store, config)
    }

    /// Like [`InfiniteList::new`], with page loads spawned on `runtime`.
    pub fn new_with_runtime(
        runtime: Handle,
        fetcher: Arc<dyn PageFetcher<T>>,
        store: Arc<dyn QueryStore>,
        config: ListConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (state, _) = watch::channel(ListState::default());
        let inner = Arc::new(ListInner {
            watcher: Mutex::new(SyncWatcher::new(&config.page_param, &config.search_param)),
            config,
            fetcher,
            store,
            arbiter: RequestArbiter::new(),
            state,
            runtime,
        });

        let weak: Weak<ListInner<T>> = Arc::downgrade(&inner);
        let subscription = inner.store.subscribe(Arc::new(move |change: &LocationChange| {
            if let Some(inner) = weak.upgrade() {
                inner.on_location(&change.current);
            }
        }));

        info!(
            page_size = inner.config.page_size,
            page_param = %inner.config.page_param,
            search_param = %inner.config.search_param,
            "infinite list attached to query store"
        );
        let location = inner.store.location();
        inner.on_location(&location);

        Ok(Self {
            inner,
            subscription,
        })
    }

    pub fn config(&self) -> &ListConfig {
        &self.inner.config
    }

    /// Page the location currently points at, at least 1.
    pub fn current_page(&self) -> u32 {
        self.inner.current_page()
    }

    /// Search term in the location, empty when absent.
    pub fn search_query(&self) -> String {
        self.inner.search_query()
    }

    pub fn request_token(&self) -> RequestToken {
        self.inner.arbiter.current()
    }

    /// Current state with derived flags and location-derived fields filled in.
    pub fn snapshot(&self) -> ListView<T> {
        let current_page = self.current_page();
        let search_query = self.search_query();
        ListView::capture(&self.inner.state.borrow(), current_page, search_query)
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.inner.state.subscribe()
    }

    /// Waits until no load is in flight and returns the resulting snapshot.
    pub async fn settled(&self) -> ListView<T> {
        let mut rx = self.inner.state.subscribe();
        // The sender lives in `self`, so waiting cannot fail.
        let _ = rx.wait_for(|state| !state.is_busy()).await;
        self.snapshot()
    }

    /// Asks for the next page by moving the location forward one page.
    ///
    /// Ignored when there is nothing more to load or a load is already in flight.
    pub fn load_more(&self) {
        let can_load_more = self.inner.state.borrow().can_load_more();
        if !can_load_more {
            debug!("load_more ignored: list busy or exhausted");
            return;
        }
        let next_page = self.current_page().saturating_add(1);
        self.inner
            .store
            .update(QueryUpdate::new().set(&self.inner.config.page_param, next_page));
    }

    /// Points the location at `query` and back at the first page.
    pub fn search(&self, query: &str) {
        let config = &self.inner.config;
        self.inner.store.update(
            QueryUpdate::new()
                .set_or_remove(&config.search_param, Some(query))
                .remove(&config.page_param),
        );
    }

    /// Loads the current page and search again. Resolves once that load settles,
    /// whether it succeeded or not.
    pub async fn retry(&self) {
        let page = self.current_page();
        let search = self.search_query();
        let ticket = self.inner.begin_load(page, search, page == 1);
        self.inner.run_load(ticket).await;
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for InfiniteList<T> {
    fn drop(&mut self) {
        self.inner.store.unsubscribe(self.subscription);
    }
}

impl<T: Clone + Send + Sync + 'static> ListInner<T> {
    fn current_page(&self) -> u32 {
        parse_page(self.store.get(&self.config.page_param).as_deref())
    }

    fn search_query(&self) -> String {
        self.store
            .get(&self.config.search_param)
            .unwrap_or_default()
    }

    fn on_location(self: &Arc<Self>, location: &QueryLocation) {
        let current_page = self.current_page();
        let decision = {
            let last_loaded_key = self.state.borrow().last_loaded_key.clone();
            let mut watcher = self.watcher.lock();
            match watcher.observe(location, current_page, &last_loaded_key) {
                Some(decision) => decision,
                None => return,
            }
        };

        debug!(location = %location, ?decision, "query location observed");
        match decision {
            SyncDecision::Reset { search } => {
                // Anything still in flight belongs to the previous search.
                self.arbiter.begin_request();
                self.state.send_modify(accumulator::reset);
                self.spawn_load(1, search, true);
                // Items restart at page 1, so the location must too. The
                // resulting notification is a page decrease and loads nothing.
                if location.page(&self.config.page_param) > 1 {
                    self.store
                        .update(QueryUpdate::new().remove(&self.config.page_param));
                }
            }
            SyncDecision::Advance { page, search } => {
                self.spawn_load(page, search, false);
            }
            SyncDecision::NoOp(_) => {}
        }
    }

    fn spawn_load(self: &Arc<Self>, page: u32, search: String, is_initial: bool) {
        let ticket = self.begin_load(page, search, is_initial);
        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            inner.run_load(ticket).await;
        });
    }

    /// Takes a token and flags the load in state, in one state update.
    fn begin_load(&self, page: u32, search: String, is_initial: bool) -> LoadTicket {
        let mut token = RequestToken(0);
        self.state.send_modify(|state| {
            token = self.arbiter.begin_request();
            accumulator::mark_loading(state, is_initial);
        });
        debug!(token = token.0, page, search = %search, is_initial, "page load started");
        LoadTicket {
            token,
            page,
            search,
        }
    }

    async fn run_load(&self, ticket: LoadTicket) {
        let LoadTicket {
            token,
            page,
            search,
        } = ticket;
        let request = PageRequest::new(page, self.config.page_size, &search);

        let outcome = match AssertUnwindSafe(self.fetcher.fetch_page(request))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => Err(LoadError::from_fetch(page, &search, err)),
            Err(payload) => Err(LoadError::from_panic(page, &search, payload)),
        };
        let failure = outcome.as_ref().err().cloned();

        let committed = self.state.send_if_modified(|state| {
            if !self.arbiter.is_current(token) {
                return false;
            }
            match outcome {
                Ok(result) => accumulator::commit_page(state, page, &search, result),
                Err(error) => accumulator::commit_failure(state, error),
            }
            true
        });

        match (committed, failure) {
            (false, _) => trace!(token = token.0, page, search = %search, "stale page result discarded"),
            (true, None) => debug!(token = token.0, page, search = %search, "page committed"),
            (true, Some(error)) => warn!(
                token = token.0,
                page,
                search = %search,
                error = %error,
                "page load failed"
            ),
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
