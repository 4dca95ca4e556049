//! Turns location changes into list loads.
//!
//! [`decide`] is the whole state machine; the controller only dispatches on
//! the [`SyncDecision`] it returns.

use crate::{query_store::QueryLocation, state::load_key};

/// Page and search term as read from the location, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub page: u32,
    pub search: String,
}

impl Observation {
    pub fn new(page: u32, search: impl Into<String>) -> Self {
        Self {
            page,
            search: search.into(),
        }
    }

    pub fn key(&self) -> String {
        load_key(self.page, &self.search)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncDecision {
    /// New search term: drop everything and load page 1 for it.
    Reset { search: String },
    /// Next sequential page of the current search.
    Advance { page: u32, search: String },
    NoOp(NoOpReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// The location points at the page that was committed last.
    AlreadyLoaded,
    /// Page went backwards or skipped ahead; left alone.
    OutOfSequence,
}

/// Decides what a location change means for the list.
///
/// `previous` is `None` for the watcher's first observation, which always
/// counts as a new search. `current_page` is the page the store reports right
/// now; an advance must land on it.
pub fn decide(
    previous: Option<&Observation>,
    next: &Observation,
    current_page: u32,
    last_loaded_key: &str,
) -> SyncDecision {
    if next.key() == last_loaded_key {
        return SyncDecision::NoOp(NoOpReason::AlreadyLoaded);
    }

    let Some(previous) = previous else {
        return SyncDecision::Reset {
            search: next.search.clone(),
        };
    };

    if next.search != previous.search {
        return SyncDecision::Reset {
            search: next.search.clone(),
        };
    }

    if next.page > previous.page && next.page == current_page {
        return SyncDecision::Advance {
            page: next.page,
            search: next.search.clone(),
        };
    }

    SyncDecision::NoOp(NoOpReason::OutOfSequence)
}

type RawKeys = (Option<String>, Option<String>);

/// Remembers what the watcher saw last, so only changes to the watched keys count.
#[derive(Debug)]
pub(crate) struct SyncWatcher {
    page_param: String,
    search_param: String,
    raw: Option<RawKeys>,
    seen: Option<Observation>,
}

impl SyncWatcher {
    pub(crate) fn new(page_param: &str, search_param: &str) -> Self {
        Self {
            page_param: page_param.to_string(),
            search_param: search_param.to_string(),
            raw: None,
            seen: None,
        }
    }

    /// Returns `None` when neither watched key changed since the last observation.
    pub(crate) fn observe(
        &mut self,
        location: &QueryLocation,
        current_page: u32,
        last_loaded_key: &str,
    ) -> Option<SyncDecision> {
        let raw = (
            location.get(&self.page_param).map(str::to_string),
            location.get(&self.search_param).map(str::to_string),
        );
        if self.raw.as_ref() == Some(&raw) {
            return None;
        }
        self.raw = Some(raw);

        let next = Observation::new(
            location.page(&self.page_param),
            location.search(&self.search_param),
        );
        let decision = decide(self.seen.as_ref(), &next, current_page, last_loaded_key);
        self.seen = Some(next);
        Some(decision)
    }
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
