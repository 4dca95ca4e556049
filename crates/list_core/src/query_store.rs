//! Observable key-value location state (the address-bar query of a view).
//!
//! The list engine never owns this state. Other parts of the application may
//! navigate at any time, so the engine reads it through [`QueryStore`] and
//! learns about changes from the observers it registers.

use std::{collections::BTreeMap, fmt, sync::Arc};

use parking_lot::Mutex;
use tracing::trace;
use url::form_urlencoded;

/// Snapshot of the query parameters. Keys are unique; empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryLocation(BTreeMap<String, String>);

impl QueryLocation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `page=2&q=eth`, with or without a leading `?`. Later duplicates win.
    pub fn from_query_string(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut location = Self::new();
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            location.set(key.into_owned(), Some(value.into_owned()));
        }
        location
    }

    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Page number stored under `key`. Missing, non-numeric and sub-1 values read as 1.
    pub fn page(&self, key: &str) -> u32 {
        parse_page(self.get(key))
    }

    /// Search term stored under `key`, empty when absent.
    pub fn search(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().to_string()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merges `update` in place. Returns whether anything changed.
    pub fn apply(&mut self, update: &QueryUpdate) -> bool {
        let mut changed = false;
        for (key, value) in &update.entries {
            changed |= self.set(key.clone(), value.clone());
        }
        changed
    }

    fn set(&mut self, key: String, value: Option<String>) -> bool {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => self.0.insert(key, value.clone()).as_deref() != Some(value.as_str()),
            None => self.0.remove(&key).is_some(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryLocation {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut location = Self::new();
        for (key, value) in iter {
            location.set(key.into(), Some(value.into()));
        }
        location
    }
}

impl fmt::Display for QueryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

pub(crate) fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|page| *page >= 1)
        .map(|page| u32::try_from(page).unwrap_or(u32::MAX))
        .unwrap_or(1)
}

/// Partial change to a [`QueryLocation`]: keys set to `None` or `""` are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryUpdate {
    entries: Vec<(String, Option<String>)>,
}

impl QueryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.entries.push((key.into(), Some(value.to_string())));
        self
    }

    pub fn set_or_remove(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        self.entries
            .push((key.into(), value.map(str::to_string)));
        self
    }

    pub fn remove(mut self, key: impl Into<String>) -> Self {
        self.entries.push((key.into(), None));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Delivered to observers after every update that actually changed the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationChange {
    pub previous: QueryLocation,
    pub current: QueryLocation,
}

pub type LocationObserver = Arc<dyn Fn(&LocationChange) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub trait QueryStore: Send + Sync {
    fn location(&self) -> QueryLocation;

    fn get(&self, key: &str) -> Option<String> {
        self.location().get(key).map(str::to_string)
    }

    /// Merges `update` and notifies observers before returning, if anything changed.
    fn update(&self, update: QueryUpdate);

    /// Replaces the whole location, as a navigation from elsewhere in the app would.
    fn replace(&self, location: QueryLocation);

    fn subscribe(&self, observer: LocationObserver) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);
}

/// In-process [`QueryStore`] notifying observers synchronously.
#[derive(Default)]
pub struct MemoryQueryStore {
    inner: Mutex<MemoryStoreState>,
}

#[derive(Default)]
struct MemoryStoreState {
    location: QueryLocation,
    observers: Vec<(SubscriptionId, LocationObserver)>,
    next_subscription: u64,
}

impl MemoryQueryStore {
    pub fn new(location: QueryLocation) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(MemoryStoreState {
                location,
                ..MemoryStoreState::default()
            }),
        })
    }

    pub fn from_query_string(raw: &str) -> Arc<Self> {
        Self::new(QueryLocation::from_query_string(raw))
    }

    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }

    fn commit(&self, change: impl FnOnce(&mut QueryLocation) -> bool) {
        // Observers run without the lock held; they are free to read or write the store.
        let (event, observers) = {
            let mut guard = self.inner.lock();
            let previous = guard.location.clone();
            if !change(&mut guard.location) {
                return;
            }
            let event = LocationChange {
                previous,
                current: guard.location.clone(),
            };
            let observers: Vec<LocationObserver> = guard
                .observers
                .iter()
                .map(|(_, observer)| Arc::clone(observer))
                .collect();
            (event, observers)
        };

        trace!(
            from = %event.previous,
            to = %event.current,
            observers = observers.len(),
            "query location changed"
        );
        for observer in observers {
            observer(&event);
        }
    }
}

impl QueryStore for MemoryQueryStore {
    fn location(&self) -> QueryLocation {
        self.inner.lock().location.clone()
    }

    fn get(&self, key: &str) -> Option<String> {
        self.inner.lock().location.get(key).map(str::to_string)
    }

    fn update(&self, update: QueryUpdate) {
        self.commit(|location| location.apply(&update));
    }

    fn replace(&self, location: QueryLocation) {
        self.commit(|current| {
            if *current == location {
                return false;
            }
            *current = location;
            true
        });
    }

    fn subscribe(&self, observer: LocationObserver) -> SubscriptionId {
        let mut guard = self.inner.lock();
        guard.next_subscription += 1;
        let id = SubscriptionId(guard.next_subscription);
        guard.observers.push((id, observer));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .lock()
            .observers
            .retain(|(existing, _)| *existing != id);
    }
}

#[cfg(test)]
#[path = "tests/query_store_tests.rs"]
mod tests;
