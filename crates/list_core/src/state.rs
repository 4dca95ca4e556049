//! Primitive list state and the views derived from it.
//!
//! Derived flags are methods, never stored, so they cannot drift from the
//! fields they are computed from.

use crate::error::LoadError;

/// Everything the controller mutates. Published through a `tokio::sync::watch`
/// channel after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub is_page_loading: bool,
    pub is_error: bool,
    pub error: Option<LoadError>,
    pub has_more: bool,
    pub total: u64,
    /// `"{page}|{search}"` of the last page committed to `items`.
    pub last_loaded_key: String,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            is_loading: false,
            is_page_loading: false,
            is_error: false,
            error: None,
            has_more: true,
            total: 0,
            last_loaded_key: String::new(),
        }
    }
}

impl<T> ListState<T> {
    pub fn is_busy(&self) -> bool {
        self.is_loading || self.is_page_loading
    }

    /// First load in progress with nothing to show yet.
    pub fn is_initial_loading(&self) -> bool {
        self.is_loading && self.items.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && !self.is_busy()
    }

    pub fn is_end_reached(&self) -> bool {
        !self.has_more && !self.items.is_empty()
    }

    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.is_busy()
    }
}

pub(crate) fn load_key(page: u32, search: &str) -> String {
    format!("{page}|{search}")
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub is_loading: bool,
    pub is_page_loading: bool,
    pub is_initial_loading: bool,
    pub is_error: bool,
    pub error: Option<LoadError>,
    pub has_more: bool,
    pub total: u64,
    pub is_empty: bool,
    pub is_end_reached: bool,
    pub current_page: u32,
    pub search_query: String,
}

impl<T: Clone> ListView<T> {
    pub(crate) fn capture(state: &ListState<T>, current_page: u32, search_query: String) -> Self {
        Self {
            items: state.items.clone(),
            is_loading: state.is_loading,
            is_page_loading: state.is_page_loading,
            is_initial_loading: state.is_initial_loading(),
            is_error: state.is_error,
            error: state.error.clone(),
            has_more: state.has_more,
            total: state.total,
            is_empty: state.is_empty(),
            is_end_reached: state.is_end_reached(),
            current_page,
            search_query,
        }
    }
}
