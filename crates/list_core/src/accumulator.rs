//! How loads and their outcomes change [`ListState`].
//!
//! These run inside a single `watch::Sender::send_modify` closure each, after
//! the caller has confirmed its request token is still current.

use shared::protocol::PageResult;

use crate::{
    error::LoadError,
    state::{load_key, ListState},
};

/// Flags a load as started. Initial loads block the whole list, later pages only the footer.
pub fn mark_loading<T>(state: &mut ListState<T>, is_initial: bool) {
    if is_initial {
        state.is_loading = true;
    } else {
        state.is_page_loading = true;
    }
    state.is_error = false;
    state.error = None;
}

/// Drops accumulated results ahead of a new search. Nothing counts as loaded afterwards.
pub fn reset<T>(state: &mut ListState<T>) {
    state.items.clear();
    state.has_more = true;
    state.last_loaded_key.clear();
}

/// Commits a fetched page. Page 1 replaces the list, any later page appends.
pub fn commit_page<T>(state: &mut ListState<T>, page: u32, search: &str, result: PageResult<T>) {
    if page == 1 {
        state.items = result.data;
    } else {
        state.items.extend(result.data);
    }
    state.has_more = result.has_more;
    state.total = result.total;
    state.last_loaded_key = load_key(page, search);
    settle(state);
}

/// Records a failed load. Items and pagination metadata stay as they were.
pub fn commit_failure<T>(state: &mut ListState<T>, error: LoadError) {
    state.is_error = true;
    state.error = Some(error);
    settle(state);
}

fn settle<T>(state: &mut ListState<T>) {
    state.is_loading = false;
    state.is_page_loading = false;
}

#[cfg(test)]
#[path = "tests/accumulator_tests.rs"]
mod tests;
