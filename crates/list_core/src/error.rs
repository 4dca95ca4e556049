//! Error types surfaced by the list engine.
//!
//! - [`LoadError`] - a page load failed; kept in the list state until the next load
//! - [`ConfigError`] - an [`crate::InfiniteList`] could not be constructed

use std::{any::Any, error::Error as StdError, fmt, sync::Arc};

use thiserror::Error;

/// A failed page load, normalized from whatever the fetcher produced.
///
/// Cheap to clone so it can live inside published list snapshots.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LoadError {
    message: String,
    page: u32,
    search: String,
    #[source]
    source: Option<Arc<dyn StdError + Send + Sync>>,
}

impl LoadError {
    pub fn new(page: u32, search: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            page,
            search: search.into(),
            source: None,
        }
    }

    /// Wraps a fetcher error. The message is the error's own top-level text.
    pub fn from_fetch(page: u32, search: &str, err: anyhow::Error) -> Self {
        let message = err.to_string();
        let source: Box<dyn StdError + Send + Sync> = err.into();
        Self {
            message,
            page,
            search: search.to_string(),
            source: Some(Arc::from(source)),
        }
    }

    /// Converts a panic payload into an error carrying its stringified value.
    pub fn from_panic(page: u32, search: &str, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&'static str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "page fetcher panicked".to_string()
        };
        Self::new(page, search, message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn search(&self) -> &str {
        &self.search
    }
}

impl PartialEq for LoadError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message && self.page == other.page && self.search == other.search
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("page size must be positive")]
    ZeroPageSize,

    #[error("{which} parameter key must not be empty")]
    EmptyParamKey { which: ParamKind },

    #[error("page and search parameters share the key '{0}'")]
    DuplicateParamKey(String),

    #[error("no tokio runtime to run page loads on")]
    MissingRuntime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Page,
    Search,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Page => f.write_str("page"),
            ParamKind::Search => f.write_str("search"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn bare_payload_becomes_message() {
        let err = LoadError::from_fetch(1, "", anyhow!("boom"));
        assert_eq!(err.message(), "boom");
        assert_eq!(err.to_string(), "boom");
        assert!(err.source().is_some());
    }

    #[test]
    fn panic_payloads_are_stringified() {
        let static_payload: Box<dyn Any + Send> = Box::new("static boom");
        assert_eq!(
            LoadError::from_panic(2, "eth", static_payload).message(),
            "static boom"
        );

        let owned_payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        let err = LoadError::from_panic(2, "eth", owned_payload);
        assert_eq!(err.message(), "owned boom");
        assert_eq!(err.page(), 2);
        assert_eq!(err.search(), "eth");

        let opaque: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(
            LoadError::from_panic(1, "", opaque).message(),
            "page fetcher panicked"
        );
    }

    #[test]
    fn config_errors_render_param_kind() {
        let err = ConfigError::EmptyParamKey {
            which: ParamKind::Search,
        };
        assert_eq!(err.to_string(), "search parameter key must not be empty");
    }
}
