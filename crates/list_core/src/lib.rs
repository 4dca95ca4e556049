//! URL-synchronized infinite list.
//!
//! An [`InfiniteList`] reads its page and search term from a [`QueryStore`],
//! fetches pages through a [`PageFetcher`] and publishes the accumulated
//! [`ListState`] on a tokio watch channel.

pub mod accumulator;
pub mod arbiter;
pub mod config;
mod controller;
pub mod error;
pub mod fetcher;
pub mod query_store;
pub mod state;
pub mod sync;
pub mod transport;

pub use arbiter::{RequestArbiter, RequestToken};
pub use config::ListConfig;
pub use controller::InfiniteList;
pub use error::{ConfigError, LoadError};
pub use fetcher::{fetcher_fn, FallbackFetcher, PageFetcher, PageRequest, StaticPageFetcher};
pub use query_store::{MemoryQueryStore, QueryLocation, QueryStore, QueryUpdate};
pub use state::{ListState, ListView};
pub use sync::{decide, SyncDecision};
pub use transport::{HttpError, HttpPageFetcher};

pub use shared::protocol::PageResult;
