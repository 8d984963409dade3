//! Client-side tabular data engine
//!
//! Filters, searches, sorts, paginates and selects rows, either from a local
//! row set or from a remote endpoint fronted by a TTL cache with retrying fetch.

rust_i18n::i18n!("locales", fallback = "en");

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod fingerprint;
pub mod locale;
pub mod model;
pub mod pipeline;
pub mod remote;
pub mod response;
pub mod retry;

mod table;

pub use response::CacheStatus;
pub use response::Response;
pub use table::*;
