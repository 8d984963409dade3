//! Error types

mod config;
mod export;
mod fetch;
mod field;

pub use config::*;
pub use export::*;
pub use fetch::*;
pub use field::*;

/// Top-level error for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Remote fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Export could not be written.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Typed field access failed.
    #[error(transparent)]
    Field(#[from] FieldError),
}
