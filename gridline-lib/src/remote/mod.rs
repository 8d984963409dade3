//! Remote row source
//!
//! [`RemoteDataCache`] posts a [`FetchRequest`] through a [`Transport`],
//! memoizes the response under the request's canonical key for the cache
//! TTL, and retries transient failures with exponential backoff. Every fetch
//! takes a new generation; a newer fetch cancels the one before it.

#[cfg(test)]
mod mock;
mod params;
mod source;
mod transport;

#[cfg(test)]
pub(crate) use mock::MockTransport;
pub use params::*;
pub use source::*;
pub use transport::*;
