//! Token cache contract and built-in cache implementations.

pub mod file;
pub mod memory;

pub use file::FileCache;
pub use memory::MemoryCache;

// self
use crate::_prelude::*;

/// Cache key under which the client keeps its access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Boxed future returned by [`TokenCache`] operations.
pub type CacheFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CacheError>> + 'a + Send>>;

/// Key-value store holding the client's access token.
///
/// The client only ever touches [`ACCESS_TOKEN_KEY`], so at most one token is cached at a
/// time. Absence of the key means "not authorized yet" or "invalidated".
pub trait TokenCache
where
	Self: Send + Sync,
{
	/// Returns `true` when a value is stored under `key`.
	fn contains<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool>;

	/// Fetches the value stored under `key`, if present.
	fn fetch<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>>;

	/// Stores or replaces the value under `key`.
	fn save<'a>(&'a self, key: &'a str, value: String) -> CacheFuture<'a, ()>;

	/// Removes `key`, returning whether a value was present.
	fn delete<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool>;
}

/// Error type produced by [`TokenCache`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CacheError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
