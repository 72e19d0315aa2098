//! Thread-safe in-memory [`TokenCache`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	cache::{CacheFuture, TokenCache},
};

type CacheMap = Arc<RwLock<HashMap<String, String>>>;

/// Process-local cache; clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache(CacheMap);
impl MemoryCache {
	/// Stores a value synchronously.
	pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
		self.0.write().insert(key.into(), value.into());
	}

	/// Reads a value synchronously.
	pub fn get(&self, key: &str) -> Option<String> {
		self.0.read().get(key).cloned()
	}

	/// Number of stored entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl TokenCache for MemoryCache {
	fn contains<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().contains_key(key)) })
	}

	fn fetch<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(key).cloned()) })
	}

	fn save<'a>(&'a self, key: &'a str, value: String) -> CacheFuture<'a, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			map.write().insert(key.to_owned(), value);

			Ok(())
		})
	}

	fn delete<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(key).is_some()) })
	}
}
