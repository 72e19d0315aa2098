//! Async client for the doc.build document API: client-credentials authorization, a cached
//! access token, and one transparent retry when the server reports that token as expired.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod document;
pub mod error;
pub mod file;
pub mod http;
pub mod obs;
pub mod options;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and scripted collaborators for tests; enabled via `cfg(test)` or
	//! the `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		auth::Credentials,
		cache::{CacheError, CacheFuture, MemoryCache, TokenCache},
		client::DocBuild,
		http::{
			ApiRequest, ApiResponse, Method, ResponseBody, ResponseMetadata, Transport,
			TransportFuture,
		},
		options::ClientOptions,
	};

	/// Client id used by [`build_test_client`].
	pub const TEST_CLIENT_ID: &str = "myid";
	/// Client secret used by [`build_test_client`].
	pub const TEST_CLIENT_SECRET: &str = "mysecret";

	/// Single observable side effect produced by the scripted collaborators.
	#[derive(Clone, Debug, PartialEq, Eq)]
	pub enum JournalEntry {
		/// The transport dispatched a request.
		Request {
			/// HTTP method of the request.
			method: Method,
			/// Resource path of the request.
			resource: String,
		},
		/// The cache answered an existence check.
		CacheContains(String),
		/// The cache answered a fetch.
		CacheFetch(String),
		/// The cache stored a value.
		CacheSave(String, String),
		/// The cache deleted a key.
		CacheDelete(String),
	}

	/// Ordered log shared by [`ScriptedTransport`] and [`RecordingCache`].
	#[derive(Clone, Debug, Default)]
	pub struct Journal(Arc<Mutex<Vec<JournalEntry>>>);
	impl Journal {
		/// Appends an entry.
		pub fn push(&self, entry: JournalEntry) {
			self.0.lock().push(entry);
		}

		/// Returns a snapshot of every entry recorded so far.
		pub fn entries(&self) -> Vec<JournalEntry> {
			self.0.lock().clone()
		}

		/// Returns the resources requested so far, in order.
		pub fn requested_resources(&self) -> Vec<String> {
			self.entries()
				.into_iter()
				.filter_map(|entry| match entry {
					JournalEntry::Request { resource, .. } => Some(resource),
					_ => None,
				})
				.collect()
		}
	}

	type Delay = Pin<Box<dyn Future<Output = ()> + Send>>;

	struct ScriptedOutcome {
		meta: ResponseMetadata,
		delay: Option<Delay>,
		result: Result<ResponseBody>,
	}

	/// Transport that replays queued outcomes and records every request it receives.
	///
	/// Metadata is recorded as soon as an outcome is dequeued. A delayed outcome then waits on
	/// its delay before resolving, which models a response whose body arrives slowly.
	#[derive(Default)]
	pub struct ScriptedTransport {
		journal: Journal,
		base_url: Mutex<Option<Url>>,
		requests: Mutex<Vec<ApiRequest>>,
		outcomes: Mutex<VecDeque<ScriptedOutcome>>,
		last: Mutex<Option<ResponseMetadata>>,
	}
	impl ScriptedTransport {
		/// Creates a transport that writes into the provided journal.
		pub fn with_journal(journal: Journal) -> Self {
			Self { journal, ..Default::default() }
		}

		/// Queues a JSON response with the provided status.
		pub fn respond_json(&self, status: u16, body: serde_json::Value) {
			self.push(status, None, Ok(ResponseBody::Json(body)));
		}

		/// Queues a JSON response that resolves only once `delay` completes.
		pub fn respond_json_after(
			&self,
			status: u16,
			body: serde_json::Value,
			delay: impl 'static + Future<Output = ()> + Send,
		) {
			self.push(status, Some(Box::pin(delay)), Ok(ResponseBody::Json(body)));
		}

		/// Queues a failure that was observed alongside the provided status.
		pub fn fail(&self, status: u16, error: Error) {
			self.push(status, None, Err(error));
		}

		/// Queues a failure that resolves only once `delay` completes.
		pub fn fail_after(
			&self,
			status: u16,
			error: Error,
			delay: impl 'static + Future<Output = ()> + Send,
		) {
			self.push(status, Some(Box::pin(delay)), Err(error));
		}

		/// Returns every request dispatched so far.
		pub fn requests(&self) -> Vec<ApiRequest> {
			self.requests.lock().clone()
		}

		/// Returns the base URL most recently pushed by the client.
		pub fn base_url(&self) -> Option<Url> {
			self.base_url.lock().clone()
		}

		/// Returns how many queued outcomes have not been consumed.
		pub fn pending(&self) -> usize {
			self.outcomes.lock().len()
		}

		fn push(&self, status: u16, delay: Option<Delay>, result: Result<ResponseBody>) {
			let meta = ResponseMetadata { status, headers: BTreeMap::new() };

			self.outcomes.lock().push_back(ScriptedOutcome { meta, delay, result });
		}
	}
	impl Debug for ScriptedTransport {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.debug_struct("ScriptedTransport")
				.field("base_url", &self.base_url())
				.field("requests", &self.requests.lock().len())
				.field("pending", &self.pending())
				.field("last", &self.last_response())
				.finish()
		}
	}
	impl Transport for ScriptedTransport {
		fn set_base_url(&self, url: Url) {
			*self.base_url.lock() = Some(url);
		}

		fn execute<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a, ApiResponse> {
			Box::pin(async move {
				self.journal.push(JournalEntry::Request {
					method: request.method,
					resource: request.resource.clone(),
				});
				self.requests.lock().push(request.clone());

				let ScriptedOutcome { meta, delay, result } =
					self.outcomes.lock().pop_front().unwrap_or_else(|| {
						panic!(
							"ScriptedTransport has no outcome queued for `{}`.",
							request.resource
						)
					});

				*self.last.lock() = Some(meta.clone());

				if let Some(delay) = delay {
					delay.await;
				}

				result.map(|body| ApiResponse { metadata: meta, body })
			})
		}

		fn last_response(&self) -> Option<ResponseMetadata> {
			self.last.lock().clone()
		}
	}

	/// In-memory cache that journals every call before delegating to [`MemoryCache`].
	#[derive(Debug, Default)]
	pub struct RecordingCache {
		journal: Journal,
		inner: MemoryCache,
	}
	impl RecordingCache {
		/// Creates a cache that writes into the provided journal.
		pub fn with_journal(journal: Journal) -> Self {
			Self { journal, inner: MemoryCache::default() }
		}

		/// Seeds a value without journaling it.
		pub fn seed(&self, key: &str, value: &str) {
			self.inner.insert(key, value);
		}

		/// Reads a value without journaling it.
		pub fn peek(&self, key: &str) -> Option<String> {
			self.inner.get(key)
		}
	}
	impl TokenCache for RecordingCache {
		fn contains<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
			self.journal.push(JournalEntry::CacheContains(key.to_owned()));

			self.inner.contains(key)
		}

		fn fetch<'a>(&'a self, key: &'a str) -> CacheFuture<'a, Option<String>> {
			self.journal.push(JournalEntry::CacheFetch(key.to_owned()));

			self.inner.fetch(key)
		}

		fn save<'a>(&'a self, key: &'a str, value: String) -> CacheFuture<'a, ()> {
			self.journal.push(JournalEntry::CacheSave(key.to_owned(), value.clone()));

			self.inner.save(key, value)
		}

		fn delete<'a>(&'a self, key: &'a str) -> CacheFuture<'a, bool> {
			self.journal.push(JournalEntry::CacheDelete(key.to_owned()));

			self.inner.delete(key)
		}
	}

	/// Cache whose every operation fails with a backend error.
	#[derive(Debug, Default)]
	pub struct BrokenCache;
	impl TokenCache for BrokenCache {
		fn contains<'a>(&'a self, _key: &'a str) -> CacheFuture<'a, bool> {
			Box::pin(async { Err::<bool, _>(Self::failure()) })
		}

		fn fetch<'a>(&'a self, _key: &'a str) -> CacheFuture<'a, Option<String>> {
			Box::pin(async { Err::<Option<String>, _>(Self::failure()) })
		}

		fn save<'a>(&'a self, _key: &'a str, _value: String) -> CacheFuture<'a, ()> {
			Box::pin(async { Err::<(), _>(Self::failure()) })
		}

		fn delete<'a>(&'a self, _key: &'a str) -> CacheFuture<'a, bool> {
			Box::pin(async { Err::<bool, _>(Self::failure()) })
		}
	}
	impl BrokenCache {
		fn failure() -> CacheError {
			CacheError::Backend { message: "cache offline".into() }
		}
	}

	/// Scripted collaborators sharing one journal.
	#[derive(Debug)]
	pub struct Harness {
		/// Scripted transport handed to the client.
		pub transport: Arc<ScriptedTransport>,
		/// Recording cache handed to the client.
		pub cache: Arc<RecordingCache>,
		/// Journal written by both collaborators.
		pub journal: Journal,
	}

	/// Creates a fresh [`Harness`].
	pub fn harness() -> Harness {
		let journal = Journal::default();

		Harness {
			transport: Arc::new(ScriptedTransport::with_journal(journal.clone())),
			cache: Arc::new(RecordingCache::with_journal(journal.clone())),
			journal,
		}
	}

	/// Builds a client wired to the harness collaborators with the test credentials.
	pub fn build_test_client(
		harness: &Harness,
		options: ClientOptions,
	) -> DocBuild<ScriptedTransport> {
		let cache: Arc<dyn TokenCache> = harness.cache.clone();

		DocBuild::with_parts(
			Credentials::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET),
			options,
			harness.transport.clone(),
			cache,
		)
		.expect("Failed to build the test client.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
