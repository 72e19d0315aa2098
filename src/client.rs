//! The doc.build client: owned credentials + options, injected transport + cache.
//!
//! [`DocBuild`] wires the [`Authorizer`], a [`TokenCache`], and a [`Transport`] together. The
//! authenticated request loop lives in [`request`] and the per-endpoint operations in
//! [`documents`]. Clones share the transport, the cache, and the token-resolution guard, so
//! concurrent callers never authorize twice for one cache miss.

pub mod documents;
pub mod request;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, Authorizer, ClientSecret, Credentials},
	cache::TokenCache,
	http::Transport,
	options::ClientOptions,
};
#[cfg(feature = "reqwest")]
use crate::{cache::FileCache, error::ConfigError, http::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestDocBuild = DocBuild<ReqwestTransport>;

/// Authenticated client for the doc.build API.
pub struct DocBuild<T>
where
	T: ?Sized + Transport,
{
	transport: Arc<T>,
	cache: Arc<dyn TokenCache>,
	authorizer: Authorizer<T>,
	credentials: Credentials,
	options: ClientOptions,
	token_guard: Arc<AsyncMutex<()>>,
}
impl<T> DocBuild<T>
where
	T: ?Sized + Transport,
{
	/// Creates a client from caller-provided collaborators.
	///
	/// The options are validated and the resolved base URL is pushed to `transport`.
	pub fn with_parts(
		credentials: Credentials,
		options: ClientOptions,
		transport: impl Into<Arc<T>>,
		cache: Arc<dyn TokenCache>,
	) -> Result<Self> {
		let transport = transport.into();

		transport.set_base_url(options.resolve_base_url()?);

		Ok(Self {
			authorizer: Authorizer::new(transport.clone()),
			transport,
			cache,
			credentials,
			options,
			token_guard: Default::default(),
		})
	}

	/// Replaces the client id used by later authorizations.
	pub fn set_client_id(&mut self, client_id: impl Into<String>) {
		self.credentials.set_client_id(client_id);
	}

	/// Replaces the client secret used by later authorizations.
	pub fn set_client_secret(&mut self, client_secret: impl Into<ClientSecret>) {
		self.credentials.set_client_secret(client_secret);
	}

	/// Replaces the options after validating them.
	///
	/// The new base URL is pushed to the transport, which clones of this client share. On
	/// failure the current options stay in place.
	pub fn set_options(&mut self, options: ClientOptions) -> Result<()> {
		self.transport.set_base_url(options.resolve_base_url()?);
		self.options = options;

		Ok(())
	}

	/// Current options.
	pub fn options(&self) -> &ClientOptions {
		&self.options
	}

	/// Current credentials.
	pub fn credentials(&self) -> &Credentials {
		&self.credentials
	}

	/// Transport executing every request.
	pub fn transport(&self) -> &Arc<T> {
		&self.transport
	}

	/// Cache holding the access token.
	pub fn cache(&self) -> &Arc<dyn TokenCache> {
		&self.cache
	}

	/// Status code of the most recent response, if one was received.
	pub fn last_status_code(&self) -> Option<u16> {
		self.transport.last_response().map(|meta| meta.status)
	}

	/// Headers of the most recent response, if one was received.
	pub fn last_response_headers(&self) -> Option<BTreeMap<String, Vec<String>>> {
		self.transport.last_response().map(|meta| meta.headers)
	}

	/// Requests a fresh access token without consulting or updating the cache.
	pub async fn authorize(&self) -> Result<AccessToken> {
		self.authorizer.authorize(&self.credentials).await
	}
}
#[cfg(feature = "reqwest")]
impl DocBuild<ReqwestTransport> {
	/// Creates a client backed by reqwest and a [`FileCache`].
	///
	/// The cache lives in [`ClientOptions::cache_dir`], falling back to
	/// [`FileCache::default_dir`].
	pub fn new(
		client_id: impl Into<String>,
		client_secret: impl Into<ClientSecret>,
		options: ClientOptions,
	) -> Result<Self> {
		let client = ReqwestClient::builder().build().map_err(ConfigError::from)?;
		let dir = options.cache_dir.clone().unwrap_or_else(FileCache::default_dir);
		let cache = FileCache::open(dir)?;

		Self::with_parts(
			Credentials::new(client_id, client_secret),
			options,
			ReqwestTransport::with_client(client),
			Arc::new(cache),
		)
	}
}
impl<T> Clone for DocBuild<T>
where
	T: ?Sized + Transport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			cache: self.cache.clone(),
			authorizer: self.authorizer.clone(),
			credentials: self.credentials.clone(),
			options: self.options.clone(),
			token_guard: self.token_guard.clone(),
		}
	}
}
impl<T> Debug for DocBuild<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DocBuild")
			.field("credentials", &self.credentials)
			.field("options", &self.options)
			.finish()
	}
}
