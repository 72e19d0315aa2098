//! Client options and their validation.

// self
use crate::{_prelude::*, error::ConfigError};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "http://api.doc.build/";

/// Options resolved once per client (and again whenever they are replaced).
///
/// Parsing from JSON rejects unknown keys so misspelled options fail loudly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientOptions {
	/// Re-authorize and retry once when the server reports the access token as expired.
	/// When disabled the expiry is surfaced and the cached token is dropped.
	pub token_refresh: bool,
	/// API root every resource path is resolved against.
	pub base_url: String,
	/// Directory for the default file-backed token cache; defaults to
	/// [`FileCache::default_dir`](crate::cache::FileCache::default_dir).
	pub cache_dir: Option<PathBuf>,
}
impl ClientOptions {
	/// Parses options from a JSON value.
	pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
		serde_path_to_error::deserialize(value)
			.map_err(|source| ConfigError::InvalidOptions { source })
	}

	/// Overrides the token refresh flag.
	pub fn with_token_refresh(mut self, token_refresh: bool) -> Self {
		self.token_refresh = token_refresh;

		self
	}

	/// Overrides the API root.
	pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
		self.base_url = base_url.into();

		self
	}

	/// Overrides the file cache directory.
	pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.cache_dir = Some(dir.into());

		self
	}

	/// Parses and validates the base URL.
	pub fn resolve_base_url(&self) -> Result<Url, ConfigError> {
		let url = Url::parse(&self.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
			value: self.base_url.clone(),
			source: Some(source),
		})?;

		if url.cannot_be_a_base() {
			return Err(ConfigError::InvalidBaseUrl { value: self.base_url.clone(), source: None });
		}

		Ok(url)
	}
}
impl Default for ClientOptions {
	fn default() -> Self {
		Self { token_refresh: true, base_url: DEFAULT_BASE_URL.to_owned(), cache_dir: None }
	}
}
impl FromStr for ClientOptions {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let mut deserializer = serde_json::Deserializer::from_str(s);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| ConfigError::InvalidOptions { source })
	}
}
