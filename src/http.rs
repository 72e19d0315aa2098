//! Transport primitives for doc.build API calls.
//!
//! The module exposes [`Transport`] alongside [`ApiRequest`], [`ResponseBody`], and
//! [`ResponseMetadata`] so downstream crates can plug in custom HTTP stacks. Implementations
//! must report failures through the client taxonomy: [`Error::TokenExpired`] when the server
//! rejects a stale access token, [`Error::Unauthorized`] when credentials are refused, and
//! [`Error::Http`] for every other non-2xx response. Successful calls hand back an
//! [`ApiResponse`] carrying that response's own metadata; the transport additionally records
//! the most recent metadata so [`Transport::last_response`] can report it.

pub mod classify;
pub mod params;
#[cfg(feature = "reqwest")] pub mod transport;

pub use classify::*;
pub use params::*;
#[cfg(feature = "reqwest")] pub use transport::*;

// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`Transport::execute`].
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to execute doc.build requests.
///
/// The trait is the client's only dependency on an HTTP implementation. Implementations
/// must be `Send + Sync + 'static` so one transport can back several clients, and the
/// futures they return must be `Send`.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sets the base URL every resource path is resolved against.
	fn set_base_url(&self, url: Url);

	/// Dispatches a request and returns the metadata and decoded body of a 2xx response.
	///
	/// # Metadata Contract
	///
	/// - Clear any previously recorded metadata before doing anything else, including request
	///   validation.
	/// - Record [`ResponseMetadata`] for every response that arrives, successful or not, before
	///   the future resolves.
	/// - Callers that must judge a specific response read [`ApiResponse::metadata`]; the shared
	///   record may already belong to a concurrent call.
	fn execute<'a>(&'a self, request: &'a ApiRequest) -> TransportFuture<'a, ApiResponse>;

	/// Returns the metadata captured for the most recent response, if any.
	fn last_response(&self) -> Option<ResponseMetadata>;
}

/// HTTP methods used by the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
}
impl Method {
	/// Returns the uppercase method label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Transient description of one API call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Resource path relative to the base URL (e.g. `documents/{id}`).
	pub resource: String,
	/// Query (GET) or body (POST) parameters.
	pub params: RequestParams,
	/// Extra request headers.
	pub headers: BTreeMap<String, String>,
}
impl ApiRequest {
	/// Creates a request without parameters or headers.
	pub fn new(method: Method, resource: impl Into<String>) -> Self {
		Self {
			method,
			resource: resource.into(),
			params: RequestParams::default(),
			headers: BTreeMap::new(),
		}
	}

	/// Shorthand for a `GET` request.
	pub fn get(resource: impl Into<String>) -> Self {
		Self::new(Method::Get, resource)
	}

	/// Shorthand for a `POST` request.
	pub fn post(resource: impl Into<String>) -> Self {
		Self::new(Method::Post, resource)
	}

	/// Replaces the parameter map.
	pub fn with_params(mut self, params: RequestParams) -> Self {
		self.params = params;

		self
	}

	/// Replaces the header map.
	pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
		self.headers = headers;

		self
	}

	/// Adds or replaces a single parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		self.params.insert(key, value);

		self
	}
}

/// Decoded body of a successful response, handed to callers untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
	/// JSON document.
	Json(serde_json::Value),
	/// Raw payload for non-JSON responses (e.g. document downloads).
	Binary(Vec<u8>),
	/// Response without a body.
	Empty,
}
impl ResponseBody {
	/// Decodes raw response bytes using the declared content type.
	pub fn decode(status: u16, content_type: Option<&str>, bytes: &[u8]) -> Result<Self> {
		if bytes.is_empty() {
			return Ok(Self::Empty);
		}
		if content_type.is_some_and(|value| value.to_ascii_lowercase().contains("json")) {
			let mut deserializer = serde_json::Deserializer::from_slice(bytes);
			let value = serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|source| TransportError::Decode { source, status })?;

			return Ok(Self::Json(value));
		}

		Ok(Self::Binary(bytes.to_vec()))
	}

	/// Returns the JSON document, if the body is one.
	pub fn as_json(&self) -> Option<&serde_json::Value> {
		match self {
			Self::Json(value) => Some(value),
			_ => None,
		}
	}

	/// Consumes the body and returns the JSON document, if it is one.
	pub fn into_json(self) -> Option<serde_json::Value> {
		match self {
			Self::Json(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the raw payload, if the body is binary.
	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			Self::Binary(bytes) => Some(bytes),
			_ => None,
		}
	}
}
impl From<serde_json::Value> for ResponseBody {
	fn from(value: serde_json::Value) -> Self {
		Self::Json(value)
	}
}

/// A successful response paired with the metadata it arrived with.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
	/// Status and headers of this response.
	pub metadata: ResponseMetadata,
	/// Decoded payload.
	pub body: ResponseBody,
}

/// Status and headers captured from the most recent HTTP response.
///
/// Header names are stored lowercase; repeated headers keep every value in arrival order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code.
	pub status: u16,
	/// Response headers keyed by lowercase name.
	pub headers: BTreeMap<String, Vec<String>>,
}
impl ResponseMetadata {
	/// Returns every value of the named header (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&[String]> {
		self.headers.get(&name.to_ascii_lowercase()).map(Vec::as_slice)
	}
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between a transport and its callers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	///
	/// Transports invoke this before performing a request so metadata from an earlier call
	/// never describes a newer one.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}

	/// Returns a copy of the captured metadata without consuming it.
	pub fn get(&self) -> Option<ResponseMetadata> {
		self.0.lock().clone()
	}
}

/// Resolves `resource` against `base`, treating the base path as a directory.
pub fn join_resource(base: &Url, resource: &str) -> Result<Url, ConfigError> {
	let mut base = base.clone();

	if !base.path().ends_with('/') {
		let path = format!("{}/", base.path());

		base.set_path(&path);
	}

	base.join(resource.trim_start_matches('/'))
		.map_err(|source| ConfigError::InvalidResource { resource: resource.to_owned(), source })
}
