//! Client-level error types shared by the executor, transports, caches, and the facade.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Callers match on the variant instead of inspecting messages. Only
/// [`Error::TokenExpired`] is ever intercepted by the client itself; every other variant
/// reaches the caller exactly as the failing component produced it.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token cache failure.
	#[error(transparent)]
	Cache(#[from] crate::cache::CacheError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Attached file cannot be used; raised before any network I/O.
	#[error(transparent)]
	File(#[from] crate::file::FileError),
	/// Transport failure (DNS, TCP, TLS, undecodable body).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint answered without a usable access token.
	#[error("Authorization failed: {reason}.")]
	Authorization {
		/// HTTP status observed on the token endpoint, when one was recorded.
		status: Option<u16>,
		/// Human-readable summary of the failure.
		reason: String,
	},
	/// A previously issued access token was rejected as expired.
	#[error("Access token has expired: {reason}.")]
	TokenExpired {
		/// Server-supplied reason string.
		reason: String,
	},
	/// The server rejected the supplied credentials.
	#[error("Request was not authorized (HTTP {status}): {reason}.")]
	Unauthorized {
		/// HTTP status code, usually 401.
		status: u16,
		/// Server-supplied reason string.
		reason: String,
	},
	/// Any other non-2xx response.
	#[error("API request failed (HTTP {status}): {reason}.")]
	Http {
		/// HTTP status code.
		status: u16,
		/// Server-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Returns the HTTP status carried by the error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Authorization { status, .. } => *status,
			Self::Unauthorized { status, .. } | Self::Http { status, .. } => Some(*status),
			Self::Transport(TransportError::Decode { status, .. }) => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` for [`Error::TokenExpired`].
	pub fn is_token_expired(&self) -> bool {
		matches!(self, Self::TokenExpired { .. })
	}
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Client options could not be parsed.
	#[error("Client options are invalid at `{}`.", .source.path())]
	InvalidOptions {
		/// Structured parsing failure, including the offending option path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Base URL cannot be parsed or cannot carry resource paths.
	#[error("Base URL `{value}` is invalid.")]
	InvalidBaseUrl {
		/// Rejected value.
		value: String,
		/// Underlying parsing failure, when parsing itself failed.
		#[source]
		source: Option<url::ParseError>,
	},
	/// Resource path could not be joined onto the base URL.
	#[error("Resource `{resource}` cannot be resolved against the base URL.")]
	InvalidResource {
		/// Rejected resource path.
		resource: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Identifier validation failed.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::document::IdentifierError),
	/// Parameter kind cannot be encoded for the request method.
	#[error("Parameter `{key}` cannot be sent with a {method} request.")]
	UnsupportedParam {
		/// Parameter name.
		key: String,
		/// Method label.
		method: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, decoding).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
	/// Response declared JSON but could not be parsed.
	#[error("API returned malformed JSON.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
