//! Failure classification for non-2xx API responses.
//!
//! Classifiers work on a [`FailureContext`] that keeps only primitive data (status code, OAuth
//! fields, body preview), so they stay independent of any HTTP client.

// self
use crate::_prelude::*;

/// Hook that maps a failed response onto the client error taxonomy.
pub trait FailureClassifier: Send + Sync {
	/// Decides which error kind a failed response represents.
	fn classify(&self, ctx: &FailureContext) -> FailureKind;
}

/// Error categories a failed response can map to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
	/// The access token was rejected as expired; the client may re-authorize.
	TokenExpired,
	/// Credentials or token were refused for another reason.
	Unauthorized,
	/// Any other failure.
	Http,
}

/// Context handed to [`FailureClassifier::classify`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureContext {
	/// HTTP status code.
	pub http_status: u16,
	/// OAuth-style `error` field.
	pub oauth_error: Option<String>,
	/// OAuth-style `error_description` field (or a generic `message`).
	pub error_description: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
}
impl FailureContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a context for the provided status code.
	pub fn new(http_status: u16) -> Self {
		Self { http_status, oauth_error: None, error_description: None, body_preview: None }
	}

	/// Builds a context from a raw response body, reading OAuth fields when the body is JSON.
	pub fn from_response(http_status: u16, body: &[u8]) -> Self {
		let mut ctx = Self::new(http_status);

		match serde_json::from_slice::<serde_json::Value>(body) {
			Ok(value) => {
				let field =
					|name: &str| value.get(name).and_then(|v| v.as_str()).map(str::to_owned);

				ctx.oauth_error = field("error");
				ctx.error_description = field("error_description").or_else(|| field("message"));
			},
			Err(_) if !body.is_empty() =>
				ctx = ctx.with_body_preview(String::from_utf8_lossy(body).into_owned()),
			Err(_) => (),
		}

		ctx
	}

	/// Adds the OAuth `error` field.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a body preview for non-JSON payloads.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}

	/// Best human-readable reason available.
	pub fn reason(&self) -> String {
		self.error_description
			.clone()
			.or_else(|| self.oauth_error.clone())
			.or_else(|| self.body_preview.clone())
			.unwrap_or_else(|| format!("HTTP status {}", self.http_status))
	}

	/// Converts the context into the client error for `kind`.
	pub fn into_error(self, kind: FailureKind) -> Error {
		let reason = self.reason();

		match kind {
			FailureKind::TokenExpired => Error::TokenExpired { reason },
			FailureKind::Unauthorized => Error::Unauthorized { status: self.http_status, reason },
			FailureKind::Http => Error::Http { status: self.http_status, reason },
		}
	}
}

/// Default classifier tuned for OAuth2 resource servers.
///
/// An expiry hint (an `expired` wording or an `*_expired` error code) on a 400/401/403 means
/// [`FailureKind::TokenExpired`]. Remaining 401s and client-authentication error codes mean
/// [`FailureKind::Unauthorized`]. Everything else is [`FailureKind::Http`].
#[derive(Debug, Default)]
pub struct DefaultFailureClassifier;
impl FailureClassifier for DefaultFailureClassifier {
	fn classify(&self, ctx: &FailureContext) -> FailureKind {
		if matches!(ctx.http_status, 400 | 401 | 403) && has_expiry_hint(ctx) {
			return FailureKind::TokenExpired;
		}
		if ctx.http_status == 401 || ctx.oauth_error.as_deref().is_some_and(is_client_error) {
			return FailureKind::Unauthorized;
		}

		FailureKind::Http
	}
}

fn has_expiry_hint(ctx: &FailureContext) -> bool {
	let code_hint = ctx.oauth_error.as_deref().is_some_and(|code| {
		code.eq_ignore_ascii_case("token_expired") || code.eq_ignore_ascii_case("expired_token")
	});

	code_hint
		|| [ctx.error_description.as_deref(), ctx.body_preview.as_deref()]
			.into_iter()
			.flatten()
			.any(|text| text.to_ascii_lowercase().contains("expired"))
}

fn is_client_error(code: &str) -> bool {
	code.eq_ignore_ascii_case("invalid_client") || code.eq_ignore_ascii_case("unauthorized_client")
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= FailureContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = String::new();

	for (idx, ch) in body.chars().enumerate() {
		if idx >= FailureContext::BODY_PREVIEW_LIMIT {
			buf.push('…');

			break;
		}
		buf.push(ch);
	}

	buf
}
