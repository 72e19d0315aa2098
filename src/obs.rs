//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `docbuild.operation` with the `operation` and
//!   `resource` fields, plus debug events for token lifecycle changes.
//! - Enable `metrics` to increment `docbuild_operation_total` (labeled by `operation` +
//!   `outcome`) and `docbuild_token_event_total` (labeled by `event`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
	/// Client-credentials exchange against the token endpoint.
	Authorize,
	/// Authenticated API call.
	Request,
}
impl OperationKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Authorize => "authorize",
			OperationKind::Request => "request",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationOutcome {
	/// Entry to a client operation.
	Attempt,
	/// An expired token triggered the single automatic retry.
	Retry,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OperationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationOutcome::Attempt => "attempt",
			OperationOutcome::Retry => "retry",
			OperationOutcome::Success => "success",
			OperationOutcome::Failure => "failure",
		}
	}
}
impl Display for OperationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Token lifecycle transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenEvent {
	/// A cached token was reused.
	CacheHit,
	/// No cached token was found; authorization follows.
	CacheMiss,
	/// A freshly issued token was written to the cache.
	Stored,
	/// A token reported as expired was removed from the cache.
	Invalidated,
}
impl TokenEvent {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenEvent::CacheHit => "cache_hit",
			TokenEvent::CacheMiss => "cache_miss",
			TokenEvent::Stored => "stored",
			TokenEvent::Invalidated => "invalidated",
		}
	}
}
impl Display for TokenEvent {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
