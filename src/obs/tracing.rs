// self
use crate::{
	_prelude::*,
	obs::{OperationKind, TokenEvent},
};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// A span builder used by client operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + resource.
	pub fn new(kind: OperationKind, resource: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("docbuild.operation", operation = kind.as_str(), resource);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, resource);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event for a token lifecycle transition (when tracing is enabled).
pub fn trace_token_event(event: TokenEvent) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(event = event.as_str(), "access token lifecycle");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = event;
	}
}
