// self
use crate::obs::{OperationKind, OperationOutcome, TokenEvent, trace_token_event};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_operation_outcome(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"docbuild_operation_total",
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records a token lifecycle transition as a counter and a trace event.
pub fn record_token_event(event: TokenEvent) {
	trace_token_event(event);

	#[cfg(feature = "metrics")]
	{
		metrics::counter!("docbuild_token_event_total", "event" => event.as_str()).increment(1);
	}
}
