// self
use crate::obs::{AcquireOutcome, AcquirePath};

/// Records an acquisition outcome via the global metrics recorder (when enabled).
pub fn record_acquire_outcome(path: AcquirePath, outcome: AcquireOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"token_broker_acquire_total",
			"path" => path.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (path, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_acquire_outcome_noop_without_metrics() {
		record_acquire_outcome(AcquirePath::Attach, AcquireOutcome::Failure);
	}
}
