// self
use crate::_prelude::*;

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedAcquire<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedAcquire<F> = F;

/// A span builder used around acquisitions and epoch tasks.
#[derive(Clone, Debug)]
pub struct AcquireSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl AcquireSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("token_broker.acquire", stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedAcquire<Fut>
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

/// Emits a debug event when a caller starts a new acquisition epoch.
pub fn log_epoch_started(endpoint: &Url) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(endpoint = endpoint.as_str(), "starting token request");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = endpoint;
	}
}

/// Emits a debug event when an acquisition epoch settles.
pub fn log_epoch_finished(error: Option<&Error>, elapsed: Duration) {
	#[cfg(feature = "tracing")]
	{
		let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

		match error {
			None => tracing::debug!(elapsed_ms, "token request succeeded"),
			Some(e) => tracing::debug!(elapsed_ms, error = %e, "token request failed"),
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (error, elapsed);
	}
}

/// Emits a warning for an error that `acquire_safe` is about to discard.
pub fn log_swallowed(error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %error, "token acquisition failed; continuing without a token");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn log_helpers_noop_without_subscriber() {
		log_swallowed(&Error::Interrupted);
		log_epoch_finished(Some(&Error::Interrupted), Duration::from_millis(3));
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = AcquireSpan::new("instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
