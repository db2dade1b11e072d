//! Optional observability helpers for token acquisition.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `token_broker.acquire` with a `stage`
//!   field (`attach` or `initiate` around a suspended caller, `request` around the epoch
//!   task). Cache hits never suspend and get no span; they are only counted. Epoch
//!   start/finish emit debug events and every error swallowed by `acquire_safe` emits a
//!   warning.
//! - Enable `metrics` to increment the `token_broker_acquire_total` counter labeled by `path`
//!   and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Route an acquisition took through the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AcquirePath {
	/// Served from the cache without suspending; counted but never wrapped in a span.
	Hit,
	/// Attached to an in-flight request started by another caller.
	Attach,
	/// Started a new request.
	Initiate,
}
impl AcquirePath {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AcquirePath::Hit => "hit",
			AcquirePath::Attach => "attach",
			AcquirePath::Initiate => "initiate",
		}
	}
}
impl Display for AcquirePath {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AcquireOutcome {
	/// Entry to the broker.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl AcquireOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AcquireOutcome::Attempt => "attempt",
			AcquireOutcome::Success => "success",
			AcquireOutcome::Failure => "failure",
		}
	}
}
impl Display for AcquireOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
