// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for acquisitions served by one broker.
#[derive(Debug, Default)]
pub struct BrokerMetrics {
	hits: AtomicU64,
	attached: AtomicU64,
	requests: AtomicU64,
	request_successes: AtomicU64,
	request_failures: AtomicU64,
	swallowed: AtomicU64,
}
impl BrokerMetrics {
	/// Acquisitions served from the cache.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Acquisitions that attached to a request started by another caller.
	pub fn attached(&self) -> u64 {
		self.attached.load(Ordering::Relaxed)
	}

	/// Token requests sent to the endpoint.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Token requests that produced a token.
	pub fn request_successes(&self) -> u64 {
		self.request_successes.load(Ordering::Relaxed)
	}

	/// Token requests that failed (status, timeout, transport, or body).
	pub fn request_failures(&self) -> u64 {
		self.request_failures.load(Ordering::Relaxed)
	}

	/// Errors discarded by `acquire_safe`.
	pub fn swallowed(&self) -> u64 {
		self.swallowed.load(Ordering::Relaxed)
	}

	pub(crate) fn record_hit(&self) {
		self.hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_attached(&self) {
		self.attached.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_request_outcome(&self, success: bool) {
		if success {
			self.request_successes.fetch_add(1, Ordering::Relaxed);
		} else {
			self.request_failures.fetch_add(1, Ordering::Relaxed);
		}
	}

	pub(crate) fn record_swallowed(&self) {
		self.swallowed.fetch_add(1, Ordering::Relaxed);
	}
}
