//! Acquisition path: cache fast path, single-flight epoch claim, and the bounded request.
//!
//! The create-vs-attach decision happens under the `in_flight` mutex and never awaits. The
//! initiator spawns the request as its own task, so dropping any caller's future (including
//! the initiator's) never cancels the shared request. The epoch task writes the cache and
//! clears the slot in one critical section, then publishes the outcome; a drop guard clears
//! the slot if the task dies before reaching that point.

// crates.io
use tokio::{runtime::Handle, sync::watch};
// self
use crate::{
	_prelude::*,
	broker::{AcquireRequest, BrokerInner, Outcome, OutcomeReceiver, TokenBroker},
	cache::CachedToken,
	http::{TokenHttpClient, TokenHttpRequest, TokenHttpResponse},
	obs::{self, AcquireOutcome, AcquirePath, AcquireSpan},
	token::{TokenResponse, TokenSecret},
};

enum Claim {
	Hit(TokenSecret),
	Attach(OutcomeReceiver),
	Initiate(OutcomeReceiver),
}

impl<C> TokenBroker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Returns the cached token or fetches a new one, propagating failures.
	///
	/// Concurrent callers that miss the cache while a request is running receive that
	/// request's outcome; at most one request is in flight per broker.
	///
	/// Cache hits work under any executor. Starting a request needs a Tokio runtime and fails
	/// with [`Error::NoRuntime`] otherwise.
	pub async fn acquire(&self, request: AcquireRequest) -> Result<TokenSecret> {
		let (path, receiver) = match self.claim(request)? {
			Claim::Hit(secret) => {
				self.inner.metrics.record_hit();
				obs::record_acquire_outcome(AcquirePath::Hit, AcquireOutcome::Attempt);
				obs::record_acquire_outcome(AcquirePath::Hit, AcquireOutcome::Success);

				return Ok(secret);
			},
			Claim::Attach(receiver) => {
				self.inner.metrics.record_attached();

				(AcquirePath::Attach, receiver)
			},
			Claim::Initiate(receiver) => (AcquirePath::Initiate, receiver),
		};

		obs::record_acquire_outcome(path, AcquireOutcome::Attempt);

		let result = AcquireSpan::new(path.as_str()).instrument(wait_for_outcome(receiver)).await;

		match &result {
			Ok(_) => obs::record_acquire_outcome(path, AcquireOutcome::Success),
			Err(_) => obs::record_acquire_outcome(path, AcquireOutcome::Failure),
		}

		result
	}

	/// Same as [`acquire`](Self::acquire) but degrades every failure to `None`.
	///
	/// Discarded errors are counted in
	/// [`BrokerMetrics::swallowed`](crate::broker::BrokerMetrics::swallowed) and logged at
	/// `warn` when the `tracing` feature is enabled.
	pub async fn acquire_safe(&self, request: AcquireRequest) -> Option<TokenSecret> {
		match self.acquire(request).await {
			Ok(secret) => Some(secret),
			Err(e) => {
				self.inner.metrics.record_swallowed();
				obs::log_swallowed(&e);

				None
			},
		}
	}

	fn claim(&self, request: AcquireRequest) -> Result<Claim> {
		if let Some(secret) = self.inner.cache.get_valid(Instant::now()) {
			return Ok(Claim::Hit(secret));
		}

		let runtime = Handle::try_current().map_err(|_| Error::NoRuntime)?;
		let mut slot = self.inner.in_flight.lock();

		// An epoch may have settled between the fast path and taking the lock.
		if let Some(secret) = self.inner.cache.get_valid(Instant::now()) {
			return Ok(Claim::Hit(secret));
		}
		if let Some(receiver) = slot.as_ref() {
			return Ok(Claim::Attach(receiver.clone()));
		}

		let (sender, receiver) = watch::channel(None);

		*slot = Some(receiver.clone());

		drop(slot);

		let inner = Arc::clone(&self.inner);
		let ttl = request.ttl.unwrap_or(inner.config.ttl);
		let guard = EpochGuard { inner: Arc::clone(&inner), armed: true };

		let epoch = run_epoch(inner, guard, sender, request.bearer, ttl);

		runtime.spawn(AcquireSpan::new("request").instrument(epoch));

		Ok(Claim::Initiate(receiver))
	}
}

impl<C> BrokerInner<C>
where
	C: ?Sized + TokenHttpClient,
{
	async fn fetch(&self, bearer: Option<String>) -> Outcome {
		let url = self.config.token_endpoint()?;
		let timeout = self.config.request_timeout;

		obs::log_epoch_started(&url);
		self.metrics.record_request();

		let request = TokenHttpRequest { url, bearer };

		// Dropping the transport future on timeout aborts the request.
		match tokio::time::timeout(timeout, self.http_client.get(request)).await {
			Ok(Ok(response)) => classify(response),
			Ok(Err(e)) => Err(e.into()),
			Err(_) => Err(Error::Timeout { after: timeout }),
		}
	}

	/// Writes the cache on success and closes the epoch in one critical section.
	fn settle(&self, outcome: &Outcome, ttl: Duration) {
		let mut slot = self.in_flight.lock();

		if let Ok(secret) = outcome {
			self.cache.store(CachedToken::new(
				secret.clone(),
				Instant::now(),
				ttl,
				self.config.clock_skew,
			));
		}

		*slot = None;
	}
}

/// Clears the in-flight slot if the epoch task ends without settling.
struct EpochGuard<C>
where
	C: ?Sized + TokenHttpClient,
{
	inner: Arc<BrokerInner<C>>,
	armed: bool,
}
impl<C> Drop for EpochGuard<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn drop(&mut self) {
		if self.armed {
			*self.inner.in_flight.lock() = None;
		}
	}
}

async fn run_epoch<C>(
	inner: Arc<BrokerInner<C>>,
	mut guard: EpochGuard<C>,
	sender: watch::Sender<Option<Outcome>>,
	bearer: Option<String>,
	ttl: Duration,
) where
	C: ?Sized + TokenHttpClient,
{
	let started = Instant::now();
	let outcome = inner.fetch(bearer).await;

	inner.metrics.record_request_outcome(outcome.is_ok());
	obs::log_epoch_finished(outcome.as_ref().err(), started.elapsed());
	inner.settle(&outcome, ttl);

	guard.armed = false;

	// `send_replace` stores the value even when every waiter has gone away.
	sender.send_replace(Some(outcome));
}

async fn wait_for_outcome(mut receiver: OutcomeReceiver) -> Outcome {
	match receiver.wait_for(Option::is_some).await {
		Ok(outcome) => outcome.clone().unwrap_or(Err(Error::Interrupted)),
		Err(_) => Err(Error::Interrupted),
	}
}

fn classify(response: TokenHttpResponse) -> Outcome {
	match response.status {
		_ if response.is_success() => TokenResponse::parse(response.status, &response.body),
		401 | 403 => Err(Error::Unauthorized { status: response.status }),
		status => Err(Error::ServerError { status, message: response.body_preview() }),
	}
}
