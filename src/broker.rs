//! Single-flight token broker.
//!
//! A [`TokenBroker`] owns exactly one cached credential. Callers go through
//! [`TokenBroker::acquire`] (errors propagate) or [`TokenBroker::acquire_safe`] (errors
//! degrade to `None`). A valid cached token is returned without suspending; on a miss the
//! first caller starts a bounded request in a background task and every caller that misses
//! while it runs attaches to the same result instead of issuing its own request.

mod acquire;
mod metrics;
mod request;

pub use metrics::BrokerMetrics;
pub use request::AcquireRequest;

// crates.io
use tokio::sync::watch;
// self
use crate::{
	_prelude::*,
	cache::{CachedToken, TokenCache},
	config::BrokerConfig,
	http::TokenHttpClient,
	token::TokenSecret,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport.
pub type ReqwestBroker = TokenBroker<ReqwestHttpClient>;

type Outcome = Result<TokenSecret>;
type OutcomeReceiver = watch::Receiver<Option<Outcome>>;

/// Lifecycle of the current miss epoch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrokerState {
	/// No request is running.
	Idle,
	/// A request is running; new misses attach to it.
	Requesting,
}

/// Coordinates acquisition of a single short-lived token.
///
/// The broker is a cheap handle around shared state; clone it to hand the same cache to
/// several consumers. Independent brokers never share state.
pub struct TokenBroker<C>
where
	C: ?Sized + TokenHttpClient,
{
	inner: Arc<BrokerInner<C>>,
}
impl<C> TokenBroker<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates a broker that uses the caller-provided transport.
	pub fn with_http_client(config: BrokerConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			inner: Arc::new(BrokerInner {
				http_client: http_client.into(),
				config,
				cache: TokenCache::default(),
				in_flight: Mutex::new(None),
				metrics: BrokerMetrics::default(),
			}),
		}
	}

	/// Configuration the broker was built with.
	pub fn config(&self) -> &BrokerConfig {
		&self.inner.config
	}

	/// Counters describing how acquisitions were served.
	pub fn metrics(&self) -> &BrokerMetrics {
		&self.inner.metrics
	}

	/// Reports whether a request is currently running.
	pub fn state(&self) -> BrokerState {
		if self.inner.in_flight.lock().is_some() {
			BrokerState::Requesting
		} else {
			BrokerState::Idle
		}
	}

	/// Returns the cached entry if it is still valid.
	pub fn cached(&self) -> Option<CachedToken> {
		self.inner.cache.snapshot(Instant::now())
	}

	/// Drops the cached token so the next acquisition starts a new request.
	///
	/// A request that is already running is not affected and will repopulate the cache when it
	/// succeeds. Returns `true` if an entry was removed.
	pub fn invalidate(&self) -> bool {
		self.inner.cache.clear().is_some()
	}
}
#[cfg(feature = "reqwest")]
impl TokenBroker<ReqwestHttpClient> {
	/// Creates a new broker backed by a default reqwest client with redirects disabled.
	pub fn new(config: BrokerConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::try_default()?;

		Ok(Self::with_http_client(config, http_client))
	}
}
impl<C> Clone for TokenBroker<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner) }
	}
}
impl<C> Debug for TokenBroker<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenBroker")
			.field("config", &self.inner.config)
			.field("state", &self.state())
			.field("cached", &self.cached().is_some())
			.finish()
	}
}

struct BrokerInner<C>
where
	C: ?Sized + TokenHttpClient,
{
	http_client: Arc<C>,
	config: BrokerConfig,
	cache: TokenCache,
	/// Receiver of the running epoch; `Some` exactly while a request is in flight.
	in_flight: Mutex<Option<OutcomeReceiver>>,
	metrics: BrokerMetrics,
}
