//! Single-slot token cache with lazy expiry checks.
//!
//! The cache never runs timers: a stale entry stays in memory until the next read observes
//! `now >= expires_at` and treats it as absent, or until a successful acquisition overwrites
//! it.

// self
use crate::{_prelude::*, token::TokenSecret};

/// Longest lifetime an entry can have; larger TTLs are clamped to it.
pub const MAX_LIFETIME: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Token held by a broker together with its effective expiry.
#[derive(Clone)]
pub struct CachedToken {
	/// Cached credential; callers must avoid logging it.
	pub value: TokenSecret,
	/// Wall-clock instant the token was received, for diagnostics.
	pub issued_at: OffsetDateTime,
	/// Monotonic instant after which the token is treated as absent.
	pub expires_at: Instant,
}
impl CachedToken {
	/// Builds a cache entry received at `now`, valid for `ttl` minus the `skew` margin.
	///
	/// A skew at least as long as the TTL yields an entry that is already expired. The
	/// lifetime is clamped to [`MAX_LIFETIME`], so `Duration::MAX` reads as "until restart".
	pub fn new(value: TokenSecret, now: Instant, ttl: Duration, skew: Duration) -> Self {
		let lifetime = ttl.saturating_sub(skew).min(MAX_LIFETIME);
		let expires_at = now.checked_add(lifetime).unwrap_or(now);

		Self { value, issued_at: OffsetDateTime::now_utc(), expires_at }
	}

	/// Returns `true` if the entry may still be served at `instant`.
	pub fn is_valid_at(&self, instant: Instant) -> bool {
		instant < self.expires_at
	}

	/// Remaining lifetime at `instant`, zero once expired.
	pub fn remaining_at(&self, instant: Instant) -> Duration {
		self.expires_at.saturating_duration_since(instant)
	}
}
impl Debug for CachedToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedToken")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Thread-safe slot holding at most one [`CachedToken`].
#[derive(Debug, Default)]
pub struct TokenCache(RwLock<Option<CachedToken>>);
impl TokenCache {
	/// Returns the cached value if it is still valid at `now`.
	pub fn get_valid(&self, now: Instant) -> Option<TokenSecret> {
		self.0
			.read()
			.as_ref()
			.filter(|entry| entry.is_valid_at(now))
			.map(|entry| entry.value.clone())
	}

	/// Returns a copy of the entry if it is still valid at `now`.
	pub fn snapshot(&self, now: Instant) -> Option<CachedToken> {
		self.0.read().as_ref().filter(|entry| entry.is_valid_at(now)).cloned()
	}

	/// Overwrites the slot.
	pub fn store(&self, entry: CachedToken) {
		*self.0.write() = Some(entry);
	}

	/// Empties the slot, returning the previous entry.
	pub fn clear(&self) -> Option<CachedToken> {
		self.0.write().take()
	}
}
