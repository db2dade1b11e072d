// self
use crate::_prelude::*;

/// Per-call acquisition parameters.
///
/// The TTL override only applies when this call starts a new request; callers that attach to
/// a running request share the initiator's result and lifetime.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AcquireRequest {
	/// Caller credential used to authenticate the token request.
	pub bearer: Option<String>,
	/// Lifetime override for a freshly fetched token.
	pub ttl: Option<Duration>,
}
impl AcquireRequest {
	/// Creates an anonymous request using the configured TTL.
	pub fn new() -> Self {
		Self::default()
	}

	/// Authenticates the token request with the caller's bearer credential.
	pub fn with_bearer(mut self, bearer: impl Into<String>) -> Self {
		self.bearer = Some(bearer.into());

		self
	}

	/// Overrides the TTL applied when this call fetches a new token.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = Some(ttl);

		self
	}
}
impl Debug for AcquireRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AcquireRequest")
			.field("bearer_set", &self.bearer.is_some())
			.field("ttl", &self.ttl)
			.finish()
	}
}
