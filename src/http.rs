//! Transport primitives for token acquisition.
//!
//! The module exposes [`TokenHttpClient`] so downstream crates can plug in their own HTTP
//! stack. The broker only ever issues one kind of call: a `GET` against the configured token
//! endpoint, optionally authenticated with the caller's bearer credential. Status
//! classification and body parsing stay inside the broker so every transport reports the
//! same error taxonomy.

// self
use crate::{_prelude::*, error::TransportError};

/// Largest response body a transport should keep; anything beyond it is dropped unread.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Boxed future returned by [`TokenHttpClient::get`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenHttpResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of fetching a token.
///
/// Implementations must be `Send + Sync + 'static` because the broker moves a shared handle
/// into a spawned task for every acquisition epoch. Dropping the returned future must abort
/// the request; the broker relies on this to abandon calls that exceed the timeout.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Performs a `GET` request and returns the raw status and body.
	///
	/// Non-success statuses are not errors at this layer. Bodies should be capped at
	/// [`MAX_BODY_BYTES`].
	fn get(&self, request: TokenHttpRequest) -> HttpFuture<'_>;
}

/// Outbound token request.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenHttpRequest {
	/// Absolute URL of the token endpoint.
	pub url: Url,
	/// Caller credential sent as `Authorization: Bearer <value>`; no header when absent.
	pub bearer: Option<String>,
}
impl TokenHttpRequest {
	/// Returns the `Authorization` header value, if the request carries a bearer credential.
	pub fn authorization(&self) -> Option<String> {
		self.bearer.as_ref().map(|bearer| format!("Bearer {bearer}"))
	}
}
impl Debug for TokenHttpRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenHttpRequest")
			.field("url", &self.url.as_str())
			.field("bearer_set", &self.bearer.is_some())
			.finish()
	}
}

/// Raw response captured by a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenHttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}
impl TokenHttpResponse {
	/// Creates a response from a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Returns a lossy, length-capped preview of the body for error messages.
	pub fn body_preview(&self) -> String {
		const LIMIT: usize = 256;

		let text = String::from_utf8_lossy(&self.body);

		match text.char_indices().nth(LIMIT) {
			Some((idx, _)) => format!("{}...", &text[..idx]),
			None => text.into_owned(),
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The token endpoint is expected to answer directly; configure any custom
/// [`ReqwestClient`] to disable redirect following so bearer credentials are never replayed
/// against another origin.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds the default client with redirects disabled.
	pub fn try_default() -> Result<Self, crate::error::ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	fn get(&self, request: TokenHttpRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let mut builder = self.0.get(request.url.clone());

			if let Some(value) = request.authorization() {
				builder = builder.header(reqwest::header::AUTHORIZATION, value);
			}

			let mut response = builder.send().await?;
			let status = response.status().as_u16();
			let mut body = Vec::new();

			while let Some(chunk) = response.chunk().await? {
				let room = MAX_BODY_BYTES - body.len();

				if chunk.len() >= room {
					body.extend_from_slice(&chunk[..room]);

					break;
				}

				body.extend_from_slice(&chunk);
			}

			Ok(TokenHttpResponse { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn authorization_header_only_with_bearer() {
		let url = Url::parse("https://api.example.com/token").expect("Test URL should parse.");
		let anonymous = TokenHttpRequest { url: url.clone(), bearer: None };
		let signed = TokenHttpRequest { url, bearer: Some("user-jwt".into()) };

		assert_eq!(anonymous.authorization(), None);
		assert_eq!(signed.authorization().as_deref(), Some("Bearer user-jwt"));
		assert!(!format!("{signed:?}").contains("user-jwt"));
	}

	#[test]
	fn body_preview_is_capped() {
		let response = TokenHttpResponse::new(500, "x".repeat(1_000));
		let preview = response.body_preview();

		assert!(!response.is_success());
		assert_eq!(preview.len(), 259);
		assert!(preview.ends_with("..."));
		assert!(TokenHttpResponse::new(204, Vec::new()).is_success());
	}
}
