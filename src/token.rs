//! Token secret wrapper and the wire shape of the token endpoint's response.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Success body returned by the token endpoint.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
	token: TokenSecret,
}
impl TokenResponse {
	/// Parses a response body, reporting the failing JSON path when the `token` field is
	/// missing or not a string.
	pub(crate) fn parse(status: u16, body: &[u8]) -> Result<TokenSecret> {
		let de = &mut serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize::<_, Self>(de)
			.map(|response| response.token)
			.map_err(|e| Error::MalformedResponse { status, source: Arc::new(e) })
	}
}
