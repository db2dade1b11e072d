//! Broker-level error types shared by the acquisition path, transports, and configuration.
//!
//! Every variant is [`Clone`] because a single acquisition outcome is fanned out to all
//! callers attached to the same in-flight request; boxed sources are therefore kept behind
//! [`Arc`].

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Token endpoint did not answer within the request timeout.
	#[error("Token endpoint did not respond within {after:?}.")]
	Timeout {
		/// Timeout that elapsed.
		after: Duration,
	},
	/// Token endpoint rejected the caller's credential.
	#[error("Token endpoint rejected the credential with HTTP {status}.")]
	Unauthorized {
		/// HTTP status code (401 or 403).
		status: u16,
	},
	/// Token endpoint answered with a non-success status.
	#[error("Token endpoint returned HTTP {status}: {message}.")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Truncated response body, for diagnostics.
		message: String,
	},
	/// Token endpoint responded with a body that does not carry a token.
	#[error("Token endpoint returned a malformed response.")]
	MalformedResponse {
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_path_to_error::Error<serde_json::Error>>,
	},
	/// A request had to be started outside a Tokio runtime.
	#[error("Token acquisition needs a Tokio runtime to start a request.")]
	NoRuntime,
	/// The acquisition task ended without publishing an outcome.
	#[error("Token acquisition was interrupted before completing.")]
	Interrupted,
}
impl Error {
	/// Returns the HTTP status attached to the error, when one was observed.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Unauthorized { status }
			| Self::ServerError { status, .. }
			| Self::MalformedResponse { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` for failures caused by the request timeout.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}
}

/// Configuration and validation failures raised while building a broker.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// API base or token path cannot form a valid endpoint URL.
	#[error("Token endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// API base uses a scheme other than HTTP(S).
	#[error("The API base must use HTTP or HTTPS: {url}.")]
	UnsupportedScheme {
		/// API base URL that failed validation.
		url: String,
	},
	/// Request timeout is zero.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
	/// Clock skew margin is shorter than the supported minimum.
	#[error("Clock skew margin ({skew:?}) must be at least {minimum:?}.")]
	SkewBelowMinimum {
		/// Configured clock skew margin.
		skew: Duration,
		/// Smallest accepted margin.
		minimum: Duration,
	},
	/// Clock skew margin swallows the whole TTL.
	#[error("Clock skew margin ({skew:?}) must be shorter than the token TTL ({ttl:?}).")]
	SkewExceedsTtl {
		/// Configured TTL.
		ttl: Duration,
		/// Configured clock skew margin.
		skew: Duration,
	},
	/// Serialized configuration could not be parsed.
	#[error("Broker configuration is invalid at `{path}`.")]
	Parse {
		/// JSON path of the offending field.
		path: String,
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_json::Error>,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for ConfigError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Parse { path, source: Arc::new(e.into_inner()) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Clone, Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[source] Arc<std::io::Error>),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}
impl From<std::io::Error> for TransportError {
	fn from(e: std::io::Error) -> Self {
		Self::Io(Arc::new(e))
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
