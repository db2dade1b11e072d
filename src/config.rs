//! Broker configuration: endpoint location and timing knobs.
//!
//! Build a [`BrokerConfig`] through [`BrokerConfig::builder`] or load one from JSON with
//! [`BrokerConfig::from_json`]; both paths run the same validation.

/// Builder API for assembling broker configurations.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Validated broker configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerConfig {
	/// API base the token path is resolved against.
	pub api_base: Url,
	/// Path of the credential-issuance endpoint, relative to `api_base`.
	pub token_path: String,
	/// Lifetime assigned to a freshly obtained token, before the skew margin.
	pub ttl: Duration,
	/// Upper bound on a single token request.
	pub request_timeout: Duration,
	/// Safety margin subtracted from `ttl` to absorb clock drift against the issuer.
	pub clock_skew: Duration,
}
impl BrokerConfig {
	/// Default token lifetime (10 minutes).
	pub const DEFAULT_TTL: Duration = Duration::from_secs(600);
	/// Default request timeout (5 seconds).
	pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
	/// Default clock skew margin (1 second).
	pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(1);
	/// Smallest clock skew margin accepted by validation.
	pub const MIN_CLOCK_SKEW: Duration = Duration::from_secs(1);
	/// Default path of the token endpoint.
	pub const DEFAULT_TOKEN_PATH: &'static str = "token";

	/// Creates a new builder for the provided API base.
	pub fn builder(api_base: Url) -> BrokerConfigBuilder {
		BrokerConfigBuilder::new(api_base)
	}

	/// Parses and validates a JSON configuration document.
	///
	/// Durations are expressed in milliseconds (`ttl_ms`, `request_timeout_ms`,
	/// `clock_skew_ms`); omitted fields fall back to the defaults.
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(raw);
		let file: BrokerConfigFile = serde_path_to_error::deserialize(de)?;

		file.into_builder().build()
	}

	/// Resolves the absolute URL of the token endpoint.
	pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
		self.api_base
			.join(&self.token_path)
			.map_err(|source| ConfigError::InvalidEndpoint { source })
	}

	/// Returns how long a token fetched now will be served from cache.
	pub fn effective_ttl(&self, ttl: Duration) -> Duration {
		ttl.saturating_sub(self.clock_skew)
	}
}

/// Serialized form of [`BrokerConfig`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BrokerConfigFile {
	api_base: Url,
	#[serde(default)]
	token_path: Option<String>,
	#[serde(default)]
	ttl_ms: Option<u64>,
	#[serde(default)]
	request_timeout_ms: Option<u64>,
	#[serde(default)]
	clock_skew_ms: Option<u64>,
}
impl BrokerConfigFile {
	fn into_builder(self) -> BrokerConfigBuilder {
		let mut builder = BrokerConfigBuilder::new(self.api_base);

		if let Some(path) = self.token_path {
			builder = builder.token_path(path);
		}
		if let Some(ms) = self.ttl_ms {
			builder = builder.ttl(Duration::from_millis(ms));
		}
		if let Some(ms) = self.request_timeout_ms {
			builder = builder.request_timeout(Duration::from_millis(ms));
		}
		if let Some(ms) = self.clock_skew_ms {
			builder = builder.clock_skew(Duration::from_millis(ms));
		}

		builder
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn json_config_applies_defaults() {
		let config = BrokerConfig::from_json(r#"{"api_base":"https://api.example.com/v1/"}"#)
			.expect("Minimal config should load.");

		assert_eq!(config.ttl, BrokerConfig::DEFAULT_TTL);
		assert_eq!(config.request_timeout, BrokerConfig::DEFAULT_REQUEST_TIMEOUT);
		assert_eq!(config.clock_skew, BrokerConfig::DEFAULT_CLOCK_SKEW);
		assert_eq!(
			config.token_endpoint().expect("Endpoint should resolve.").as_str(),
			"https://api.example.com/v1/token"
		);
	}

	#[test]
	fn json_config_overrides_timings() {
		let config = BrokerConfig::from_json(
			r#"{
				"api_base": "http://localhost:8080/",
				"token_path": "auth/stream-token",
				"ttl_ms": 10000,
				"request_timeout_ms": 250,
				"clock_skew_ms": 1000
			}"#,
		)
		.expect("Full config should load.");

		assert_eq!(config.ttl, Duration::from_secs(10));
		assert_eq!(config.request_timeout, Duration::from_millis(250));
		assert_eq!(config.effective_ttl(config.ttl), Duration::from_secs(9));
		assert_eq!(
			config.token_endpoint().expect("Endpoint should resolve.").as_str(),
			"http://localhost:8080/auth/stream-token"
		);
	}

	#[test]
	fn json_config_reports_failing_path() {
		let err =
			BrokerConfig::from_json(r#"{"api_base":"https://api.example.com","ttl_ms":"ten"}"#)
				.expect_err("String TTL should be rejected.");

		assert!(matches!(&err, ConfigError::Parse { path, .. } if path == "ttl_ms"));
	}

	#[test]
	fn json_config_runs_builder_validation() {
		let err = BrokerConfig::from_json(
			r#"{"api_base":"https://api.example.com","ttl_ms":500,"clock_skew_ms":1000}"#,
		)
		.expect_err("Skew longer than TTL should be rejected.");

		assert!(matches!(err, ConfigError::SkewExceedsTtl { .. }));

		let err =
			BrokerConfig::from_json(r#"{"api_base":"https://api.example.com","clock_skew_ms":0}"#)
				.expect_err("Zero skew should be rejected.");

		assert!(matches!(err, ConfigError::SkewBelowMinimum { .. }));
	}
}
