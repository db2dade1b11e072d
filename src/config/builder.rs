// self
use crate::{_prelude::*, config::BrokerConfig, error::ConfigError};

/// Builder for [`BrokerConfig`] values.
#[derive(Debug)]
pub struct BrokerConfigBuilder {
	/// API base the token path is resolved against.
	pub api_base: Url,
	/// Token endpoint path relative to the API base.
	pub token_path: String,
	/// Token lifetime before the skew margin.
	pub ttl: Duration,
	/// Upper bound on a single token request.
	pub request_timeout: Duration,
	/// Clock skew margin.
	pub clock_skew: Duration,
}
impl BrokerConfigBuilder {
	/// Creates a new builder seeded with the provided API base and default timings.
	pub fn new(api_base: Url) -> Self {
		Self {
			api_base,
			token_path: BrokerConfig::DEFAULT_TOKEN_PATH.into(),
			ttl: BrokerConfig::DEFAULT_TTL,
			request_timeout: BrokerConfig::DEFAULT_REQUEST_TIMEOUT,
			clock_skew: BrokerConfig::DEFAULT_CLOCK_SKEW,
		}
	}

	/// Sets the token endpoint path.
	pub fn token_path(mut self, path: impl Into<String>) -> Self {
		self.token_path = path.into();

		self
	}

	/// Overrides the default token lifetime.
	pub fn ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;

		self
	}

	/// Overrides the request timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Overrides the clock skew margin.
	pub fn clock_skew(mut self, skew: Duration) -> Self {
		self.clock_skew = skew;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<BrokerConfig, ConfigError> {
		let config = BrokerConfig {
			api_base: self.api_base,
			token_path: self.token_path,
			ttl: self.ttl,
			request_timeout: self.request_timeout,
			clock_skew: self.clock_skew,
		};

		config.validate()?;

		Ok(config)
	}
}

impl BrokerConfig {
	fn validate(&self) -> Result<(), ConfigError> {
		if !matches!(self.api_base.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { url: self.api_base.to_string() });
		}
		if self.request_timeout.is_zero() {
			return Err(ConfigError::ZeroTimeout);
		}

		validate_skew(self.ttl, self.clock_skew)?;
		self.token_endpoint()?;

		Ok(())
	}
}

/// Rejects a skew margin that is too small to absorb drift or leaves no usable lifetime.
fn validate_skew(ttl: Duration, skew: Duration) -> Result<(), ConfigError> {
	if skew < BrokerConfig::MIN_CLOCK_SKEW {
		return Err(ConfigError::SkewBelowMinimum { skew, minimum: BrokerConfig::MIN_CLOCK_SKEW });
	}
	if skew >= ttl {
		return Err(ConfigError::SkewExceedsTtl { ttl, skew });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn builder_rejects_invalid_settings() {
		let err = BrokerConfig::builder(url("ftp://files.example.com/"))
			.build()
			.expect_err("Non-HTTP schemes should be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { .. }));

		let err = BrokerConfig::builder(url("https://api.example.com/"))
			.request_timeout(Duration::ZERO)
			.build()
			.expect_err("Zero timeout should be rejected.");

		assert!(matches!(err, ConfigError::ZeroTimeout));

		let err = BrokerConfig::builder(url("https://api.example.com/"))
			.ttl(Duration::from_secs(1))
			.build()
			.expect_err("Default one-second skew should swallow a one-second TTL.");

		assert!(matches!(err, ConfigError::SkewExceedsTtl { .. }));

		for skew in [Duration::ZERO, Duration::from_millis(500), Duration::from_millis(999)] {
			let err = BrokerConfig::builder(url("https://api.example.com/"))
				.clock_skew(skew)
				.build()
				.expect_err("Sub-second skew should be rejected.");

			assert!(matches!(
				err,
				ConfigError::SkewBelowMinimum { skew: rejected, minimum }
					if rejected == skew && minimum == Duration::from_secs(1)
			));
		}
	}

	#[test]
	fn builder_keeps_overrides() {
		let config = BrokerConfig::builder(url("https://api.example.com/api/"))
			.token_path("/live/token")
			.ttl(Duration::from_secs(30))
			.request_timeout(Duration::from_millis(100))
			.clock_skew(Duration::from_secs(2))
			.build()
			.expect("Valid overrides should build.");

		assert_eq!(config.ttl, Duration::from_secs(30));
		assert_eq!(config.clock_skew, Duration::from_secs(2));
		assert_eq!(
			config.token_endpoint().expect("Endpoint should resolve.").as_str(),
			"https://api.example.com/live/token"
		);
	}
}
