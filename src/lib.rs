//! Single-flight broker for short-lived API tokens: cache one credential, coalesce concurrent
//! callers into a single upstream request, and bound every acquisition with a timeout.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod broker;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{broker::TokenBroker, config::BrokerConfig, http::ReqwestHttpClient};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = TokenBroker<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client suitable for talking to `httpmock` servers during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`TokenBroker`] pointed at `api_base` with the provided timing overrides.
	pub fn build_reqwest_test_broker(
		api_base: &str,
		ttl: Duration,
		request_timeout: Duration,
	) -> ReqwestTestBroker {
		let api_base = Url::parse(api_base).expect("Test API base URL should parse.");
		let config = BrokerConfig::builder(api_base)
			.ttl(ttl)
			.request_timeout(request_timeout)
			.build()
			.expect("Test broker configuration should validate.");

		TokenBroker::with_http_client(config, test_reqwest_http_client())
	}
}

mod _prelude {
	pub use std::{
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use tokio::time::Instant;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
