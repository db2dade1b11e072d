//! Demonstrates sharing one broker between several concurrent callers: the first miss fetches
//! the token, the others attach to the same request, and later calls hit the cache.

// std
use std::time::Duration;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use token_broker::{
	broker::{AcquireRequest, ReqwestBroker},
	config::BrokerConfig,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token").header("authorization", "Bearer session-jwt");
			then.status(200)
				.header("content-type", "application/json")
				.delay(Duration::from_millis(50))
				.body("{\"token\":\"demo-stream-token\"}");
		})
		.await;
	let config = BrokerConfig::builder(Url::parse(&server.url("/api/"))?)
		.ttl(Duration::from_secs(60))
		.build()?;
	let broker = ReqwestBroker::new(config)?;
	let request = AcquireRequest::new().with_bearer("session-jwt");
	let (first, second, third) = tokio::join!(
		broker.acquire(request.clone()),
		broker.acquire(request.clone()),
		broker.acquire(request.clone()),
	);

	println!(
		"Concurrent callers resolved: {} / {} / {}.",
		first?.expose(),
		second?.expose(),
		third?.expose()
	);

	let cached = broker.acquire_safe(request).await;

	println!("Cache hit returned a token: {}.", cached.is_some());
	println!(
		"Requests sent: {}, attached waiters: {}.",
		broker.metrics().requests(),
		broker.metrics().attached()
	);

	token_mock.assert_async().await;

	Ok(())
}
