#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use token_broker::{
	_preludet::*,
	broker::{AcquireRequest, BrokerState, TokenBroker},
	config::BrokerConfig,
	error::TransportError,
	http::MAX_BODY_BYTES,
};

const TTL: Duration = Duration::from_secs(600);
const TIMEOUT: Duration = Duration::from_secs(5);

fn api_base(server: &MockServer) -> String {
	server.url("/api/")
}

#[tokio::test]
async fn acquire_sends_bearer_and_caches_token() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(&api_base(&server), TTL, TIMEOUT);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token").header("authorization", "Bearer user-jwt");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"token\":\"stream-token\"}");
		})
		.await;
	let request = AcquireRequest::new().with_bearer("user-jwt");
	let first = broker.acquire(request.clone()).await.expect("Initial acquire should succeed.");
	let second = broker.acquire(request).await.expect("Cached acquire should succeed.");

	assert_eq!(first.expose(), "stream-token");
	assert_eq!(second.expose(), "stream-token");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn concurrent_acquires_hit_the_endpoint_once() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(&api_base(&server), TTL, TIMEOUT);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token");
			then.status(200)
				.header("content-type", "application/json")
				.delay(Duration::from_millis(50))
				.body("{\"token\":\"abc\"}");
		})
		.await;
	let (first, second, third): (Result<_>, Result<_>, Result<_>) = tokio::join!(
		broker.acquire(AcquireRequest::new()),
		broker.acquire(AcquireRequest::new()),
		broker.acquire(AcquireRequest::new()),
	);

	for token in [first, second, third] {
		assert_eq!(token.expect("Concurrent acquire should succeed.").expose(), "abc");
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn unauthorized_and_server_errors_carry_status() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(&api_base(&server), TTL, TIMEOUT);
	let mut unauthorized = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token");
			then.status(401).body("missing session");
		})
		.await;
	let err = broker
		.acquire(AcquireRequest::new())
		.await
		.expect_err("401 responses should surface as errors.");

	assert!(matches!(err, Error::Unauthorized { status: 401 }));

	unauthorized.delete_async().await;

	let failing = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token");
			then.status(503).body("maintenance");
		})
		.await;
	let err = broker
		.acquire(AcquireRequest::new())
		.await
		.expect_err("503 responses should surface as errors.");

	assert_eq!(err.status(), Some(503));
	assert!(matches!(err, Error::ServerError { .. }));
	assert_eq!(broker.state(), BrokerState::Idle);

	failing.assert_async().await;
}

#[tokio::test]
async fn malformed_body_is_rejected_and_safe_acquire_degrades() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(&api_base(&server), TTL, TIMEOUT);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token");
			then.status(200).header("content-type", "application/json").body("{\"jwt\":\"nope\"}");
		})
		.await;
	let err = broker
		.acquire(AcquireRequest::new())
		.await
		.expect_err("Body without a token field should be rejected.");

	assert!(matches!(err, Error::MalformedResponse { status: 200, .. }));
	assert!(broker.acquire_safe(AcquireRequest::new()).await.is_none());
	assert!(broker.cached().is_none());

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn oversized_body_is_truncated_and_rejected() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(&api_base(&server), TTL, TIMEOUT);
	let body = format!("{{\"token\":\"{}\"}}", "a".repeat(MAX_BODY_BYTES * 2));
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token");
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await;
	let err = broker
		.acquire(AcquireRequest::new())
		.await
		.expect_err("Body past the cap should not parse.");

	assert!(matches!(err, Error::MalformedResponse { status: 200, .. }));
	assert!(broker.cached().is_none());
}

#[tokio::test]
async fn slow_endpoint_times_out() {
	let server = MockServer::start_async().await;
	let broker =
		build_reqwest_test_broker(&api_base(&server), TTL, Duration::from_millis(100));
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/token");
			then.status(200).delay(Duration::from_secs(2)).body("{\"token\":\"late\"}");
		})
		.await;
	let started = Instant::now();
	let err = broker
		.acquire(AcquireRequest::new())
		.await
		.expect_err("Slow endpoint should exceed the timeout.");

	assert!(err.is_timeout());
	assert!(started.elapsed() < Duration::from_secs(1));
	assert!(broker.acquire_safe(AcquireRequest::new()).await.is_none());
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
	let config = BrokerConfig::builder(
		Url::parse("http://127.0.0.1:9/").expect("Unreachable API base should parse."),
	)
	.request_timeout(Duration::from_secs(2))
	.build()
	.expect("Configuration should validate.");
	let broker = TokenBroker::new(config).expect("Default reqwest client should build.");
	let err = broker
		.acquire(AcquireRequest::new())
		.await
		.expect_err("Nothing listens on the discard port.");

	assert!(
		matches!(err, Error::Transport(TransportError::Network { .. }) | Error::Timeout { .. }),
		"Unexpected error variant: {err:?}."
	);
}
