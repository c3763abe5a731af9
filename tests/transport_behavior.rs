//! Wire-level behavior of the authenticated transport: request shapes,
//! retry classification, and backoff pacing.

use std::time::Duration;

use tickline_core::{EngineConfig, FormValue, Transport, TransportErrorKind};
use tickline_tests::{HttpError, ScriptedHttpClient};

fn transport_with(client: &std::sync::Arc<ScriptedHttpClient>) -> Transport {
    let config = EngineConfig::new("db-test-key").expect("test credential is valid");
    Transport::new(&config, client.clone())
}

#[tokio::test]
async fn get_builds_an_escaped_query_string() {
    let client = ScriptedHttpClient::new().push_ok("{}");
    let transport = transport_with(&client);

    transport
        .get("metadata.list_schemas", &[("dataset", "GLBX.MDP3"), ("q", "a b")])
        .await
        .expect("request should succeed");

    let requests = client.recorded_requests();
    assert_eq!(
        requests[0].url,
        "https://hist.databento.com/v0/metadata.list_schemas?dataset=GLBX.MDP3&q=a%20b",
    );
}

#[tokio::test]
async fn post_json_serializes_the_body_and_sets_content_type() {
    let client = ScriptedHttpClient::new().push_ok("{}");
    let transport = transport_with(&client);

    transport
        .post_json("batch.submit_job", &serde_json::json!({"dataset": "GLBX.MDP3"}))
        .await
        .expect("request should succeed");

    let requests = client.recorded_requests();
    let request = &requests[0];
    assert_eq!(
        request.headers.get("content-type").map(String::as_str),
        Some("application/json"),
    );
    assert_eq!(request.body.as_deref(), Some("{\"dataset\":\"GLBX.MDP3\"}"));
}

#[tokio::test]
async fn post_form_joins_list_values_with_commas() {
    let client = ScriptedHttpClient::new().push_ok("");
    let transport = transport_with(&client);

    transport
        .post_form(
            "timeseries.get_range",
            &[
                ("dataset", FormValue::text("GLBX.MDP3")),
                ("symbols", FormValue::list(["ES.c.0", "NQ.c.0"])),
            ],
        )
        .await
        .expect("request should succeed");

    let requests = client.recorded_requests();
    let request = &requests[0];
    assert_eq!(
        request.headers.get("content-type").map(String::as_str),
        Some("application/x-www-form-urlencoded"),
    );
    let body = request.body.as_deref().expect("form body");
    assert!(body.contains("symbols=ES.c.0%2CNQ.c.0"), "body: {body}");
}

#[tokio::test]
async fn every_request_carries_credential_and_client_headers() {
    let client = ScriptedHttpClient::new().push_ok("").push_ok("");
    let transport = transport_with(&client);

    transport.get("metadata.list_datasets", &[]).await.expect("get");
    transport
        .post_form("timeseries.get_range", &[("dataset", FormValue::text("GLBX.MDP3"))])
        .await
        .expect("post");

    for request in client.recorded_requests() {
        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Basic ZGItdGVzdC1rZXk6"), // base64("db-test-key:")
        );
        assert_eq!(
            request.headers.get("user-agent").map(String::as_str),
            Some("tickline/0.1.0"),
        );
        assert_eq!(request.timeout_ms, 15_000);
    }
}

#[tokio::test(start_paused = true)]
async fn network_failures_back_off_one_then_two_seconds() {
    let client = ScriptedHttpClient::new()
        .push_error(HttpError::new("connection reset"))
        .push_error(HttpError::new("connection reset"))
        .push_error(HttpError::new("connection reset"));
    let transport = transport_with(&client);

    let started = tokio::time::Instant::now();
    let error = transport
        .get("metadata.list_datasets", &[])
        .await
        .expect_err("must fail");

    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(error.attempts, 3);
    assert_eq!(error.kind, TransportErrorKind::Network);
    assert_eq!(error.last_status, None);
    assert_eq!(client.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn per_attempt_timeouts_are_classified_as_timeout() {
    let client = ScriptedHttpClient::new()
        .push_error(HttpError::timeout("request timeout"))
        .push_error(HttpError::timeout("request timeout"))
        .push_error(HttpError::timeout("request timeout"));
    let transport = transport_with(&client);

    let error = transport
        .get("metadata.list_datasets", &[])
        .await
        .expect_err("must fail");

    assert_eq!(error.kind, TransportErrorKind::Timeout);
    assert_eq!(error.attempts, 3);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_responses_are_retried() {
    let client = ScriptedHttpClient::new().push_status(429, "").push_ok("ok");
    let transport = transport_with(&client);

    let body = transport
        .get("metadata.list_datasets", &[])
        .await
        .expect("second attempt succeeds");

    assert_eq!(body, "ok");
    assert_eq!(client.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn forbidden_fails_fast_with_no_backoff() {
    let client = ScriptedHttpClient::new().push_status(403, "");
    let transport = transport_with(&client);

    let started = tokio::time::Instant::now();
    let error = transport
        .get("metadata.list_datasets", &[])
        .await
        .expect_err("must fail");

    assert_eq!(started.elapsed(), Duration::ZERO);
    assert_eq!(error.attempts, 1);
    assert_eq!(error.last_status, Some(403));
    assert_eq!(client.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failure_twice_then_success_still_returns_the_body() {
    let client = ScriptedHttpClient::new()
        .push_status(502, "")
        .push_error(HttpError::new("connection reset"))
        .push_ok("recovered");
    let transport = transport_with(&client);

    let body = transport
        .get("metadata.list_datasets", &[])
        .await
        .expect("third attempt succeeds");

    assert_eq!(body, "recovered");
    assert_eq!(client.call_count(), 3);
}
