//! Integration tests for the request dispatcher and response classifier
//! using wiremock.
//!
//! These cover the dispatcher's URL joining and header merge policy, the
//! classifier's status-code-to-error mapping, the 204 and decode-fallback
//! rules, and the raw/full calling forms.

use webreq::error::{ResponseError, WebError};
use webreq::logging::LogPolicy;
use webreq::request::{ApiRequest, Body, WebRequester};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── URL joining ────────────────────────────────────────────────────────

#[tokio::test]
async fn endpoint_with_leading_slash_joins_with_one_separator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    // server.uri() has no trailing slash; the endpoint supplies one.
    let requester = WebRequester::new(&server.uri()).unwrap();
    let body = requester
        .invoke_and_handle(&ApiRequest::get("/api/ping"))
        .await
        .unwrap();
    assert_eq!(body.as_json().unwrap()["ok"], true);
}

#[tokio::test]
async fn endpoint_without_leading_slash_joins_with_one_separator() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;

    // Base URL supplies the trailing slash, the endpoint has none: the
    // join must still produce exactly one separator (no "//").
    let requester = WebRequester::new(&format!("{}/", server.uri())).unwrap();
    let body = requester
        .invoke_and_handle(&ApiRequest::get("api/ping"))
        .await
        .unwrap();
    assert_eq!(body.as_json().unwrap()["ok"], true);
}

// ── Header merge policy ────────────────────────────────────────────────

#[tokio::test]
async fn default_headers_are_sent_with_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .and(header("x-probe", "default"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut requester = WebRequester::new(&server.uri()).unwrap();
    requester.insert_default_header("X-Probe", "default").unwrap();

    // The mock only matches when the default header arrives.
    requester
        .invoke_and_handle(&ApiRequest::get("/api/ping"))
        .await
        .unwrap();
}

#[tokio::test]
async fn per_call_headers_override_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .and(header("x-probe", "override"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut requester = WebRequester::new(&server.uri()).unwrap();
    requester.insert_default_header("X-Probe", "default").unwrap();

    let request = ApiRequest::get("/api/ping").header("X-Probe", "override");
    requester.invoke_and_handle(&request).await.unwrap();
}

#[tokio::test]
async fn query_parameters_are_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .and(query_param("page", "2"))
        .and(query_param("expand", "full"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let requester = WebRequester::new(&server.uri()).unwrap();
    let request = ApiRequest::get("/api/items")
        .query("page", "2")
        .query("expand", "full");
    requester.invoke_and_handle(&request).await.unwrap();
}

#[tokio::test]
async fn raw_body_is_sent_unmodified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/import"))
        .and(body_string("<payload>raw</payload>"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let requester = WebRequester::new(&server.uri()).unwrap();
    let request = ApiRequest::post("/api/import").text("<payload>raw</payload>");
    requester.invoke_and_handle(&request).await.unwrap();
}

// ── Status classification ──────────────────────────────────────────────

#[tokio::test]
async fn mapped_error_status_raises_its_variant_with_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such resource"))
        .mount(&server)
        .await;

    let requester = WebRequester::new(&server.uri()).unwrap();
    let err = requester
        .invoke_and_handle(&ApiRequest::get("/api/missing"))
        .await
        .unwrap_err();

    match err {
        WebError::Response(ResponseError::NotFound { body }) => {
            assert_eq!(body, "no such resource");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn unmapped_error_status_raises_the_default_variant() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/teapot"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&server)
        .await;

    let requester = WebRequester::new(&server.uri()).unwrap();
    let err = requester
        .invoke_and_handle(&ApiRequest::get("/api/teapot"))
        .await
        .unwrap_err();

    match err {
        WebError::Response(ResponseError::Other { status, .. }) => {
            // The catch-all must still carry the actual code.
            assert_eq!(status.as_u16(), 418);
        }
        other => panic!("expected Other, got {other:?}"),
    }
}

#[tokio::test]
async fn invoke_returns_the_outcome_without_classifying() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    // The dispatcher alone never raises on status — classification is the
    // handler's job.
    let requester = WebRequester::new(&server.uri()).unwrap();
    let outcome = requester
        .invoke(&ApiRequest::get("/api/broken"))
        .await
        .unwrap();
    assert_eq!(outcome.status.as_u16(), 500);
    assert_eq!(outcome.text(), "boom");
}

// ── Body decoding ──────────────────────────────────────────────────────

#[tokio::test]
async fn status_204_yields_an_empty_body_under_both_decode_modes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/items/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let requester = WebRequester::new(&server.uri()).unwrap();

    let decoded = requester
        .invoke_and_handle(&ApiRequest::delete("/api/items/1"))
        .await
        .unwrap();
    assert!(decoded.is_empty());

    let raw = requester
        .invoke_and_handle_raw(&ApiRequest::delete("/api/items/1"))
        .await
        .unwrap();
    assert!(raw.is_empty());
}

#[tokio::test]
async fn malformed_json_on_success_falls_back_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let requester = WebRequester::new(&server.uri()).unwrap();
    let body = requester
        .invoke_and_handle(&ApiRequest::get("/api/report"))
        .await
        .unwrap();
    assert_eq!(body.as_text(), Some("<html>not json</html>"));
}

#[tokio::test]
async fn raw_mode_returns_bytes_unmodified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blob"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 1, 2, 255]))
        .mount(&server)
        .await;

    let requester = WebRequester::new(&server.uri()).unwrap();
    let body = requester
        .invoke_and_handle_raw(&ApiRequest::get("/api/blob"))
        .await
        .unwrap();
    assert_eq!(body.as_bytes().unwrap().as_ref(), &[0u8, 1, 2, 255]);
}

#[tokio::test]
async fn full_form_returns_status_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/items"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-request-id", "req-7")
                .set_body_json(serde_json::json!([1, 2, 3])),
        )
        .mount(&server)
        .await;

    let requester = WebRequester::new(&server.uri()).unwrap();
    let handled = requester
        .invoke_and_handle_full(&ApiRequest::get("/api/items"))
        .await
        .unwrap();

    assert_eq!(handled.status.as_u16(), 200);
    assert_eq!(handled.headers.get("x-request-id").unwrap(), "req-7");
    assert_eq!(handled.body, Body::Json(serde_json::json!([1, 2, 3])));
}

// ── Transport failures ─────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_server_surfaces_as_a_transport_error() {
    // Nothing listens on port 1; the connection is refused before any
    // HTTP response exists.
    let requester = WebRequester::builder("http://127.0.0.1:1")
        .log_policy(LogPolicy::default())
        .build()
        .unwrap();
    let err = requester
        .invoke_and_handle(&ApiRequest::get("/api/ping"))
        .await
        .unwrap_err();
    assert!(matches!(err, WebError::Transport(_)));
    assert_eq!(err.status(), None);
}
