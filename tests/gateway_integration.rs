//! HTTP gateway behavior: status codes, headers, and the
//! invocation-per-request session model.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use chatrelay::transport::gateway;

async fn post(app: axum::Router, payload: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_success_is_200_with_rpc_headers() {
    let (router, _tmp) = common::build_router("ok");
    let app = gateway::app(router);

    let (status, headers, body) =
        post(app, r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let reply: Value = serde_json::from_str(&body).unwrap();
    assert!(reply["result"]["tools"].is_array());
}

#[tokio::test]
async fn test_protocol_errors_still_ride_a_200() {
    let (router, _tmp) = common::build_router("ok");

    for payload in [
        "{not json at all",
        r#"{"jsonrpc":"2.0","id":1,"method":"no/such"}"#,
        r#"{"jsonrpc":"1.0","id":1,"method":"tools/list"}"#,
    ] {
        let app = gateway::app(router.clone());
        let (status, headers, body) = post(app, payload).await;
        assert_eq!(status, StatusCode::OK, "for payload {payload}");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");

        let reply: Value = serde_json::from_str(&body).unwrap();
        assert!(reply["error"]["code"].is_i64(), "for payload {payload}");
    }
}

#[tokio::test]
async fn test_parse_error_body_has_null_id() {
    let (router, _tmp) = common::build_router("ok");
    let app = gateway::app(router);

    let (_, _, body) = post(app, "{broken").await;
    let reply: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(reply["error"]["code"], -32700);
    assert!(reply["id"].is_null());
}

#[tokio::test]
async fn test_notification_gets_empty_200() {
    let (router, _tmp) = common::build_router("ok");
    let app = gateway::app(router);

    let (status, headers, body) = post(
        app,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_each_invocation_gets_a_fresh_session() {
    let (router, _tmp) = common::build_router("ok");

    // Initialize on one invocation.
    let app = gateway::app(router.clone());
    let (status, _, _) = post(
        app,
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A later invocation still works without any prior negotiation state;
    // the gateway synthesizes a session per call.
    let app = gateway::app(router);
    let (status, _, body) =
        post(app, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).await;
    assert_eq!(status, StatusCode::OK);
    let reply: Value = serde_json::from_str(&body).unwrap();
    assert!(reply.get("result").is_some());
}
