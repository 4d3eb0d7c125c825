//! Gateway server tests over real HTTP.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

mod common;

use common::{client, mesh_config, start_gateway, start_mock_source, start_programmable_source, MockResponse};

fn source_response() -> MockResponse {
    MockResponse::json(json!({ "data": { "products": [{ "sku": "24-MB01" }] } }))
        .with_header("X-Source", "commerce")
        .with_header("ETag", "\"v1\"")
}

#[tokio::test]
async fn test_relays_and_strips_http_details() {
    let source = start_mock_source(source_response()).await;
    let gateway = start_gateway(mesh_config(source, json!({ "headers": { "x-powered-by": "api-mesh" } }))).await;

    let res = client()
        .post(gateway.url("/graphql"))
        .json(&json!({ "query": "{ products { sku } }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-powered-by"], "api-mesh");
    assert!(res.headers().get("x-source").is_none());
    assert!(res.headers().get("x-request-id").is_some());

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["products"][0]["sku"], "24-MB01");
    assert!(body["extensions"].get("httpDetails").is_none());
}

#[tokio::test]
async fn test_metadata_forwards_source_headers() {
    let source = start_mock_source(source_response()).await;
    let gateway = start_gateway(mesh_config(source, json!({}))).await;

    let res = client()
        .post(gateway.url("/graphql"))
        .header("x-include-metadata", "true")
        .json(&json!({ "query": "{ products { sku } }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-source"], "commerce");
    // Cache validators only survive GET requests.
    assert!(res.headers().get("etag").is_none());
    assert_eq!(res.headers().get_all("connection").iter().count(), 0);

    let res = client()
        .get(gateway.url("/graphql?query=%7Bproducts%7Bsku%7D%7D"))
        .header("x-include-metadata", "TRUE")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["etag"], "\"v1\"");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["products"][0]["sku"], "24-MB01");
}

#[tokio::test]
async fn test_configured_headers_win_over_source_headers() {
    let source = start_mock_source(source_response()).await;
    let gateway = start_gateway(mesh_config(source, json!({ "headers": { "x-source": "gateway" } }))).await;

    let res = client()
        .post(gateway.url("/graphql"))
        .header("x-include-metadata", "true")
        .json(&json!({ "query": "{ products { sku } }" }))
        .send()
        .await
        .unwrap();

    let values: Vec<_> = res.headers().get_all("x-source").iter().collect();
    assert_eq!(values, vec!["gateway"]);
}

#[tokio::test]
async fn test_http_details_kept_when_configured() {
    let source = start_mock_source(source_response()).await;
    let gateway = start_gateway(mesh_config(source, json!({ "includeHTTPDetails": true }))).await;

    let body: Value = client()
        .post(gateway.url("/graphql"))
        .json(&json!({ "query": "{ products { sku } }" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let detail = &body["extensions"]["httpDetails"][0];
    assert_eq!(detail["sourceName"], "commerce");
    assert_eq!(detail["request"]["method"], "POST");
    assert_eq!(detail["response"]["status"], 200);
    assert_eq!(detail["response"]["headers"]["x-source"], "commerce");
}

#[tokio::test]
async fn test_source_receives_operation_headers_and_body() {
    let seen = Arc::new(Mutex::new(None));
    let recorder = Arc::clone(&seen);
    let source = start_programmable_source(move |request| {
        *recorder.lock().unwrap() = Some(request);
        async { MockResponse::json(json!({ "data": null })) }
    })
    .await;
    let gateway = start_gateway(mesh_config(source, json!({}))).await;

    client()
        .post(gateway.url("/graphql"))
        .header("x-api-key", "client-key")
        .header("x-request-id", "req-42")
        .json(&json!({ "query": "{ ping }" }))
        .send()
        .await
        .unwrap();

    let request = seen.lock().unwrap().clone().unwrap();
    assert!(request.head.starts_with("post /graphql"));
    assert_eq!(request.header("x-api-key"), Some("source-key"));
    assert_eq!(request.header("x-request-id"), Some("req-42"));
    assert_eq!(request.body, r#"{"query":"{ ping }"}"#);
}

#[tokio::test]
async fn test_unreachable_source_is_bad_gateway() {
    // Bind and drop to get a port nothing listens on.
    let unused = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = unused.local_addr().unwrap();
    drop(unused);

    let gateway = start_gateway(mesh_config(addr, json!({}))).await;
    let res = client()
        .post(gateway.url("/graphql"))
        .json(&json!({ "query": "{ ping }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert!(body["errors"][0]["message"]
        .as_str()
        .unwrap()
        .starts_with("Failed to reach source commerce"));
}

#[tokio::test]
async fn test_non_json_source_body_is_relayed() {
    let html = MockResponse {
        status: 200,
        headers: vec![("Content-Type".into(), "text/html".into())],
        body: "<html>GraphiQL</html>".into(),
    };
    let source = start_mock_source(html).await;
    let gateway = start_gateway(mesh_config(source, json!({ "headers": { "x-powered-by": "api-mesh" } }))).await;

    let res = client().get(gateway.url("/graphql")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/html");
    assert_eq!(res.text().await.unwrap(), "<html>GraphiQL</html>");
}

#[tokio::test]
async fn test_source_errors_keep_status() {
    let source = start_mock_source(
        MockResponse::json(json!({ "errors": [{ "message": "bad query" }] })).with_status(400),
    )
    .await;
    let gateway = start_gateway(mesh_config(source, json!({}))).await;

    let res = client()
        .post(gateway.url("/graphql"))
        .json(&json!({ "query": "{" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["errors"][0]["message"], "bad query");
}

#[tokio::test]
async fn test_cors_preflight() {
    let source = start_mock_source(source_response()).await;
    let gateway = start_gateway(mesh_config(
        source,
        json!({ "CORS": { "origin": "https://shop.example", "methods": ["POST"], "credentials": true } }),
    ))
    .await;

    let res = client()
        .request(reqwest::Method::OPTIONS, gateway.url("/graphql"))
        .header("origin", "https://shop.example")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .unwrap();

    assert!(res.status().is_success());
    assert_eq!(res.headers()["access-control-allow-origin"], "https://shop.example");
    assert_eq!(res.headers()["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn test_health_and_shutdown() {
    let source = start_mock_source(source_response()).await;
    let gateway = start_gateway(mesh_config(source, json!({}))).await;

    let body: Value = client()
        .get(gateway.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({ "status": "ok", "meshId": "test-mesh" }));

    gateway.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), gateway.handle)
        .await
        .expect("server did not stop")
        .unwrap();
}
