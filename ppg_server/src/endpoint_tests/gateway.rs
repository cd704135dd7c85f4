use actix_web::{http::StatusCode, test::TestRequest};
use httpmock::prelude::*;
use ppg_engine::{
    db_types::OrderStatus,
    test_utils::{MemoryStore, StoreOp},
    traits::OrderStore,
    ReconciliationApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{call, gateway_at},
    mocks::MockNotifier,
};
use crate::config::ServerOptions;

async fn call_gateway(
    server: &MockServer,
    store: &MemoryStore,
    options: ServerOptions,
    req: TestRequest,
) -> (StatusCode, String) {
    let mut notifier = MockNotifier::new();
    notifier.expect_send().never();
    let api = ReconciliationApi::new(store.clone(), notifier);
    call(api, gateway_at(&server.base_url()), options, req).await
}

fn json_body(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|e| panic!("Not JSON ({e}): {body}"))
}

//----------------------------------------------   Access token  ----------------------------------------------------
#[actix_web::test]
async fn access_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/Auth/RequestToken")
                .json_body(json!({"consumer_key": "key", "consumer_secret": "secret"}));
            then.status(200).json_body(json!({
                "token": "tok-abc",
                "expiryDate": "2024-06-01T10:05:00Z",
                "error": null
            }));
        })
        .await;
    let req = TestRequest::get().uri("/api/get-access-token");
    let (status, body) = call_gateway(&server, &MemoryStore::default(), ServerOptions::default(), req).await;
    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"accessToken": "tok-abc", "expiryDate": "2024-06-01T10:05:00Z"}));
}

#[actix_web::test]
async fn access_token_failure_hides_upstream_detail() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/Auth/RequestToken");
            then.status(401).body("consumer key abc123 is not valid");
        })
        .await;
    let req = TestRequest::get().uri("/api/get-access-token");
    let (status, body) = call_gateway(&server, &MemoryStore::default(), ServerOptions::default(), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body), json!({"error": "Failed to get access token"}));
}

//----------------------------------------------   Register IPN  ----------------------------------------------------
#[actix_web::test]
async fn register_ipn_uses_request_host() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/URLSetup/RegisterIPN")
                .header("Authorization", "Bearer tok")
                .json_body(json!({"url": "http://shop.example.com/api/pesapal-ipn", "ipn_notification_type": "POST"}));
            then.status(200).json_body(json!({"ipn_id": "ipn-123", "url": "http://shop.example.com/api/pesapal-ipn"}));
        })
        .await;
    let req = TestRequest::post()
        .uri("/api/register-ipn")
        .insert_header(("Host", "shop.example.com"))
        .set_json(json!({"accessToken": "tok"}));
    let (status, body) = call_gateway(&server, &MemoryStore::default(), ServerOptions::default(), req).await;
    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"ipnId": "ipn-123"}));
}

#[actix_web::test]
async fn register_ipn_uses_public_url() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/URLSetup/RegisterIPN")
                .json_body(json!({"url": "https://pay.example.com/api/pesapal-ipn", "ipn_notification_type": "POST"}));
            then.status(200).json_body(json!({"ipn_id": "ipn-456"}));
        })
        .await;
    let options = ServerOptions { public_url: Some("https://pay.example.com".into()) };
    let req = TestRequest::post().uri("/api/register-ipn").set_json(json!({"accessToken": "tok"}));
    let (status, body) = call_gateway(&server, &MemoryStore::default(), options, req).await;
    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"ipnId": "ipn-456"}));
}

#[actix_web::test]
async fn register_ipn_without_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/URLSetup/RegisterIPN");
            then.status(200).json_body(json!({"ipn_id": "never"}));
        })
        .await;
    let req = TestRequest::post().uri("/api/register-ipn").set_json(json!({"accessToken": ""}));
    let (status, _) = call_gateway(&server, &MemoryStore::default(), ServerOptions::default(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(mock.hits_async().await, 0);
}

#[actix_web::test]
async fn register_ipn_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/URLSetup/RegisterIPN");
            then.status(200).json_body(json!({"error": {"code": "invalid_token", "message": "Token expired"}}));
        })
        .await;
    let req = TestRequest::post().uri("/api/register-ipn").set_json(json!({"accessToken": "stale"}));
    let (status, body) = call_gateway(&server, &MemoryStore::default(), ServerOptions::default(), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body), json!({"error": "Failed to register IPN"}));
}

//----------------------------------------------   Submit order  ----------------------------------------------------
fn order_data() -> Value {
    json!({
        "id": "ORD-77",
        "currency": "KES",
        "amount": 1500.0,
        "description": "Two mugs",
        "notification_id": "ipn-123",
        "userId": "u77",
        "billing_address": {"email_address": "buyer@example.com", "first_name": "Wanjiru"}
    })
}

fn submit_request(body: Value) -> TestRequest {
    TestRequest::post().uri("/api/submit-order").set_json(body)
}

#[actix_web::test]
async fn submit_order_records_pending_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/Transactions/SubmitOrderRequest")
                .header("Authorization", "Bearer tok")
                .json_body(order_data());
            then.status(200).json_body(json!({
                "order_tracking_id": "T77",
                "merchant_reference": "ORD-77",
                "redirect_url": "https://cybqa.pesapal.com/iframe?OrderTrackingId=T77",
                "error": null
            }));
        })
        .await;
    let store = MemoryStore::default();
    let req = submit_request(json!({"accessToken": "tok", "orderData": order_data()}));
    let (status, body) = call_gateway(&server, &store, ServerOptions::default(), req).await;
    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"redirect_url": "https://cybqa.pesapal.com/iframe?OrderTrackingId=T77"}));
    let order = store.fetch_order("T77").await.unwrap().expect("pending order was not recorded");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.user_id.as_deref(), Some("u77"));
    assert_eq!(order.user_email.as_deref(), Some("buyer@example.com"));
}

#[actix_web::test]
async fn submit_order_redirects_even_if_recording_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/Transactions/SubmitOrderRequest");
            then.status(200).json_body(json!({"order_tracking_id": "T78", "redirect_url": "https://example.com/pay"}));
        })
        .await;
    let store = MemoryStore::default();
    store.fail_on(StoreOp::InsertOrder);
    let req = submit_request(json!({"accessToken": "tok", "orderData": order_data()}));
    let (status, body) = call_gateway(&server, &store, ServerOptions::default(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"redirect_url": "https://example.com/pay"}));
}

#[actix_web::test]
async fn submit_order_without_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/Transactions/SubmitOrderRequest");
            then.status(200).json_body(json!({"redirect_url": "https://example.com/pay"}));
        })
        .await;
    let store = MemoryStore::default();
    let req = submit_request(json!({"accessToken": "  ", "orderData": order_data()}));
    let (status, _) = call_gateway(&server, &store, ServerOptions::default(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(mock.hits_async().await, 0);
    assert_eq!(store.call_count(StoreOp::InsertOrder), 0);
}

#[actix_web::test]
async fn submit_order_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/Transactions/SubmitOrderRequest");
            then.status(500).body("upstream exploded");
        })
        .await;
    let store = MemoryStore::default();
    let req = submit_request(json!({"accessToken": "tok", "orderData": order_data()}));
    let (status, body) = call_gateway(&server, &store, ServerOptions::default(), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body), json!({"error": "Failed to submit order"}));
    assert_eq!(store.call_count(StoreOp::InsertOrder), 0);
}
