use actix_web::{http::StatusCode, test::TestRequest};
use ppg_engine::{
    db_types::{NotificationType, OrderStatus},
    test_utils::{MemoryStore, StoreOp},
    traits::{NotificationStore, NotifierError, OrderStore},
    ReconcileOptions,
    ReconciliationApi,
};
use serde_json::json;

use super::{
    helpers::{call, seeded_store, unreachable_gateway},
    mocks::MockNotifier,
};
use crate::config::ServerOptions;

async fn post_ipn(store: &MemoryStore, notifier: MockNotifier, body: serde_json::Value) -> (StatusCode, String) {
    let api = ReconciliationApi::new(store.clone(), notifier);
    let req = TestRequest::post().uri("/api/pesapal-ipn").set_json(body);
    call(api, unreachable_gateway(), ServerOptions::default(), req).await
}

#[actix_web::test]
async fn completed_payment() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier
        .expect_send()
        .withf(|m| m.to == "a@b.com" && m.body.contains("#T1"))
        .times(1)
        .returning(|_| Ok(()));
    let (status, body) = post_ipn(&store, notifier, json!({"orderTrackingId": "T1", "status": "COMPLETED"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "IPN processed successfully");
    assert_eq!(store.fetch_order("T1").await.unwrap().unwrap().status, OrderStatus::Paid);
    let notes = store.fetch_notifications_for_user("u1").await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].notification_type, NotificationType::Success);
}

#[actix_web::test]
async fn failed_payment_sends_no_email() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier.expect_send().never();
    let (status, _) = post_ipn(&store, notifier, json!({"orderTrackingId": "T1", "status": "FAILED"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.fetch_order("T1").await.unwrap().unwrap().status, OrderStatus::Failed);
    let notes = store.fetch_notifications_for_user("u1").await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].message, "Your order #T1 has been marked as failed.");
}

#[actix_web::test]
async fn capitalised_tracking_id_field() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier.expect_send().times(1).returning(|_| Ok(()));
    let (status, _) = post_ipn(&store, notifier, json!({"OrderTrackingId": "T1", "status": "COMPLETED"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.fetch_order("T1").await.unwrap().unwrap().status, OrderStatus::Paid);
}

#[actix_web::test]
async fn form_encoded_ipn() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier.expect_send().withf(|m| m.to == "a@b.com").times(1).returning(|_| Ok(()));
    let api = ReconciliationApi::new(store.clone(), notifier);
    let req = TestRequest::post().uri("/api/pesapal-ipn").set_form([("orderTrackingId", "T1"), ("status", "COMPLETED")]);
    let (status, body) = call(api, unreachable_gateway(), ServerOptions::default(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "IPN processed successfully");
    assert_eq!(store.fetch_order("T1").await.unwrap().unwrap().status, OrderStatus::Paid);
    assert_eq!(store.notifications().len(), 1);
}

#[actix_web::test]
async fn form_encoded_ipn_without_tracking_id() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier.expect_send().never();
    let api = ReconciliationApi::new(store.clone(), notifier);
    let req = TestRequest::post().uri("/api/pesapal-ipn").set_form([("status", "FAILED")]);
    let (status, _) = call(api, unreachable_gateway(), ServerOptions::default(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(store.fetch_order("T1").await.unwrap().unwrap().status, OrderStatus::Pending);
}

#[actix_web::test]
async fn missing_tracking_id() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier.expect_send().never();
    let (status, body) = post_ipn(&store, notifier, json!({"status": "COMPLETED"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with("Invalid request."), "was: {body}");
    assert_eq!(store.call_count(StoreOp::FetchOrder), 0);
}

#[actix_web::test]
async fn unknown_order() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier.expect_send().never();
    let (status, body) = post_ipn(&store, notifier, json!({"orderTrackingId": "T404", "status": "COMPLETED"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Order not found");
    assert_eq!(store.call_count(StoreOp::UpdateStatus), 0);
    assert!(store.notifications().is_empty());
}

#[actix_web::test]
async fn store_failure() {
    let store = seeded_store().await;
    store.fail_on(StoreOp::UpdateStatus);
    let mut notifier = MockNotifier::new();
    notifier.expect_send().never();
    let (status, body) = post_ipn(&store, notifier, json!({"orderTrackingId": "T1", "status": "COMPLETED"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Error processing IPN");
    assert!(store.notifications().is_empty());
}

#[actix_web::test]
async fn email_failure_still_succeeds() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier
        .expect_send()
        .times(1)
        .returning(|_| Err(NotifierError::TransportError("connection refused".into())));
    let (status, _) = post_ipn(&store, notifier, json!({"orderTrackingId": "T1", "status": "COMPLETED"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.notifications().len(), 1);
}

#[actix_web::test]
async fn notification_failure_still_succeeds() {
    let store = seeded_store().await;
    store.fail_on(StoreOp::AppendNotification);
    let mut notifier = MockNotifier::new();
    notifier.expect_send().times(1).returning(|_| Ok(()));
    let (status, _) = post_ipn(&store, notifier, json!({"orderTrackingId": "T1", "status": "COMPLETED"})).await;
    assert_eq!(status, StatusCode::OK);
    store.heal(StoreOp::AppendNotification);
    assert_eq!(store.fetch_order("T1").await.unwrap().unwrap().status, OrderStatus::Paid);
}

#[actix_web::test]
async fn order_without_email() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier.expect_send().never();
    let (status, _) = post_ipn(&store, notifier, json!({"orderTrackingId": "T2", "status": "COMPLETED"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(store.fetch_notifications_for_user("u2").await.unwrap().len(), 1);
}

#[actix_web::test]
async fn repeated_delivery_with_dedupe() {
    let store = seeded_store().await;
    let mut notifier = MockNotifier::new();
    notifier.expect_send().times(1).returning(|_| Ok(()));
    let options = ReconcileOptions::default().with_dedupe(true);
    let api = ReconciliationApi::new(store.clone(), notifier).with_options(options);
    // Both deliveries go through the same app, so the notifier expectations span both calls
    let app = actix_web::App::new()
        .app_data(actix_web::web::Data::new(api))
        .app_data(actix_web::web::Data::new(unreachable_gateway()))
        .app_data(actix_web::web::Data::new(ServerOptions::default()))
        .configure(crate::routes::configure::<MemoryStore, MockNotifier>);
    let service = actix_web::test::init_service(app).await;
    for _ in 0..2 {
        let req = TestRequest::post()
            .uri("/api/pesapal-ipn")
            .set_json(json!({"orderTrackingId": "T1", "status": "COMPLETED"}))
            .to_request();
        let res = actix_web::test::call_service(&service, req).await;
        assert_eq!(res.status(), StatusCode::OK);
    }
    assert_eq!(store.fetch_notifications_for_user("u1").await.unwrap().len(), 1);
}

#[actix_web::test]
async fn health_check() {
    let store = seeded_store().await;
    let (status, body) = call(
        ReconciliationApi::new(store, MockNotifier::new()),
        unreachable_gateway(),
        ServerOptions::default(),
        TestRequest::get().uri("/health"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}
