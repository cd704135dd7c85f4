use actix_web::{
    body::{BoxBody, EitherBody},
    dev::ServiceResponse,
    http::{header, Method, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use ppg_engine::{test_utils::MemoryStore, ReconciliationApi};

use super::{
    helpers::{seeded_store, unreachable_gateway},
    mocks::MockNotifier,
};
use crate::{config::ServerOptions, cors::cors, routes::configure};

const STOREFRONT: &str = "https://shop.example.com";

async fn send(origins: &[String], req: TestRequest) -> ServiceResponse<EitherBody<BoxBody>> {
    let _ = env_logger::try_init();
    let api = ReconciliationApi::new(seeded_store().await, MockNotifier::new());
    let app = App::new()
        .wrap(cors(origins))
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(unreachable_gateway()))
        .app_data(web::Data::new(ServerOptions::default()))
        .configure(configure::<MemoryStore, MockNotifier>);
    let service = test::init_service(app).await;
    test::call_service(&service, req.to_request()).await
}

fn preflight(path: &str, origin: &str) -> TestRequest {
    TestRequest::default()
        .method(Method::OPTIONS)
        .uri(path)
        .insert_header((header::ORIGIN, origin))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
}

fn allow_origin(res: &ServiceResponse<EitherBody<BoxBody>>) -> Option<String> {
    res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()).map(String::from)
}

#[actix_web::test]
async fn preflight_from_any_origin() {
    let res = send(&[], preflight("/api/submit-order", STOREFRONT)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(allow_origin(&res).as_deref(), Some("*"));
    let methods = res.headers().get(header::ACCESS_CONTROL_ALLOW_METHODS).and_then(|v| v.to_str().ok());
    assert!(methods.is_some_and(|m| m.contains("POST")), "was: {methods:?}");
}

#[actix_web::test]
async fn preflight_from_configured_origin() {
    let origins = vec![STOREFRONT.to_string()];
    let res = send(&origins, preflight("/api/submit-order", STOREFRONT)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(allow_origin(&res).as_deref(), Some(STOREFRONT));
}

#[actix_web::test]
async fn preflight_from_other_origin() {
    let origins = vec![STOREFRONT.to_string()];
    let res = send(&origins, preflight("/api/submit-order", "https://evil.example.com")).await;
    assert!(res.status().is_client_error());
    assert_eq!(allow_origin(&res), None);
}

#[actix_web::test]
async fn simple_request_carries_cors_headers() {
    let origins = vec![STOREFRONT.to_string()];
    let req = TestRequest::get().uri("/health").insert_header((header::ORIGIN, STOREFRONT));
    let res = send(&origins, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(allow_origin(&res).as_deref(), Some(STOREFRONT));
}
