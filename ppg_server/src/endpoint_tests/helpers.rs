use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use log::debug;
use pesapal_tools::{PesapalApi, PesapalConfig};
use ppg_engine::{
    db_types::NewOrder,
    test_utils::MemoryStore,
    traits::{Notifier, OrderStore},
    ReconciliationApi,
    ReconciliationDatabase,
};

use crate::{config::ServerOptions, routes::configure};

/// A gateway client that points at a port nothing listens on. Fine for tests that never reach PesaPal.
pub fn unreachable_gateway() -> PesapalApi {
    gateway_at("http://127.0.0.1:9")
}

pub fn gateway_at(url: &str) -> PesapalApi {
    PesapalApi::new(PesapalConfig::with_api_url(url).with_credentials("key", "secret")).unwrap()
}

/// A store holding order `T1` (user `u1`, email `a@b.com`) and order `T2` (user `u2`, no email).
pub async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::default();
    store.insert_pending_order(NewOrder::new("T1").with_user_id("u1").with_user_email("a@b.com")).await.unwrap();
    store.insert_pending_order(NewOrder::new("T2").with_user_id("u2")).await.unwrap();
    store
}

pub async fn call<B, N>(
    api: ReconciliationApi<B, N>,
    gateway: PesapalApi,
    options: ServerOptions,
    req: TestRequest,
) -> (StatusCode, String)
where
    B: ReconciliationDatabase + 'static,
    N: Notifier + 'static,
{
    let _ = env_logger::try_init();
    let app = App::new()
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(gateway))
        .app_data(web::Data::new(options))
        .configure(configure::<B, N>);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, String::from_utf8_lossy(&body).into_owned())
}
