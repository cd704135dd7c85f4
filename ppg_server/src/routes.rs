//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits its I/O (database, gateway and mail
//! calls), so workers keep serving other requests in the meantime.
use actix_web::{get, http::header::ContentType, web, Either, HttpResponse, Responder};
use log::*;
use ppg_engine::{traits::Notifier, ReconcileError, ReconciliationApi, ReconciliationDatabase};

use crate::{
    data_objects::IpnNotification,
    pesapal_routes::{get_access_token, register_ipn, SubmitOrderRoute},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// Registers every route of the server against the given backend and notifier types.
pub fn configure<B, N>(cfg: &mut web::ServiceConfig)
where
    B: ReconciliationDatabase + 'static,
    N: Notifier + 'static,
{
    let api_scope = web::scope("/api")
        .service(PesapalIpnRoute::<B, N>::new())
        .service(SubmitOrderRoute::<B, N>::new())
        .service(get_access_token)
        .service(register_ipn);
    cfg.service(health).service(api_scope);
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   IPN  ----------------------------------------------------
route!(pesapal_ipn => Post "/pesapal-ipn" impl ReconciliationDatabase, Notifier);
/// Route handler for PesaPal's payment notifications.
///
/// The body carries the order tracking id and the gateway's view of the payment status, either as JSON or
/// form-encoded. Responses are plain text:
/// * `200` once the order status has been committed, whatever happened to the email and notification record,
/// * `400` if the tracking id is missing,
/// * `500` if the order is unknown or the store could not be updated. The gateway will deliver the notification again.
pub async fn pesapal_ipn<B, N>(
    body: Either<web::Json<IpnNotification>, web::Form<IpnNotification>>,
    api: web::Data<ReconciliationApi<B, N>>,
) -> HttpResponse
where
    B: ReconciliationDatabase,
    N: Notifier,
{
    let IpnNotification { order_tracking_id, status } = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };
    let tracking_id = order_tracking_id.unwrap_or_default();
    let status = status.unwrap_or_default();
    trace!("🔔️ Received IPN for order '{tracking_id}' with status '{status}'");
    match api.reconcile(&tracking_id, &status).await {
        Ok(outcome) => {
            info!("🔔️ IPN for order {} processed. Order is {}.", outcome.tracking_id, outcome.status);
            HttpResponse::Ok().insert_header(ContentType::plaintext()).body("IPN processed successfully")
        },
        Err(ReconcileError::InvalidRequest(e)) => {
            warn!("🔔️ Rejected IPN call. {e}");
            HttpResponse::BadRequest().insert_header(ContentType::plaintext()).body(format!("Invalid request. {e}"))
        },
        Err(ReconcileError::OrderNotFound(id)) => {
            warn!("🔔️ IPN received for unknown order {id}");
            HttpResponse::InternalServerError().insert_header(ContentType::plaintext()).body("Order not found")
        },
        Err(e) => {
            error!("🔔️ Could not process IPN for order {tracking_id}. {e}");
            HttpResponse::InternalServerError().insert_header(ContentType::plaintext()).body("Error processing IPN")
        },
    }
}
