//----------------------------------------------   PesaPal  ----------------------------------------------------
//! Routes that front the PesaPal API: token issue, IPN registration and order submission.
//!
//! Failures are logged with the upstream detail, and reported to the client with a generic message only.
use actix_web::{get, post, web, HttpRequest, HttpResponse};
use log::*;
use pesapal_tools::{PesapalApi, PesapalApiError};
use ppg_engine::{traits::Notifier, ReconciliationApi, ReconciliationDatabase};

use crate::{
    config::ServerOptions,
    data_objects::{
        AccessTokenResponse,
        RegisterIpnRequest,
        RegisterIpnResponse,
        SubmitOrderRequest,
        SubmitOrderResponse,
    },
    errors::ServerError,
    helpers::ipn_callback_url,
    route,
};

/// Client mistakes surface as 400s. Everything else becomes `fallback`.
fn gateway_error(e: PesapalApiError, fallback: ServerError) -> ServerError {
    match e {
        PesapalApiError::InvalidRequest(s) => {
            debug!("💳️ Rejected request before calling PesaPal. {s}");
            ServerError::InvalidRequestBody(s)
        },
        e => {
            warn!("💳️ PesaPal call failed. {e}");
            fallback
        },
    }
}

#[get("/get-access-token")]
pub async fn get_access_token(api: web::Data<PesapalApi>) -> Result<HttpResponse, ServerError> {
    trace!("💳️ Received access token request");
    let token = api.request_token().await.map_err(|e| gateway_error(e, ServerError::AccessTokenError))?;
    let response =
        AccessTokenResponse { access_token: token.token.reveal().clone(), expiry_date: token.expiry_date.clone() };
    Ok(HttpResponse::Ok().json(response))
}

/// Registers this server's IPN url with PesaPal. The url is built from `PPG_PUBLIC_URL` if it is set, or from the
/// scheme and host of this request otherwise. Every call creates a new registration at the gateway.
#[post("/register-ipn")]
pub async fn register_ipn(
    req: HttpRequest,
    body: web::Json<RegisterIpnRequest>,
    api: web::Data<PesapalApi>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let callback_url = ipn_callback_url(&req, options.public_url.as_deref());
    debug!("💳️ Received IPN registration request for {callback_url}");
    let registration = api
        .register_ipn(body.access_token.reveal(), &callback_url)
        .await
        .map_err(|e| gateway_error(e, ServerError::IpnRegistrationError))?;
    Ok(HttpResponse::Ok().json(RegisterIpnResponse { ipn_id: registration.ipn_id }))
}

route!(submit_order => Post "/submit-order" impl ReconciliationDatabase, Notifier);
/// Submits an order to PesaPal and returns the url the customer must be redirected to.
///
/// If PesaPal returns a tracking id, the order is recorded as pending so that the IPN for it can be reconciled. A
/// failure to record it is logged, and the redirect url is returned regardless.
pub async fn submit_order<B, N>(
    body: web::Json<SubmitOrderRequest>,
    gateway: web::Data<PesapalApi>,
    api: web::Data<ReconciliationApi<B, N>>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationDatabase,
    N: Notifier,
{
    let SubmitOrderRequest { access_token, order_data } = body.into_inner();
    if !order_data.is_object() {
        return Err(ServerError::InvalidRequestBody("orderData must be an object".to_string()));
    }
    let submitted = gateway
        .submit_order(access_token.reveal(), &order_data)
        .await
        .map_err(|e| gateway_error(e, ServerError::OrderSubmissionError))?;
    match submitted.order_tracking_id.as_deref() {
        Some(tracking_id) => {
            if let Err(e) = api.record_pending_order(tracking_id, &order_data).await {
                warn!("💳️ Order {tracking_id} was submitted, but could not be recorded as pending. {e}");
            }
        },
        None => warn!("💳️ PesaPal did not return a tracking id for the submitted order. It has not been recorded."),
    }
    Ok(HttpResponse::Ok().json(SubmitOrderResponse { redirect_url: submitted.redirect_url }))
}
