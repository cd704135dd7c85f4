use std::sync::Arc;

use log::*;
use ppg_common::{non_empty, Secret};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;

use crate::{
    config::PesapalConfig,
    data_objects::{
        AccessToken,
        IpnRegistration,
        RegisterIpnRequest,
        RegisterIpnResponse,
        SubmitOrderResponse,
        SubmittedOrder,
        TokenRequest,
        TokenResponse,
    },
    PesapalApiError,
};

const REQUEST_TOKEN_PATH: &str = "/api/Auth/RequestToken";
const REGISTER_IPN_PATH: &str = "/api/URLSetup/RegisterIPN";
const SUBMIT_ORDER_PATH: &str = "/api/Transactions/SubmitOrderRequest";

#[derive(Clone)]
pub struct PesapalApi {
    config: PesapalConfig,
    client: Arc<Client>,
}

/// Identifies which gateway call failed, so that a transport failure can be reported as the right error variant.
#[derive(Debug, Clone, Copy)]
enum GatewayCall {
    RequestToken,
    SubmitOrder,
    RegisterIpn,
}

impl GatewayCall {
    fn failure(self, status: Option<u16>, message: String) -> PesapalApiError {
        match self {
            Self::RequestToken => PesapalApiError::AuthError { status, message },
            Self::SubmitOrder => PesapalApiError::SubmissionError { status, message },
            Self::RegisterIpn => PesapalApiError::RegistrationError { status, message },
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::RequestToken => "RequestToken",
            Self::SubmitOrder => "SubmitOrderRequest",
            Self::RegisterIpn => "RegisterIPN",
        }
    }
}

impl PesapalApi {
    pub fn new(config: PesapalConfig) -> Result<Self, PesapalApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| PesapalApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        call: GatewayCall,
        path: &str,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, PesapalApiError> {
        let url = self.url(path);
        trace!("💳️ Sending {} request to {url}", call.name());
        let mut req = self.client.post(url).json(body);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                PesapalApiError::UpstreamTimeout(format!("{} timed out", call.name()))
            } else {
                call.failure(None, e.to_string())
            }
        })?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ {} successful. {status}", call.name());
            response.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    PesapalApiError::UpstreamTimeout(format!("{} timed out", call.name()))
                } else {
                    call.failure(Some(status.as_u16()), format!("Could not deserialize response. {e}"))
                }
            })
        } else {
            let message = response.text().await.unwrap_or_else(|e| e.to_string());
            debug!("💳️ {} failed with status {status}. {message}", call.name());
            Err(call.failure(Some(status.as_u16()), message))
        }
    }

    /// Requests a bearer token using the credentials in the configuration.
    pub async fn request_token(&self) -> Result<AccessToken, PesapalApiError> {
        self.request_token_with(&self.config.consumer_key, &self.config.consumer_secret).await
    }

    /// Exchanges the given consumer key and secret for a bearer token. A single call is made; there are no retries.
    pub async fn request_token_with(
        &self,
        consumer_key: &Secret<String>,
        consumer_secret: &Secret<String>,
    ) -> Result<AccessToken, PesapalApiError> {
        let call = GatewayCall::RequestToken;
        let body = TokenRequest { consumer_key: consumer_key.reveal(), consumer_secret: consumer_secret.reveal() };
        debug!("💳️ Requesting access token");
        let response = self.post_json::<TokenResponse, _>(call, REQUEST_TOKEN_PATH, None, &body).await?;
        if let Some(err) = response.error {
            return Err(call.failure(None, err.to_string()));
        }
        let token = response.token.filter(|t| !t.is_empty()).ok_or_else(|| {
            let message = response.message.unwrap_or_else(|| "The response did not contain a token".to_string());
            call.failure(None, message)
        })?;
        info!("💳️ Access token acquired. Expires {}", response.expiry_date.as_deref().unwrap_or("(unknown)"));
        Ok(AccessToken { token: Secret::new(token), expiry_date: response.expiry_date })
    }

    /// Submits an order to the gateway and returns the redirect url for the customer.
    ///
    /// The order payload is forwarded untouched. Nothing is persisted here; recording the pending order is the
    /// caller's business.
    pub async fn submit_order(&self, token: &str, order: &Value) -> Result<SubmittedOrder, PesapalApiError> {
        let call = GatewayCall::SubmitOrder;
        let token = non_empty(token)
            .ok_or_else(|| PesapalApiError::InvalidRequest("An access token is required to submit an order".into()))?;
        debug!("💳️ Submitting order");
        let response = self.post_json::<SubmitOrderResponse, _>(call, SUBMIT_ORDER_PATH, Some(token), order).await?;
        if let Some(err) = response.error {
            return Err(call.failure(None, err.to_string()));
        }
        let redirect_url = response
            .redirect_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| call.failure(None, "The response did not contain a redirect url".to_string()))?;
        info!(
            "💳️ Order submitted. Tracking id: {}",
            response.order_tracking_id.as_deref().unwrap_or("(not supplied)")
        );
        Ok(SubmittedOrder {
            redirect_url,
            order_tracking_id: response.order_tracking_id,
            merchant_reference: response.merchant_reference,
        })
    }

    /// Registers `callback_url` as an IPN endpoint. The gateway creates a new registration on every call.
    pub async fn register_ipn(&self, token: &str, callback_url: &str) -> Result<IpnRegistration, PesapalApiError> {
        let call = GatewayCall::RegisterIpn;
        let token = non_empty(token)
            .ok_or_else(|| PesapalApiError::InvalidRequest("An access token is required to register an IPN".into()))?;
        let url = Url::parse(callback_url)
            .map_err(|e| PesapalApiError::InvalidRequest(format!("Callback url must be absolute. {e}")))?;
        if !["http", "https"].contains(&url.scheme()) {
            return Err(PesapalApiError::InvalidRequest(format!("Unsupported callback url scheme: {}", url.scheme())));
        }
        debug!("💳️ Registering IPN url {url}");
        let body = RegisterIpnRequest { url: url.as_str(), ipn_notification_type: "POST" };
        let response = self.post_json::<RegisterIpnResponse, _>(call, REGISTER_IPN_PATH, Some(token), &body).await?;
        if let Some(err) = response.error {
            return Err(call.failure(None, err.to_string()));
        }
        let ipn_id = response
            .ipn_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| call.failure(None, "The response did not contain an ipn_id".to_string()))?;
        info!("💳️ IPN url {url} registered with id {ipn_id}");
        Ok(IpnRegistration { ipn_id, url: response.url })
    }
}
