use std::fmt::Display;

use ppg_common::Secret;
use serde::{Deserialize, Serialize};

/// The error object PesaPal embeds in its responses. Failed calls frequently come back with a 2xx status and this
/// object populated, so every response is checked for it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GatewayErrorBody {
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl Display for GatewayErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = [&self.error_type, &self.code, &self.message]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.is_empty())
            .collect::<Vec<&str>>();
        if parts.is_empty() {
            write!(f, "unspecified gateway error")
        } else {
            write!(f, "{}", parts.join(": "))
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: Option<String>,
    #[serde(rename = "expiryDate")]
    pub expiry_date: Option<String>,
    pub error: Option<GatewayErrorBody>,
    pub message: Option<String>,
}

/// A bearer token issued by the gateway. The token is not cached here; callers refresh it when it expires.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: Secret<String>,
    pub expiry_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterIpnRequest<'a> {
    pub url: &'a str,
    pub ipn_notification_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterIpnResponse {
    pub ipn_id: Option<String>,
    pub url: Option<String>,
    pub error: Option<GatewayErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpnRegistration {
    pub ipn_id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitOrderResponse {
    pub order_tracking_id: Option<String>,
    pub merchant_reference: Option<String>,
    pub redirect_url: Option<String>,
    pub error: Option<GatewayErrorBody>,
}

/// The gateway's answer to an order submission. `redirect_url` is where the customer completes payment, and
/// `order_tracking_id` is the id that later IPN calls will carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedOrder {
    pub redirect_url: String,
    pub order_tracking_id: Option<String>,
    pub merchant_reference: Option<String>,
}
