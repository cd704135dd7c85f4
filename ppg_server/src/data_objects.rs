use ppg_common::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The body of an IPN call. PesaPal capitalises the tracking id field, so both spellings are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpnNotification {
    #[serde(default, rename = "orderTrackingId", alias = "OrderTrackingId")]
    pub order_tracking_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterIpnRequest {
    #[serde(default, rename = "accessToken")]
    pub access_token: Secret<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterIpnResponse {
    #[serde(rename = "ipnId")]
    pub ipn_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitOrderRequest {
    #[serde(default, rename = "accessToken")]
    pub access_token: Secret<String>,
    #[serde(default, rename = "orderData")]
    pub order_data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOrderResponse {
    pub redirect_url: String,
}
