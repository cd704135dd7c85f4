use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifierError {
    #[error("Could not reach the mail transport. {0}")]
    TransportError(String),
    #[error("The mail transport rejected the message. Error {status}. {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    /// The message sent to a customer once their order has been paid.
    pub fn order_confirmation(to: &str, tracking_id: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: "Your Order has been Confirmed".to_string(),
            body: format!("Your order #{tracking_id} has been successfully paid. Thank you for shopping with us!"),
        }
    }
}

/// Sends emails. Delivery is best-effort: callers log failures and carry on.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifierError>;
}
