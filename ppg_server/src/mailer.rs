//! Delivery of customer emails.
//!
//! [`HttpMailer`] posts messages to a transactional mail HTTP API (the Resend `POST /emails` format). When no API key
//! is configured the server uses [`LogMailer`] instead, which only writes the message to the log. [`Mailer`] wraps
//! the two so that the server can pick one at start-up.
use log::*;
use ppg_common::Secret;
use ppg_engine::traits::{EmailMessage, Notifier, NotifierError};
use reqwest::Client;
use serde::Serialize;

use crate::{config::MailerConfig, errors::ServerError};

#[derive(Debug, Serialize)]
struct MailApiRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

#[derive(Clone, Debug)]
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: Secret<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(config: &MailerConfig, api_key: Secret<String>) -> Result<Self, ServerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServerError::InitializeError(format!("Could not create mail client. {e}")))?;
        Ok(Self { client, api_url: config.api_url.clone(), api_key, from: config.from.clone() })
    }
}

impl Notifier for HttpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifierError> {
        let request = MailApiRequest {
            from: &self.from,
            to: vec![message.to.as_str()],
            subject: &message.subject,
            text: &message.body,
        };
        trace!("📧️ Posting email to {} via {}", message.to, self.api_url);
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.reveal())
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifierError::TransportError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            debug!("📧️ Email '{}' accepted for delivery to {}", message.subject, message.to);
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_else(|e| e.to_string());
            Err(NotifierError::Rejected { status: status.as_u16(), message: detail })
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new<S: Into<String>>(from: S) -> Self {
        Self { from: from.into() }
    }
}

impl Notifier for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifierError> {
        info!(
            "📧️ (not sent) From: {} To: {} Subject: {} Body: {}",
            self.from, message.to, message.subject, message.body
        );
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub enum Mailer {
    Http(HttpMailer),
    Log(LogMailer),
}

impl Mailer {
    pub fn from_config(config: &MailerConfig) -> Result<Self, ServerError> {
        match &config.api_key {
            Some(key) => {
                info!("📧️ Sending emails through {}", config.api_url);
                Ok(Self::Http(HttpMailer::new(config, key.clone())?))
            },
            None => {
                info!("📧️ No mail API key configured. Emails will be written to the log.");
                Ok(Self::Log(LogMailer::new(config.from.as_str())))
            },
        }
    }
}

impl Notifier for Mailer {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifierError> {
        match self {
            Self::Http(m) => m.send(message).await,
            Self::Log(m) => m.send(message).await,
        }
    }
}
