use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PesapalApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("The gateway did not respond in time. {0}")]
    UpstreamTimeout(String),
    #[error("Could not acquire an access token. {}", detail(.status, .message))]
    AuthError { status: Option<u16>, message: String },
    #[error("Order submission failed. {}", detail(.status, .message))]
    SubmissionError { status: Option<u16>, message: String },
    #[error("IPN registration failed. {}", detail(.status, .message))]
    RegistrationError { status: Option<u16>, message: String },
}

fn detail(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(s) => format!("Error {s}. {message}"),
        None => message.to_string(),
    }
}

impl PesapalApiError {
    /// The upstream HTTP status, if the gateway got far enough to send one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::AuthError { status, .. } |
            Self::SubmissionError { status, .. } |
            Self::RegistrationError { status, .. } => *status,
            _ => None,
        }
    }
}
