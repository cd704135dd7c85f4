use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;
use ppg_common::Secret;

pub const SANDBOX_API_URL: &str = "https://cybqa.pesapal.com/pesapalv3";
pub const LIVE_API_URL: &str = "https://pay.pesapal.com/v3";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PesapalEnvironment {
    #[default]
    Sandbox,
    Live,
}

impl PesapalEnvironment {
    pub fn api_url(&self) -> &'static str {
        match self {
            Self::Sandbox => SANDBOX_API_URL,
            Self::Live => LIVE_API_URL,
        }
    }
}

impl FromStr for PesapalEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "live" | "production" => Ok(Self::Live),
            other => Err(format!("Unknown PesaPal environment: {other}")),
        }
    }
}

impl Display for PesapalEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sandbox => write!(f, "sandbox"),
            Self::Live => write!(f, "live"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PesapalConfig {
    pub environment: PesapalEnvironment,
    /// Base url of the v3 API, without the `/api/...` suffix.
    pub api_url: String,
    pub consumer_key: Secret<String>,
    pub consumer_secret: Secret<String>,
    /// Applied to every outbound call. Expiry is reported as [`crate::PesapalApiError::UpstreamTimeout`].
    pub timeout: Duration,
}

impl Default for PesapalConfig {
    fn default() -> Self {
        Self::for_environment(PesapalEnvironment::default())
    }
}

impl PesapalConfig {
    pub fn for_environment(environment: PesapalEnvironment) -> Self {
        Self {
            environment,
            api_url: environment.api_url().to_string(),
            consumer_key: Secret::default(),
            consumer_secret: Secret::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// A configuration pointing at an arbitrary base url. Mostly useful for tests and proxies.
    pub fn with_api_url<S: Into<String>>(api_url: S) -> Self {
        Self { api_url: api_url.into(), ..Self::default() }
    }

    pub fn with_credentials(mut self, consumer_key: &str, consumer_secret: &str) -> Self {
        self.consumer_key = Secret::new(consumer_key.to_string());
        self.consumer_secret = Secret::new(consumer_secret.to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn new_from_env_or_default() -> Self {
        let environment = env::var("PPG_PESAPAL_ENVIRONMENT")
            .map_err(|_| info!("🪛️ PPG_PESAPAL_ENVIRONMENT not set, using the sandbox environment"))
            .and_then(|s| s.parse::<PesapalEnvironment>().map_err(|e| warn!("🪛️ {e}. Using the sandbox environment")))
            .unwrap_or_default();
        let api_url = env::var("PPG_PESAPAL_API_URL").unwrap_or_else(|_| environment.api_url().to_string());
        let consumer_key = Secret::new(env::var("PPG_PESAPAL_CONSUMER_KEY").unwrap_or_else(|_| {
            warn!("🪛️ PPG_PESAPAL_CONSUMER_KEY not set. Token requests will be rejected by the gateway.");
            String::default()
        }));
        let consumer_secret = Secret::new(env::var("PPG_PESAPAL_CONSUMER_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ PPG_PESAPAL_CONSUMER_SECRET not set. Token requests will be rejected by the gateway.");
            String::default()
        }));
        let timeout = env::var("PPG_PESAPAL_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for PPG_PESAPAL_TIMEOUT_SECS ({s}). {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        info!("🪛️ PesaPal {environment} environment at {api_url}");
        Self { environment, api_url, consumer_key, consumer_secret, timeout }
    }
}
