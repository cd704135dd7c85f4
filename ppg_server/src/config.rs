use std::{env, time::Duration};

use log::*;
use pesapal_tools::PesapalConfig;
use ppg_common::{non_empty, parse_boolean_flag, Secret};
use ppg_engine::ReconcileOptions;

const DEFAULT_PPG_HOST: &str = "127.0.0.1";
const DEFAULT_PPG_PORT: u16 = 7000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/ppg_store.db";
pub const DEFAULT_MAIL_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_MAIL_FROM: &str = "orders@example.com";
const DEFAULT_MAIL_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The externally visible base url of this server, e.g. `https://shop.example.com`. When set, it is used to build
    /// the IPN callback url instead of the scheme and host of the incoming request.
    pub public_url: Option<String>,
    /// Perform the side effects of a reconciliation at most once per `(tracking id, status)` pair.
    pub dedupe_side_effects: bool,
    /// Origins allowed to call the API from a browser. An empty list allows any origin.
    pub cors_origins: Vec<String>,
    pub pesapal: PesapalConfig,
    pub mailer: MailerConfig,
}

#[derive(Clone, Debug)]
pub struct MailerConfig {
    pub api_url: String,
    /// If no key is configured, emails are logged instead of sent.
    pub api_key: Option<Secret<String>>,
    pub from: String,
    pub timeout: Duration,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_MAIL_API_URL.to_string(),
            api_key: None,
            from: DEFAULT_MAIL_FROM.to_string(),
            timeout: DEFAULT_MAIL_TIMEOUT,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PPG_HOST.to_string(),
            port: DEFAULT_PPG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            public_url: None,
            dedupe_side_effects: false,
            cors_origins: Vec::new(),
            pesapal: PesapalConfig::default(),
            mailer: MailerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("PPG_HOST").ok().unwrap_or_else(|| DEFAULT_PPG_HOST.into());
        let port = env::var("PPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PPG_PORT. {e} Using the default, {DEFAULT_PPG_PORT}, instead."
                    );
                    DEFAULT_PPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PPG_PORT);
        let database_url = env::var("PPG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ PPG_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let public_url = env::var("PPG_PUBLIC_URL").ok().and_then(|s| non_empty(&s).map(String::from));
        if public_url.is_none() {
            info!("🪛️ PPG_PUBLIC_URL is not set. IPN callback urls will be built from the incoming request.");
        }
        let dedupe_side_effects = parse_boolean_flag(env::var("PPG_DEDUPE_SIDE_EFFECTS").ok(), false);
        if dedupe_side_effects {
            info!("🪛️ Side effects of payment notifications will be performed once per order status.");
        }
        let cors_origins = parse_origins(env::var("PPG_CORS_ORIGINS").ok().as_deref());
        if cors_origins.is_empty() {
            info!("🪛️ PPG_CORS_ORIGINS is not set. Browsers on any origin may call the API.");
        }
        let pesapal = PesapalConfig::new_from_env_or_default();
        let mailer = MailerConfig::from_env_or_default();
        Self { host, port, database_url, public_url, dedupe_side_effects, cors_origins, pesapal, mailer }
    }

    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions::default().with_dedupe(self.dedupe_side_effects)
    }
}

/// Splits a comma-separated list of origins. `*` on its own means any origin, and yields an empty list.
pub fn parse_origins(value: Option<&str>) -> Vec<String> {
    let origins: Vec<String> =
        value.unwrap_or_default().split(',').filter_map(non_empty).map(|s| s.trim_end_matches('/').to_string()).collect();
    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}

impl MailerConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("PPG_MAIL_API_URL").ok().unwrap_or_else(|| DEFAULT_MAIL_API_URL.into());
        let api_key = env::var("PPG_MAIL_API_KEY").ok().and_then(|s| non_empty(&s).map(|k| Secret::new(k.to_string())));
        if api_key.is_none() {
            warn!("🪛️ PPG_MAIL_API_KEY is not set. Confirmation emails will be logged, not sent.");
        }
        let from = env::var("PPG_MAIL_FROM").ok().unwrap_or_else(|| {
            warn!("🪛️ PPG_MAIL_FROM is not set. Using the default sender address, {DEFAULT_MAIL_FROM}.");
            DEFAULT_MAIL_FROM.to_string()
        });
        Self { api_url, api_key, from, timeout: DEFAULT_MAIL_TIMEOUT }
    }
}

/// The parts of the configuration that request handlers need.
#[derive(Clone, Debug, Default)]
pub struct ServerOptions {
    pub public_url: Option<String>,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { public_url: config.public_url.clone() }
    }
}
