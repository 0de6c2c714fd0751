use std::env;

use banolite_engine::DEFAULT_FEE_BPS;
use bnl_common::{helpers::parse_boolean_flag, Secret};
use log::*;

use crate::errors::ServerError;

const DEFAULT_BNL_HOST: &str = "127.0.0.1";
const DEFAULT_BNL_PORT: u16 = 8360;
/// The header the payment provider uses to carry the HMAC-SHA512 hex signature of the request body.
pub const DEFAULT_SIGNATURE_HEADER: &str = "x-payment-signature";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Platform fee in basis points, taken off every seller's gross proceeds.
    pub fee_bps: i64,
    pub payment: PaymentConfig,
    pub email: EmailConfig,
    pub storage: StorageConfig,
    pub chat: ChatConfig,
}

/// Webhook verification settings for the payment provider.
#[derive(Clone, Debug)]
pub struct PaymentConfig {
    /// The shared secret the provider signs webhook bodies with.
    pub webhook_secret: Secret<String>,
    /// The header carrying the signature.
    pub signature_header: String,
    /// If false, signature checks are skipped entirely. **Local development only.**
    pub hmac_checks: bool,
}

#[derive(Clone, Debug, Default)]
pub struct EmailConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    /// The From address on receipts and sale alerts.
    pub sender: String,
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.sender.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    /// Local directory the upload buckets live under.
    pub root_dir: String,
    /// Public URL prefix stored files are served from.
    pub public_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root_dir: "data/uploads".to_string(), public_url: "http://localhost:8360/uploads".to_string() }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChatConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub model: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BNL_HOST.to_string(),
            port: DEFAULT_BNL_PORT,
            database_url: String::default(),
            fee_bps: DEFAULT_FEE_BPS,
            payment: PaymentConfig::default(),
            email: EmailConfig::default(),
            storage: StorageConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            webhook_secret: Secret::new(String::default()),
            signature_header: DEFAULT_SIGNATURE_HEADER.to_string(),
            hmac_checks: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    /// Loads the configuration from the environment. Most settings fall back to logged defaults, but a missing
    /// webhook secret is fatal: a server that cannot verify charge events must not start.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let host = env::var("BNL_HOST").ok().unwrap_or_else(|| DEFAULT_BNL_HOST.into());
        let port = env::var("BNL_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BNL_PORT. {e} Using the default, {DEFAULT_BNL_PORT}, instead."
                    );
                    DEFAULT_BNL_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BNL_PORT);
        let database_url = env::var("BNL_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ BNL_DATABASE_URL is not set. Please set it to the URL for the Banolite database.");
            String::default()
        });
        let fee_bps = env::var("BNL_FEE_BPS")
            .ok()
            .and_then(|s| {
                s.parse::<i64>()
                    .map_err(|e| {
                        error!("🪛️ {s} is not a valid value for BNL_FEE_BPS. {e} Using the default instead.");
                        e
                    })
                    .ok()
            })
            .unwrap_or(DEFAULT_FEE_BPS);
        let payment = PaymentConfig::try_from_env()?;
        let email = EmailConfig::from_env_or_default();
        let storage = StorageConfig::from_env_or_default();
        let chat = ChatConfig::from_env_or_default();
        Ok(Self { host, port, database_url, fee_bps, payment, email, storage, chat })
    }
}

impl PaymentConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let hmac_checks = parse_boolean_flag(env::var("BNL_PAYMENT_HMAC_CHECKS").ok(), true);
        let webhook_secret = env::var("BNL_PAYMENT_WEBHOOK_SECRET").map(Secret::new).unwrap_or_default();
        if hmac_checks && webhook_secret.is_empty() {
            return Err(ServerError::ConfigurationError(
                "BNL_PAYMENT_WEBHOOK_SECRET is not set. The server cannot verify charge events without it. Set the \
                 secret, or explicitly disable signature checks with BNL_PAYMENT_HMAC_CHECKS=0 (local development \
                 only)."
                    .into(),
            ));
        }
        if !hmac_checks {
            warn!("🪛️ Webhook signature checks are DISABLED. Never run like this in production.");
        }
        let signature_header =
            env::var("BNL_PAYMENT_SIGNATURE_HEADER").ok().unwrap_or_else(|| DEFAULT_SIGNATURE_HEADER.into());
        Ok(Self { webhook_secret, signature_header, hmac_checks })
    }
}

impl EmailConfig {
    pub fn from_env_or_default() -> Self {
        let api_key = env::var("BNL_EMAIL_API_KEY").map(Secret::new).unwrap_or_default();
        let base_url = env::var("BNL_EMAIL_URL").ok().unwrap_or_else(|| "https://api.resend.com".into());
        let sender = env::var("BNL_EMAIL_FROM").ok().unwrap_or_default();
        if api_key.is_empty() {
            info!("🪛️ BNL_EMAIL_API_KEY is not set. Transactional emails are disabled.");
        }
        Self { api_key, base_url, sender }
    }
}

impl StorageConfig {
    pub fn from_env_or_default() -> Self {
        let defaults = StorageConfig::default();
        let root_dir = env::var("BNL_STORAGE_DIR").ok().unwrap_or_else(|| {
            info!("🪛️ BNL_STORAGE_DIR is not set. Using the default, {}.", defaults.root_dir);
            defaults.root_dir.clone()
        });
        let public_url = env::var("BNL_STORAGE_PUBLIC_URL").ok().unwrap_or_else(|| {
            info!("🪛️ BNL_STORAGE_PUBLIC_URL is not set. Using the default, {}.", defaults.public_url);
            defaults.public_url.clone()
        });
        Self { root_dir, public_url }
    }
}

impl ChatConfig {
    pub fn from_env_or_default() -> Self {
        let api_key = env::var("BNL_CHAT_API_KEY").map(Secret::new).unwrap_or_default();
        let base_url = env::var("BNL_CHAT_URL").ok().unwrap_or_default();
        let model = env::var("BNL_CHAT_MODEL").ok().unwrap_or_else(|| "gemini-2.0-flash".into());
        if api_key.is_empty() {
            info!("🪛️ BNL_CHAT_API_KEY is not set. The chat relay will reject requests.");
        }
        Self { api_key, base_url, model }
    }
}
