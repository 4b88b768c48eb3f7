// src/config.rs
use crate::domain::errors::{AppError, AppResult};
use crate::infrastructure::gateway::CheckoutSettings;
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Booking client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend booking API
    pub backend: BackendConfig,

    /// Payment gateway configuration
    pub gateway: GatewayConfig,

    /// Where buyers are sent when a paid booking fails
    pub support: SupportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. "https://admin.bookvenue.app/api"
    pub base_url: String,

    /// Bearer token of the signed-in user
    pub auth_token: Option<String>,
}

/// Which checkout integration the platform uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Hosted,
    Embedded,
}

impl FromStr for Platform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hosted" | "web" => Ok(Platform::Hosted),
            "embedded" | "native" => Ok(Platform::Embedded),
            other => Err(AppError::Config(format!("Unsupported checkout platform: {}", other))),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Platform::Hosted => write!(f, "hosted"),
            Platform::Embedded => write!(f, "embedded"),
        }
    }
}

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Checkout integration
    pub platform: Platform,

    /// Public gateway key
    pub key_id: String,

    /// Hosted checkout session endpoint
    pub checkout_url: String,

    /// Merchant name shown at checkout
    pub merchant_name: String,

    /// ISO currency code
    pub currency: String,

    /// Checkout accent colour
    pub theme_color: String,

    /// Prefixed to ten-digit buyer numbers
    pub country_code: String,

    /// Longest wait for the buyer to finish paying
    pub payment_timeout_secs: u64,

    /// Payment method recorded on each booking
    pub payment_method: String,
}

impl GatewayConfig {
    pub fn payment_timeout(&self) -> Duration {
        Duration::from_secs(self.payment_timeout_secs)
    }

    pub fn checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            key_id: self.key_id.clone(),
            merchant_name: self.merchant_name.clone(),
            currency: self.currency.clone(),
            theme_color: self.theme_color.clone(),
            country_code: self.country_code.clone(),
        }
    }
}

/// Support contact configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportConfig {
    /// Email or phone quoted in reconciliation notices
    pub contact: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "warn", "error")
    pub level: String,

    /// Log to file
    pub to_file: bool,

    /// Log file path
    pub file_path: Option<String>,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Config::default();

        let backend_config = BackendConfig {
            base_url: env_or("BACKEND_URL", &defaults.backend.base_url),
            auth_token: env::var("BACKEND_TOKEN").ok().filter(|t| !t.is_empty()),
        };

        let gateway_config = GatewayConfig {
            platform: env_or("CHECKOUT_PLATFORM", "hosted").parse()?,
            key_id: env::var("GATEWAY_KEY_ID").map_err(|_| {
                AppError::Config("Missing GATEWAY_KEY_ID environment variable".to_string())
            })?,
            checkout_url: env_or("CHECKOUT_URL", &defaults.gateway.checkout_url),
            merchant_name: env_or("MERCHANT_NAME", &defaults.gateway.merchant_name),
            currency: env_or("CURRENCY", &defaults.gateway.currency),
            theme_color: env_or("THEME_COLOR", &defaults.gateway.theme_color),
            country_code: env_or("COUNTRY_CODE", &defaults.gateway.country_code),
            payment_timeout_secs: env::var("PAYMENT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.gateway.payment_timeout_secs),
            payment_method: env_or("PAYMENT_METHOD", &defaults.gateway.payment_method),
        };

        let support_config = SupportConfig {
            contact: env_or("SUPPORT_CONTACT", &defaults.support.contact),
        };

        let logging_config = LoggingConfig {
            level: env_or("LOG_LEVEL", "info"),
            to_file: env_or("LOG_TO_FILE", "false").parse().unwrap_or(false),
            file_path: env::var("LOG_FILE_PATH").ok(),
        };

        Ok(Config {
            backend: backend_config,
            gateway: gateway_config,
            support: support_config,
            logging: logging_config,
        })
    }

    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let mut file = File::open(path).map_err(|e| {
            AppError::Config(format!("Failed to open config file: {}", e))
        })?;

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| {
            AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Config = serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file: {}", e))
        })?;

        if config.gateway.payment_timeout_secs == 0 {
            return Err(AppError::Config(
                "payment_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    /// Initialize logging based on configuration
    pub fn init_logging(&self) -> AppResult<()> {
        let mut builder = env_logger::Builder::new();

        let log_level = match self.logging.level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "info" => log::LevelFilter::Info,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        };

        builder.filter_level(log_level);

        if self.logging.to_file {
            if let Some(file_path) = &self.logging.file_path {
                let file = File::create(file_path).map_err(|e| {
                    AppError::Config(format!("Failed to create log file: {}", e))
                })?;

                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
        }

        builder
            .try_init()
            .map_err(|e| AppError::Config(format!("Failed to initialise logger: {}", e)))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "https://admin.bookvenue.app/api".to_string(),
                auth_token: None,
            },
            gateway: GatewayConfig {
                platform: Platform::Hosted,
                key_id: "".to_string(),
                checkout_url: "https://checkout.bookvenue.app/v1/sessions".to_string(),
                merchant_name: "BookVenue".to_string(),
                currency: "INR".to_string(),
                theme_color: "#2563EB".to_string(),
                country_code: "+91".to_string(),
                payment_timeout_secs: 900,
                payment_method: "razorpay".to_string(),
            },
            support: SupportConfig {
                contact: "support@bookvenue.app".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                to_file: false,
                file_path: None,
            },
        }
    }
}
