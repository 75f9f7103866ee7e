//! Storefront configuration

use std::path::PathBuf;

use clap::Args;
use rusty_money::{Findable, iso::Currency};
use thiserror::Error;

use crate::{
    api::{ApiConfig, DEFAULT_BASE_URL},
    format::PriceFormat,
};

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Currency code is not a known ISO currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Catalog file is priced in a different currency than the cart.
    #[error("catalog is priced in {catalog}, but the configured currency is {configured}")]
    CatalogCurrency {
        /// Currency of the catalog prices.
        catalog: &'static str,
        /// Configured cart currency.
        configured: &'static str,
    },
}

/// Storefront configuration, read from CLI arguments and the environment.
#[derive(Debug, Args)]
pub struct StorefrontConfig {
    /// API connection settings.
    #[command(flatten)]
    pub api: ApiSettings,

    /// Pricing and display settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Build the API client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the configured currency is
    /// not recognised.
    pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        Ok(ApiConfig {
            base_url: self.api.api_url.clone(),
            token: self.api.api_token.clone(),
            currency: self.pricing.currency()?,
        })
    }
}

/// API connection settings.
#[derive(Debug, Args)]
pub struct ApiSettings {
    /// Storefront API base URL
    #[arg(long, env = "STOREFRONT_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Bearer token for the storefront API
    #[arg(long, env = "STOREFRONT_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Read the catalog from a YAML file instead of the API
    #[arg(long, env = "STOREFRONT_CATALOG_FILE")]
    pub catalog_file: Option<PathBuf>,
}

/// Pricing and display settings.
#[derive(Debug, Args)]
pub struct PricingConfig {
    /// ISO 4217 currency code prices are quoted in
    #[arg(long, env = "STOREFRONT_CURRENCY", default_value = "UGX")]
    pub currency: String,

    /// Fraction digits shown in prices; defaults to the currency's exponent
    #[arg(long, env = "STOREFRONT_PRICE_DECIMALS")]
    pub price_decimals: Option<u32>,
}

impl PricingConfig {
    /// Resolve the configured currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the code is not recognised.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        let code = self.currency.trim().to_ascii_uppercase();

        Currency::find(&code).ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }

    /// Price format for the configured decimals.
    pub fn price_format(&self) -> PriceFormat {
        match self.price_decimals {
            Some(decimals) => PriceFormat::new().with_decimals(decimals),
            None => PriceFormat::new(),
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}
