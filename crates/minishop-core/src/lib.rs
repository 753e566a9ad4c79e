pub mod app_config;
pub mod cart;
pub mod config;
pub mod identity;
pub mod price;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, CartBackend, CheckoutMode, Environment};
pub use cart::CartEntry;
pub use config::{load_app_config, load_app_config_from_env};
pub use identity::{UserId, UserIdentity};
pub use price::{format_amount, PriceFormat};
pub use products::{Product, ProductId};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
