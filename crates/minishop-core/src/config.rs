use std::path::PathBuf;

use crate::app_config::{AppConfig, CartBackend, CheckoutMode, Environment};
use crate::ConfigError;

pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/300x200?text=No+Image";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// `HashMap` without `set_var`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let api_url = require("MINISHOP_API_URL")?;
    let manager_username = require("MINISHOP_MANAGER_USERNAME")?;

    let env = parse_environment(&or_default("MINISHOP_ENV", "development"))?;
    let log_level = or_default("MINISHOP_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("MINISHOP_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("MINISHOP_USER_AGENT", "minishop/0.1 (storefront)");
    let cart_backend = parse_cart_backend(&or_default("MINISHOP_CART_BACKEND", "remote"))?;
    let cart_dir = PathBuf::from(or_default("MINISHOP_CART_DIR", "./.minishop/carts"));
    let checkout_mode = parse_checkout_mode(&or_default("MINISHOP_CHECKOUT_MODE", "start"))?;
    let currency_symbol = or_default("MINISHOP_CURRENCY_SYMBOL", "₽");
    let placeholder_image_url = or_default(
        "MINISHOP_PLACEHOLDER_IMAGE_URL",
        DEFAULT_PLACEHOLDER_IMAGE_URL,
    );
    let share_origin = lookup("MINISHOP_SHARE_ORIGIN")
        .ok()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty());

    Ok(AppConfig {
        api_url,
        manager_username,
        env,
        log_level,
        request_timeout_secs,
        user_agent,
        cart_backend,
        cart_dir,
        checkout_mode,
        currency_symbol,
        placeholder_image_url,
        share_origin,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MINISHOP_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}

fn parse_cart_backend(s: &str) -> Result<CartBackend, ConfigError> {
    match s {
        "remote" => Ok(CartBackend::Remote),
        "local" => Ok(CartBackend::Local),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MINISHOP_CART_BACKEND".to_string(),
            reason: format!("expected remote or local; got \"{other}\""),
        }),
    }
}

fn parse_checkout_mode(s: &str) -> Result<CheckoutMode, ConfigError> {
    match s {
        "start" => Ok(CheckoutMode::StartParameter),
        "message" => Ok(CheckoutMode::PrefilledMessage),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MINISHOP_CHECKOUT_MODE".to_string(),
            reason: format!("expected start or message; got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
