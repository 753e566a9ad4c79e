use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where the cart mirror lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartBackend {
    /// The `Carts` sheet behind the spreadsheet proxy.
    Remote,
    /// One JSON file per user under `cart_dir`.
    Local,
}

/// How checkout hands the order to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode {
    /// Deep link carries the user id as a start parameter.
    StartParameter,
    /// Deep link carries the composed order text.
    PrefilledMessage,
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub manager_username: String,
    pub env: Environment,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub cart_backend: CartBackend,
    pub cart_dir: PathBuf,
    pub checkout_mode: CheckoutMode,
    pub currency_symbol: String,
    pub placeholder_image_url: String,
    pub share_origin: Option<String>,
}

impl AppConfig {
    /// Operator handle without the leading `@`.
    #[must_use]
    pub fn manager_handle(&self) -> &str {
        self.manager_username.trim_start_matches('@')
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The proxy URL embeds the deployment key of the sheet script.
        f.debug_struct("AppConfig")
            .field("api_url", &"[redacted]")
            .field("manager_username", &self.manager_username)
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("cart_backend", &self.cart_backend)
            .field("cart_dir", &self.cart_dir)
            .field("checkout_mode", &self.checkout_mode)
            .field("currency_symbol", &self.currency_symbol)
            .field("placeholder_image_url", &self.placeholder_image_url)
            .field("share_origin", &self.share_origin)
            .finish()
    }
}
