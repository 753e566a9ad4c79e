mod bridge;
mod render;
mod session;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use minishop_core::{CartBackend, UserId, UserIdentity};
use minishop_sheets::SheetClient;
use minishop_store::{LocalCartMirror, Storefront, StorefrontSettings};
use tracing_subscriber::EnvFilter;

use crate::bridge::TerminalBridge;

#[derive(Debug, Parser)]
#[command(name = "minishop")]
#[command(about = "Browse the catalog, manage your cart and hand orders to the shop")]
struct Cli {
    #[command(flatten)]
    identity: IdentityArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Who is shopping. Without `--user-id` the session is anonymous: the cart is
/// not saved and checkout is unavailable.
#[derive(Debug, Args)]
struct IdentityArgs {
    #[arg(long, env = "MINISHOP_USER_ID", global = true)]
    user_id: Option<String>,
    #[arg(long, env = "MINISHOP_USER_FIRST_NAME", global = true)]
    first_name: Option<String>,
    #[arg(long, env = "MINISHOP_USER_LAST_NAME", global = true)]
    last_name: Option<String>,
    /// Chat handle, with or without the leading `@`
    #[arg(long, env = "MINISHOP_USER_USERNAME", global = true)]
    username: Option<String>,
}

impl IdentityArgs {
    fn into_identity(self) -> UserIdentity {
        UserIdentity {
            id: self.user_id.as_deref().and_then(UserId::new),
            first_name: self.first_name,
            last_name: self.last_name,
            username: self
                .username
                .map(|u| u.trim().trim_start_matches('@').to_owned())
                .filter(|u| !u.is_empty()),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List products, optionally filtered and sorted
    Catalog {
        /// Case-insensitive match on name or concentration
        #[arg(long)]
        search: Option<String>,
        /// Sort by price, highest first
        #[arg(long)]
        desc: bool,
    },
    /// Show the cart
    Cart,
    /// Add a product to the cart
    Add {
        id: String,
        #[arg(long, short, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a cart quantity by a signed amount; reaching zero removes the line
    Adjust {
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Remove a product from the cart
    Remove { id: String },
    /// Print the order summary
    Order {
        /// Also copy it
        #[arg(long)]
        copy: bool,
    },
    /// Save the cart and open the chat with the shop
    Checkout,
    /// Copy a product's details and link
    Share { id: String },
    /// Show one product with a quantity preview
    Show {
        id: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = minishop_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Catalog {
        search: None,
        desc: false,
    });
    let identity = cli.identity.into_identity();
    tracing::debug!(env = %config.env, anonymous = identity.is_anonymous(), "starting session");

    let client = SheetClient::new(
        &config.api_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    let settings = StorefrontSettings::from_app_config(&config);
    let bridge = TerminalBridge::new(std::io::stdout());

    match config.cart_backend {
        CartBackend::Remote => {
            let mirror = Arc::new(client.clone());
            let mut shop = Storefront::new(client, mirror, identity, settings);
            session::run(&mut shop, command, &bridge).await
        }
        CartBackend::Local => {
            let mirror = Arc::new(LocalCartMirror::new(&config.cart_dir));
            let mut shop = Storefront::new(client, mirror, identity, settings);
            session::run(&mut shop, command, &bridge).await
        }
    }
}

#[cfg(test)]
mod tests;
