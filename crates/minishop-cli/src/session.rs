//! One CLI invocation: start the storefront, run a command, print the result.

use std::io::{self, Write};

use anyhow::Context;
use chrono::Utc;
use minishop_core::ProductId;
use minishop_store::{
    CartChange, CartMirror, CatalogSource, HostBridge, Renderer, StoreError, Storefront,
};

use crate::bridge::TerminalBridge;
use crate::render::{Section, TextRenderer};
use crate::Commands;

/// Runs `command` against a freshly started session, then waits for any cart
/// saves it triggered.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or the command fails.
pub(crate) async fn run<S, M, W>(
    shop: &mut Storefront<S, M>,
    command: Commands,
    bridge: &TerminalBridge<W>,
) -> anyhow::Result<()>
where
    S: CatalogSource,
    M: CartMirror,
    W: Write,
{
    if !shop.start(bridge).await {
        anyhow::bail!("the catalog could not be loaded from the shop endpoint");
    }
    let result = execute(shop, command, bridge);
    shop.flush().await;
    result
}

fn execute<S, M>(
    shop: &mut Storefront<S, M>,
    command: Commands,
    bridge: &impl HostBridge,
) -> anyhow::Result<()>
where
    S: CatalogSource,
    M: CartMirror,
{
    match command {
        Commands::Catalog { search, desc } => {
            if let Some(search) = search {
                shop.set_search(search);
            }
            if desc {
                shop.toggle_sort();
            }
            render(shop, &[Section::Catalog])
        }
        Commands::Cart => render(shop, &[Section::Cart]),
        Commands::Add { id, quantity } => {
            let id = ProductId::parse(&id);
            let name = shop
                .catalog()
                .lookup(&id)
                .map(|p| p.name.clone())
                .ok_or_else(|| StoreError::UnknownProduct(id.clone()))?;
            warn_if_unsaved(shop, bridge);
            shop.add_to_cart(id, quantity)?;
            bridge.alert(&format!("Added to cart: {name}"));
            render(shop, &[Section::Cart])
        }
        Commands::Adjust { id, delta } => {
            let id = ProductId::parse(&id);
            warn_if_unsaved(shop, bridge);
            if shop.adjust_quantity(&id, delta) == CartChange::Unchanged {
                bridge.alert(&format!("Product {id} is not in the cart"));
            }
            render(shop, &[Section::Cart])
        }
        Commands::Remove { id } => {
            let id = ProductId::parse(&id);
            warn_if_unsaved(shop, bridge);
            if shop.remove_from_cart(&id) == CartChange::Unchanged {
                bridge.alert(&format!("Product {id} is not in the cart"));
            }
            render(shop, &[Section::Cart])
        }
        Commands::Order { copy } => {
            if copy {
                shop.copy_order(bridge)?;
            } else {
                let order = shop.compose_order(Utc::now())?;
                let mut out = io::stdout().lock();
                writeln!(out, "{}", order.render_text(&shop.settings().view.price))?;
            }
            Ok(())
        }
        Commands::Checkout => {
            let checkout = shop.checkout(bridge)?;
            tracing::debug!(url = %checkout.url, "checkout link opened");
            Ok(())
        }
        Commands::Share { id } => {
            shop.copy_product(&ProductId::parse(&id), bridge)?;
            Ok(())
        }
        Commands::Show { id, quantity } => {
            shop.open_product(&ProductId::parse(&id))?;
            for _ in 1..quantity {
                shop.increase_pending()?;
            }
            let rendered = render(shop, &[Section::Modal]);
            shop.close_modal();
            rendered
        }
    }
}

fn warn_if_unsaved<S, M>(shop: &Storefront<S, M>, bridge: &impl HostBridge)
where
    S: CatalogSource,
    M: CartMirror,
{
    if shop.identity().is_anonymous() {
        bridge.alert("No user id given: cart changes will not be saved.");
    }
}

fn render<S, M>(shop: &Storefront<S, M>, sections: &[Section]) -> anyhow::Result<()>
where
    S: CatalogSource,
    M: CartMirror,
{
    let mut renderer = TextRenderer::new(io::stdout().lock(), sections);
    renderer
        .render(&shop.frame())
        .context("failed to write to stdout")
}
