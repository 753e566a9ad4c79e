//! Client-side state for the storefront: catalog and cart stores, the query
//! engine, order composition, and the pure view projections rendered from them.

pub mod bridge;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod handoff;
pub mod mirror;
pub mod modal;
pub mod order;
pub mod query;
pub mod signal;
pub mod storefront;
pub mod view;

pub use bridge::{BridgeError, HostBridge};
pub use cart::{CartChange, CartStore, ReloadOutcome};
pub use catalog::CatalogStore;
pub use error::{MirrorError, StoreError};
pub use mirror::{CartMirror, LocalCartMirror, MemoryCartMirror};
pub use modal::ProductModal;
pub use order::{compose_order, product_share_text, Order, OrderLine};
pub use query::{Query, SortDirection};
pub use signal::RenderSignal;
pub use storefront::{CatalogSource, Checkout, Storefront, StorefrontSettings};
pub use view::{Frame, Renderer, ViewSettings};
