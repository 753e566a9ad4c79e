pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::SheetClient;
pub use error::SheetError;
pub use normalize::{normalize_products, FieldCandidates, DEFAULT_CANDIDATES, MAX_PRICE};
pub use types::RawRecord;
