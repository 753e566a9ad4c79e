//! The host platform as seen from the storefront.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct BridgeError(pub String);

/// Primitives the chat platform provides to an embedded app.
pub trait HostBridge {
    /// Shows a blocking notification to the user.
    fn alert(&self, message: &str);

    /// Opens an external link, ending the storefront's part in the flow.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError`] if the host refuses or cannot open the link.
    fn open_link(&self, url: &str) -> Result<(), BridgeError>;

    /// # Errors
    ///
    /// Returns [`BridgeError`] if the clipboard is unavailable.
    fn write_clipboard(&self, text: &str) -> Result<(), BridgeError>;
}
