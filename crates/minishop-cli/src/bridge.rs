//! The terminal standing in for the chat platform.

use std::cell::RefCell;
use std::io::Write;

use minishop_store::{BridgeError, HostBridge};

/// Alerts, links and clipboard writes all go to one text sink.
///
/// There is no system clipboard here: copied text is printed between
/// markers so it can be selected by hand.
pub struct TerminalBridge<W: Write> {
    out: RefCell<W>,
}

impl<W: Write> TerminalBridge<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn emit(&self, text: &str) -> std::io::Result<()> {
        let mut out = self.out.borrow_mut();
        writeln!(out, "{text}")?;
        out.flush()
    }
}

impl<W: Write> HostBridge for TerminalBridge<W> {
    fn alert(&self, message: &str) {
        if let Err(e) = self.emit(&format!("[!] {message}")) {
            tracing::warn!(error = %e, "failed to show alert");
        }
    }

    fn open_link(&self, url: &str) -> Result<(), BridgeError> {
        self.emit(&format!("Open this link to finish your order:\n{url}"))
            .map_err(|e| BridgeError(e.to_string()))
    }

    fn write_clipboard(&self, text: &str) -> Result<(), BridgeError> {
        self.emit(&format!("----- copied -----\n{text}\n------------------"))
            .map_err(|e| BridgeError(e.to_string()))
    }
}
