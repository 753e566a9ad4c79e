//! Deep links that hand a checkout over to the human operator.

use minishop_core::{CheckoutMode, UserId};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

const CHAT_LINK_BASE: &str = "https://t.me";

/// Characters left unescaped in a query value, matching `encodeURIComponent`.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn chat_url(manager: &str, param: &str, value: &str) -> String {
    let handle = manager.trim().trim_start_matches('@');
    format!(
        "{CHAT_LINK_BASE}/{handle}?{param}={}",
        utf8_percent_encode(value, QUERY_VALUE)
    )
}

/// `https://t.me/<manager>?start=<user id>`
#[must_use]
pub fn start_parameter_link(manager: &str, user_id: &UserId) -> String {
    chat_url(manager, "start", user_id.as_str())
}

/// `https://t.me/<manager>?text=<percent-encoded message>`
#[must_use]
pub fn prefilled_message_link(manager: &str, message: &str) -> String {
    chat_url(manager, "text", message)
}

#[must_use]
pub fn checkout_link(
    mode: CheckoutMode,
    manager: &str,
    user_id: &UserId,
    order_text: &str,
) -> String {
    match mode {
        CheckoutMode::StartParameter => start_parameter_link(manager, user_id),
        CheckoutMode::PrefilledMessage => prefilled_message_link(manager, order_text),
    }
}
