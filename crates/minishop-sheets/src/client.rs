//! HTTP client for the spreadsheet-proxy endpoint.
//!
//! Wraps `reqwest` with the proxy's `{success, data, error}` envelope handling.
//! Reads go to `GET <endpoint>?sheet=<name>`; the only write is the
//! `UPDATE_CART` action posted to the bare endpoint.

use std::time::Duration;

use minishop_core::{CartEntry, Product, UserId};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

use crate::error::SheetError;
use crate::normalize::{cart_entries_from_records, normalize_products};
use crate::types::{
    RawRecord, SheetEnvelope, UpdateCartRequest, CARTS_SHEET, PRODUCTS_SHEET, UPDATE_CART_ACTION,
};

/// Client for the spreadsheet-proxy API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference-counted, so a
/// clone can be moved into a spawned persist task.
#[derive(Debug, Clone)]
pub struct SheetClient {
    client: Client,
    endpoint: Url,
}

impl SheetClient {
    /// Creates a client for `endpoint` with the given timeout and `User-Agent`.
    ///
    /// The endpoint is used verbatim (script URLs end in `/exec` and must not
    /// gain a trailing slash).
    ///
    /// # Errors
    ///
    /// Returns [`SheetError::InvalidEndpoint`] if `endpoint` is not an
    /// absolute URL, or [`SheetError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(endpoint: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SheetError> {
        let endpoint = Url::parse(endpoint.trim()).map_err(|e| SheetError::InvalidEndpoint {
            url: endpoint.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Fetches the `Products` sheet as raw rows.
    ///
    /// # Errors
    ///
    /// - [`SheetError::Rejected`] if the payload reports `success: false`.
    /// - [`SheetError::UnexpectedStatus`] on a non-2xx HTTP status.
    /// - [`SheetError::Http`] on network failure.
    /// - [`SheetError::Deserialize`] if the body is not the expected envelope.
    pub async fn fetch_product_records(&self) -> Result<Vec<RawRecord>, SheetError> {
        let url = self.sheet_url(PRODUCTS_SHEET, &[]);
        let records: Option<Vec<RawRecord>> =
            Self::request_envelope(self.client.get(url.clone()), url.as_str()).await?;
        Ok(records.unwrap_or_default())
    }

    /// Fetches the `Products` sheet and normalizes every row.
    ///
    /// # Errors
    ///
    /// Same as [`SheetClient::fetch_product_records`].
    pub async fn fetch_products(&self) -> Result<Vec<Product>, SheetError> {
        let records = self.fetch_product_records().await?;
        let products = normalize_products(&records);
        tracing::debug!(count = products.len(), "fetched catalog");
        Ok(products)
    }

    /// Fetches the stored cart for `user_id` from the `Carts` sheet.
    ///
    /// Rows that cannot be read as `{id, quantity >= 1}` are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`SheetClient::fetch_product_records`].
    pub async fn fetch_cart(&self, user_id: &UserId) -> Result<Vec<CartEntry>, SheetError> {
        let url = self.sheet_url(CARTS_SHEET, &[("user_id", user_id.as_str())]);
        let records: Option<Vec<RawRecord>> =
            Self::request_envelope(self.client.get(url.clone()), url.as_str()).await?;
        Ok(cart_entries_from_records(&records.unwrap_or_default()))
    }

    /// Overwrites the stored cart for `user_id`.
    ///
    /// An empty response body counts as success.
    ///
    /// # Errors
    ///
    /// Same as [`SheetClient::fetch_product_records`].
    pub async fn update_cart(&self, user_id: &UserId, cart: &[CartEntry]) -> Result<(), SheetError> {
        let body = UpdateCartRequest {
            action: UPDATE_CART_ACTION,
            user_id: user_id_value(user_id),
            cart,
        };
        let request = self.client.post(self.endpoint.clone()).json(&body);
        let context = self.endpoint.as_str();
        let text = Self::request_body(request, context).await?;
        if text.trim().is_empty() {
            return Ok(());
        }
        let _: Option<serde_json::Value> = Self::parse_envelope(&text, context)?;
        Ok(())
    }

    /// Builds `<endpoint>?sheet=<sheet>&...`, keeping any query the endpoint
    /// already carries.
    fn sheet_url(&self, sheet: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("sheet", sheet);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends `request`, asserts a 2xx status, and unwraps the envelope.
    ///
    /// Returns the envelope's `data`, which may be absent.
    async fn request_envelope<T: DeserializeOwned>(
        request: RequestBuilder,
        context: &str,
    ) -> Result<Option<T>, SheetError> {
        let body = Self::request_body(request, context).await?;
        Self::parse_envelope(&body, context)
    }

    /// Sends `request` and returns the body text of a 2xx response.
    async fn request_body(request: RequestBuilder, context: &str) -> Result<String, SheetError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SheetError::UnexpectedStatus {
                status: status.as_u16(),
                url: context.to_owned(),
            });
        }
        Ok(response.text().await?)
    }

    fn parse_envelope<T: DeserializeOwned>(body: &str, context: &str) -> Result<Option<T>, SheetError> {
        let envelope: SheetEnvelope<T> =
            serde_json::from_str(body).map_err(|e| SheetError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;
        Self::check_envelope(envelope)
    }

    fn check_envelope<T>(envelope: SheetEnvelope<T>) -> Result<Option<T>, SheetError> {
        if envelope.success {
            Ok(envelope.data)
        } else {
            Err(SheetError::Rejected(
                envelope.error.unwrap_or_else(|| "unknown error".to_owned()),
            ))
        }
    }
}

/// The sheet script keys carts by the numeric chat id; keep it numeric on the
/// wire when it is one.
fn user_id_value(user_id: &UserId) -> serde_json::Value {
    user_id
        .as_str()
        .parse::<i64>()
        .map_or_else(|_| serde_json::Value::from(user_id.as_str()), serde_json::Value::from)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
