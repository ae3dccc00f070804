//! Payment provider client for hosted checkout sessions.
//!
//! Payment collection is delegated entirely to the provider: we create a
//! checkout session with the cart's line items and redirect URLs, send the
//! shopper to the provider's hosted page, and on return retrieve the session
//! to confirm it was actually paid before placing the order.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use fernwood_core::CurrencyCode;

use crate::config::PaymentConfig;

/// Errors that can occur when interacting with the payment API.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response or build the request.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// One line item of a checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutLineItem {
    /// Product name shown on the payment page.
    pub name: String,
    /// Product description shown on the payment page.
    pub description: String,
    /// Unit amount in minor units (cents).
    pub unit_amount: i64,
    /// Units purchased.
    pub quantity: i64,
}

/// A checkout session as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Provider-assigned session id.
    pub id: String,
    /// URL of the hosted payment page, present while the session is open.
    pub url: Option<String>,
    /// Payment state: `"paid"`, `"unpaid"`, or `"no_payment_required"`.
    pub payment_status: Option<String>,
}

impl CheckoutSession {
    /// Whether the session has actually been paid.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

/// Payment API client.
#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    api_base: String,
    currency: CurrencyCode,
}

impl PaymentClient {
    /// Create a new payment API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PaymentConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            currency: config.currency,
        })
    }

    /// Create a hosted checkout session in payment mode.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response can't be read.
    pub async fn create_checkout_session(
        &self,
        items: &[CheckoutLineItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.api_base);
        let params = session_params(items, success_url, cancel_url, self.currency);

        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }

    /// Retrieve a checkout session to inspect its payment status.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response can't be read.
    pub async fn get_checkout_session(&self, id: &str) -> Result<CheckoutSession, PaymentError> {
        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.api_base,
            urlencoding::encode(id)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(e.to_string()))
    }
}

/// Build the form-encoded parameter list for session creation.
///
/// The provider expects indexed bracket syntax for nested fields, e.g.
/// `line_items[0][price_data][unit_amount]`.
fn session_params(
    items: &[CheckoutLineItem],
    success_url: &str,
    cancel_url: &str,
    currency: CurrencyCode,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), success_url.to_string()),
        ("cancel_url".to_string(), cancel_url.to_string()),
    ];

    for (i, item) in items.iter().enumerate() {
        params.push((
            format!("line_items[{i}][quantity]"),
            item.quantity.to_string(),
        ));
        params.push((
            format!("line_items[{i}][price_data][currency]"),
            currency.code().to_string(),
        ));
        params.push((
            format!("line_items[{i}][price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][name]"),
            item.name.clone(),
        ));
        params.push((
            format!("line_items[{i}][price_data][product_data][description]"),
            item.description.clone(),
        ));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, unit_amount: i64, quantity: i64) -> CheckoutLineItem {
        CheckoutLineItem {
            name: name.to_string(),
            description: format!("{name} description"),
            unit_amount,
            quantity,
        }
    }

    #[test]
    fn params_carry_mode_and_urls() {
        let params = session_params(&[], "https://shop/ok", "https://shop/no", CurrencyCode::USD);
        assert!(params.contains(&("mode".to_string(), "payment".to_string())));
        assert!(params.contains(&("success_url".to_string(), "https://shop/ok".to_string())));
        assert!(params.contains(&("cancel_url".to_string(), "https://shop/no".to_string())));
    }

    #[test]
    fn params_index_each_line_item() {
        let params = session_params(
            &[item("Book", 1999, 2), item("Mug", 500, 1)],
            "s",
            "c",
            CurrencyCode::USD,
        );

        assert!(params.contains(&("line_items[0][quantity]".to_string(), "2".to_string())));
        assert!(params.contains(&(
            "line_items[0][price_data][unit_amount]".to_string(),
            "1999".to_string()
        )));
        assert!(params.contains(&(
            "line_items[0][price_data][product_data][name]".to_string(),
            "Book".to_string()
        )));
        assert!(params.contains(&("line_items[1][quantity]".to_string(), "1".to_string())));
        assert!(params.contains(&(
            "line_items[1][price_data][currency]".to_string(),
            "usd".to_string()
        )));
    }

    #[test]
    fn paid_detection() {
        let paid = CheckoutSession {
            id: "cs_1".to_string(),
            url: None,
            payment_status: Some("paid".to_string()),
        };
        let unpaid = CheckoutSession {
            id: "cs_2".to_string(),
            url: Some("https://pay.example/cs_2".to_string()),
            payment_status: Some("unpaid".to_string()),
        };
        let unknown = CheckoutSession {
            id: "cs_3".to_string(),
            url: None,
            payment_status: None,
        };

        assert!(paid.is_paid());
        assert!(!unpaid.is_paid());
        assert!(!unknown.is_paid());
    }
}
