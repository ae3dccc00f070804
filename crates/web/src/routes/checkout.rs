//! Checkout route handlers.
//!
//! Payment collection is delegated to the provider's hosted checkout page.
//! An order is only created on the success callback *after* retrieving the
//! checkout session and confirming it was paid; the redirect alone proves
//! nothing. Order creation snapshots the cart and clears it in a single
//! database transaction, and the remembered session id is dropped
//! afterwards so a refresh of the success page cannot place a second order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use fernwood_core::Price;

use crate::db::{CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CsrfToken, RequireAuth};
use crate::models::{CartLine, session_keys};
use crate::services::payment::CheckoutLineItem;
use crate::state::AppState;

use super::cart::CartLineView;
use super::format_price;

/// Checkout summary page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/index.html")]
pub struct CheckoutTemplate {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub pay_url: String,
    pub logged_in: bool,
    pub csrf: String,
}

fn to_line_item(line: &CartLine, state: &AppState) -> Result<CheckoutLineItem> {
    let price = Price::new(line.product.price, state.config().payment.currency)
        .map_err(|e| AppError::Internal(format!("stored price rejected: {e}")))?;

    Ok(CheckoutLineItem {
        name: line.product.title.clone(),
        description: line.product.description.clone(),
        unit_amount: price
            .minor_units()
            .map_err(|e| AppError::Internal(format!("stored price rejected: {e}")))?,
        quantity: i64::from(line.quantity),
    })
}

/// Create a payment session for the cart and show the checkout summary.
///
/// An empty cart has nothing to pay for and redirects back to the cart.
pub async fn start(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    CsrfToken(csrf): CsrfToken,
    session: Session,
) -> Result<Response> {
    let lines = CartRepository::new(state.pool()).lines(user.id).await?;
    if lines.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let items = lines
        .iter()
        .map(|line| to_line_item(line, &state))
        .collect::<Result<Vec<_>>>()?;

    let base_url = state.config().base_url.trim_end_matches('/');
    let checkout = state
        .payments()
        .create_checkout_session(
            &items,
            &format!("{base_url}/checkout/success"),
            &format!("{base_url}/checkout/cancel"),
        )
        .await?;

    let Some(pay_url) = checkout.url.clone() else {
        return Err(AppError::Internal(
            "payment provider returned no checkout URL".to_string(),
        ));
    };

    session
        .insert(session_keys::CHECKOUT_SESSION, &checkout.id)
        .await?;

    Ok(CheckoutTemplate {
        total: format_price(crate::models::cart_total(&lines)),
        lines: lines.iter().map(CartLineView::from).collect(),
        pay_url,
        logged_in: true,
        csrf,
    }
    .into_response())
}

/// Success callback: verify payment, then snapshot the cart into an order.
pub async fn success(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
) -> Result<Response> {
    let Some(checkout_id) = session
        .get::<String>(session_keys::CHECKOUT_SESSION)
        .await?
    else {
        // Nothing in flight; a refresh after a completed order lands here.
        return Ok(Redirect::to("/orders").into_response());
    };

    let checkout = state.payments().get_checkout_session(&checkout_id).await?;
    if !checkout.is_paid() {
        tracing::warn!(checkout_id = %checkout_id, "checkout success hit with unpaid session");
        return Ok(Redirect::to("/cart?error=payment_incomplete").into_response());
    }

    let lines = CartRepository::new(state.pool()).lines(user.id).await?;
    if lines.is_empty() {
        session
            .remove::<String>(session_keys::CHECKOUT_SESSION)
            .await?;
        return Ok(Redirect::to("/orders").into_response());
    }

    let order = OrderRepository::new(state.pool())
        .create_from_lines(user.id, &user.email, &lines)
        .await?;

    session
        .remove::<String>(session_keys::CHECKOUT_SESSION)
        .await?;

    tracing::info!(order_id = %order.id, user_id = %user.id, "order placed");

    Ok(Redirect::to("/orders").into_response())
}

/// Cancel callback: back to the cart, nothing changed.
pub async fn cancel(RequireAuth(_user): RequireAuth) -> Response {
    Redirect::to("/cart").into_response()
}
