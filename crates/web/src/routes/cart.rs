//! Cart route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use fernwood_core::ProductId;

use crate::db::{CartRepository, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::{CsrfToken, RequireAuth, require_valid_token};
use crate::models::{CartLine, cart_total};
use crate::state::AppState;

use super::format_price;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub title: String,
    pub image_url: String,
    pub quantity: i32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id,
            title: line.product.title.clone(),
            image_url: line.product.image_url.clone(),
            quantity: line.quantity,
            price: format_price(line.product.price),
            line_total: format_price(line.line_total()),
        }
    }
}

/// Query parameters for cart status display.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub error: Option<String>,
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    pub csrf_token: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
    pub csrf_token: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/index.html")]
pub struct CartTemplate {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub error: Option<String>,
    pub logged_in: bool,
    pub csrf: String,
}

/// Display the cart page.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    CsrfToken(csrf): CsrfToken,
    Query(query): Query<CartQuery>,
) -> Result<CartTemplate> {
    let lines = CartRepository::new(state.pool()).lines(user.id).await?;

    let error = query.error.as_deref().map(|code| match code {
        "payment_incomplete" => "Your payment hasn't completed, so no order was placed.".to_string(),
        other => other.to_string(),
    });

    Ok(CartTemplate {
        total: format_price(cart_total(&lines)),
        lines: lines.iter().map(CartLineView::from).collect(),
        error,
        logged_in: true,
        csrf,
    })
}

/// Add a product to the cart.
///
/// Re-adding a product accumulates its quantity instead of duplicating the
/// line. An unknown product redirects to the catalog.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    require_valid_token(&session, &form.csrf_token).await?;

    let product_id = ProductId::new(form.product_id);
    if ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .is_none()
    {
        return Ok(Redirect::to("/").into_response());
    }

    CartRepository::new(state.pool())
        .add(user.id, product_id, 1)
        .await?;

    Ok(Redirect::to("/cart").into_response())
}

/// Remove a product from the cart. No-op when it isn't there.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    require_valid_token(&session, &form.csrf_token).await?;

    CartRepository::new(state.pool())
        .remove(user.id, ProductId::new(form.product_id))
        .await?;

    Ok(Redirect::to("/cart").into_response())
}
