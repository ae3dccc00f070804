//! Order history and invoice route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use fernwood_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CsrfToken, RequireAuth};
use crate::models::{OrderItem, OrderWithItems};
use crate::services::invoice::{invoice_filename, render_invoice};
use crate::state::AppState;

use super::format_price;

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: OrderId,
    pub placed_at: String,
    pub items: Vec<OrderItemView>,
    pub total: String,
}

/// Order item display data for templates.
#[derive(Clone)]
pub struct OrderItemView {
    pub title: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            title: item.title.clone(),
            quantity: item.quantity,
            unit_price: format_price(item.unit_price),
            line_total: format_price(item.line_total()),
        }
    }
}

impl From<&OrderWithItems> for OrderView {
    fn from(order: &OrderWithItems) -> Self {
        Self {
            id: order.order.id,
            placed_at: order.order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            items: order.items.iter().map(OrderItemView::from).collect(),
            total: format_price(order.total()),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderView>,
    pub logged_in: bool,
    pub csrf: String,
}

/// Display the user's order history, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    CsrfToken(csrf): CsrfToken,
) -> Result<OrdersTemplate> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(OrdersTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
        logged_in: true,
        csrf,
    })
}

/// Stream an order's invoice PDF, persisting a copy for later retrieval.
///
/// Only the order's owner may fetch it; an unknown order redirects back to
/// the order history.
pub async fn invoice(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Response> {
    let Some(order) = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
    else {
        return Ok(Redirect::to("/orders").into_response());
    };

    if order.order.user_id != user.id {
        return Err(AppError::Unauthorized(format!(
            "order {id} belongs to another user"
        )));
    }

    let bytes = render_invoice(&order)?;
    let filename = invoice_filename(order.order.id);

    // Keep a copy on disk alongside streaming it out.
    let dir = state.config().invoice_dir.clone();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::Internal(format!("invoice dir: {e}")))?;
    tokio::fs::write(dir.join(&filename), &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("invoice write: {e}")))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{filename}\""),
        ),
    ];

    Ok((headers, bytes).into_response())
}
