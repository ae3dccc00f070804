//! Catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use fernwood_core::ProductId;

use crate::db::{PageInfo, ProductRepository};
use crate::error::Result;
use crate::filters;
use crate::middleware::{CsrfToken, OptionalAuth};
use crate::models::Product;
use crate::state::AppState;

use super::format_price;

/// Products shown per catalog page.
const ITEMS_PER_PAGE: i64 = 2;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub description: String,
    pub image_url: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: format_price(product.price),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Pagination display data for templates.
#[derive(Clone, Copy)]
pub struct PaginationView {
    pub current_page: i64,
    pub last_page: i64,
    pub has_next: bool,
    pub has_prev: bool,
    pub next_page: i64,
    pub prev_page: i64,
}

impl From<PageInfo> for PaginationView {
    fn from(info: PageInfo) -> Self {
        Self {
            current_page: info.current_page,
            last_page: info.last_page,
            has_next: info.has_next,
            has_prev: info.has_prev,
            next_page: info.next_page,
            prev_page: info.prev_page,
        }
    }
}

/// Pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/index.html")]
pub struct ShopIndexTemplate {
    pub products: Vec<ProductView>,
    pub pagination: PaginationView,
    pub logged_in: bool,
    pub csrf: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "shop/detail.html")]
pub struct ProductDetailTemplate {
    pub product: ProductView,
    pub logged_in: bool,
    pub csrf: String,
}

/// Display the paginated catalog.
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    CsrfToken(csrf): CsrfToken,
    Query(query): Query<PaginationQuery>,
) -> Result<ShopIndexTemplate> {
    let page = query.page.unwrap_or(1).max(1);

    let product_page = ProductRepository::new(state.pool())
        .page(page, ITEMS_PER_PAGE)
        .await?;

    Ok(ShopIndexTemplate {
        products: product_page.items.iter().map(ProductView::from).collect(),
        pagination: product_page.info.into(),
        logged_in: user.is_some(),
        csrf,
    })
}

/// Display a product detail page.
///
/// An unknown product redirects to the catalog instead of erroring.
pub async fn product_detail(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    CsrfToken(csrf): CsrfToken,
    Path(id): Path<i32>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
    else {
        return Ok(Redirect::to("/").into_response());
    };

    Ok(ProductDetailTemplate {
        product: ProductView::from(&product),
        logged_in: user.is_some(),
        csrf,
    }
    .into_response())
}
