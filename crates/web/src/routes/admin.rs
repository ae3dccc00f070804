//! Product administration route handlers.
//!
//! Products belong to the user who created them; every mutation is guarded
//! by an ownership check and non-owners are redirected away untouched.
//! Create and update take multipart forms because of the image upload.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use rust_decimal::Decimal;
use tower_sessions::Session;

use fernwood_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CsrfToken, RequireAuth, require_valid_token};
use crate::models::Product;
use crate::services::storage;
use crate::state::AppState;

use super::format_price;

/// Image MIME types accepted for product uploads.
const ALLOWED_IMAGE_TYPES: &[&str] = &["image/png", "image/jpg", "image/jpeg"];

const TITLE_MIN: usize = 3;
const DESCRIPTION_MIN: usize = 5;
const DESCRIPTION_MAX: usize = 400;

// =============================================================================
// Form Parsing & Validation
// =============================================================================

/// An uploaded image from the multipart form.
pub struct UploadedImage {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Parsed product multipart form, before validation.
#[derive(Default)]
pub struct ProductForm {
    pub title: String,
    pub price: String,
    pub description: String,
    pub csrf_token: String,
    pub image: Option<UploadedImage>,
}

/// Read the product form out of a multipart request.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                form.title = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "price" => {
                form.price = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "description" => {
                form.description = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "csrf_token" => {
                form.csrf_token = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;

                // Browsers send an empty part when no file was chosen.
                if !filename.is_empty() && !bytes.is_empty() {
                    form.image = Some(UploadedImage {
                        filename,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Validated product fields.
struct ValidProduct {
    title: String,
    price: Decimal,
    description: String,
}

/// Validate the text fields, returning a user-facing message on failure.
fn validate_fields(form: &ProductForm) -> std::result::Result<ValidProduct, String> {
    let title = form.title.trim();
    if title.len() < TITLE_MIN {
        return Err(format!("Title must be at least {TITLE_MIN} characters."));
    }

    let Ok(price) = form.price.trim().parse::<Decimal>() else {
        return Err("Price must be a number.".to_string());
    };
    if price <= Decimal::ZERO {
        return Err("Price must be greater than zero.".to_string());
    }

    let description = form.description.trim();
    if description.len() < DESCRIPTION_MIN || description.len() > DESCRIPTION_MAX {
        return Err(format!(
            "Description must be between {DESCRIPTION_MIN} and {DESCRIPTION_MAX} characters."
        ));
    }

    Ok(ValidProduct {
        title: title.to_string(),
        price,
        description: description.to_string(),
    })
}

/// Check an uploaded image's declared type.
fn validate_image(image: &UploadedImage) -> std::result::Result<(), String> {
    if ALLOWED_IMAGE_TYPES.contains(&image.content_type.as_str()) {
        Ok(())
    } else {
        Err("Attached file is not an image.".to_string())
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Admin product display data.
#[derive(Clone)]
pub struct AdminProductView {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub image_url: String,
}

impl From<&Product> for AdminProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            price: format_price(product.price),
            image_url: product.image_url.clone(),
        }
    }
}

/// Admin product list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct AdminProductsTemplate {
    pub products: Vec<AdminProductView>,
    pub logged_in: bool,
    pub csrf: String,
}

/// Product create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/edit_product.html")]
pub struct EditProductTemplate {
    pub editing: bool,
    pub product_id: Option<ProductId>,
    pub title: String,
    pub price: String,
    pub description: String,
    pub error: Option<String>,
    pub logged_in: bool,
    pub csrf: String,
}

impl EditProductTemplate {
    fn blank(csrf: String) -> Self {
        Self {
            editing: false,
            product_id: None,
            title: String::new(),
            price: String::new(),
            description: String::new(),
            error: None,
            logged_in: true,
            csrf,
        }
    }

    fn rerender(form: &ProductForm, product_id: Option<ProductId>, error: String, csrf: String) -> Response {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Self {
                editing: product_id.is_some(),
                product_id,
                title: form.title.clone(),
                price: form.price.clone(),
                description: form.description.clone(),
                error: Some(error),
                logged_in: true,
                csrf,
            },
        )
            .into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// List the signed-in user's products.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    CsrfToken(csrf): CsrfToken,
) -> Result<AdminProductsTemplate> {
    let products = ProductRepository::new(state.pool())
        .list_by_owner(user.id)
        .await?;

    Ok(AdminProductsTemplate {
        products: products.iter().map(AdminProductView::from).collect(),
        logged_in: true,
        csrf,
    })
}

/// Display the create-product form.
pub async fn new_product(
    RequireAuth(_user): RequireAuth,
    CsrfToken(csrf): CsrfToken,
) -> impl IntoResponse {
    EditProductTemplate::blank(csrf)
}

/// Create a product from the multipart form.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    CsrfToken(csrf): CsrfToken,
    multipart: Multipart,
) -> Result<Response> {
    let form = read_product_form(multipart).await?;
    require_valid_token(&session, &form.csrf_token).await?;

    let fields = match validate_fields(&form) {
        Ok(fields) => fields,
        Err(msg) => return Ok(EditProductTemplate::rerender(&form, None, msg, csrf)),
    };

    let Some(image) = form.image.as_ref() else {
        return Ok(EditProductTemplate::rerender(
            &form,
            None,
            "Attached file is not an image.".to_string(),
            csrf,
        ));
    };
    if let Err(msg) = validate_image(image) {
        return Ok(EditProductTemplate::rerender(&form, None, msg, csrf));
    }

    let key = storage::object_key(&image.filename, Utc::now().timestamp_millis());
    let image_url = state
        .storage()
        .upload(&key, &image.content_type, image.bytes.clone())
        .await?;

    let product = ProductRepository::new(state.pool())
        .create(
            user.id,
            &fields.title,
            fields.price,
            &fields.description,
            &image_url,
        )
        .await?;

    tracing::info!(product_id = %product.id, user_id = %user.id, "product created");

    Ok(Redirect::to("/admin/products").into_response())
}

/// Display the edit form for an owned product.
///
/// A missing product or someone else's product redirects to the list.
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    CsrfToken(csrf): CsrfToken,
    Path(id): Path<i32>,
) -> Result<Response> {
    let Some(product) = ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
    else {
        return Ok(Redirect::to("/admin/products").into_response());
    };

    if product.user_id != user.id {
        return Ok(Redirect::to("/admin/products").into_response());
    }

    Ok(EditProductTemplate {
        editing: true,
        product_id: Some(product.id),
        title: product.title,
        price: product.price.to_string(),
        description: product.description,
        error: None,
        logged_in: true,
        csrf,
    }
    .into_response())
}

/// Update an owned product; a replacement image swaps the stored object.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    CsrfToken(csrf): CsrfToken,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Response> {
    let form = read_product_form(multipart).await?;
    require_valid_token(&session, &form.csrf_token).await?;

    let product_id = ProductId::new(id);
    let repo = ProductRepository::new(state.pool());

    // Ownership check up front so a non-owner never touches storage.
    let Some(existing) = repo.get(product_id).await? else {
        return Ok(Redirect::to("/admin/products").into_response());
    };
    if existing.user_id != user.id {
        return Ok(Redirect::to("/admin/products").into_response());
    }

    let fields = match validate_fields(&form) {
        Ok(fields) => fields,
        Err(msg) => {
            return Ok(EditProductTemplate::rerender(
                &form,
                Some(product_id),
                msg,
                csrf,
            ));
        }
    };

    let mut new_image_url = None;
    if let Some(image) = form.image.as_ref() {
        if let Err(msg) = validate_image(image) {
            return Ok(EditProductTemplate::rerender(
                &form,
                Some(product_id),
                msg,
                csrf,
            ));
        }

        let key = storage::object_key(&image.filename, Utc::now().timestamp_millis());
        new_image_url = Some(
            state
                .storage()
                .upload(&key, &image.content_type, image.bytes.clone())
                .await?,
        );
    }

    let updated = repo
        .update_owned(
            product_id,
            user.id,
            &fields.title,
            fields.price,
            &fields.description,
            new_image_url.as_deref(),
        )
        .await?;

    // The old image is orphaned once the row points at the new one.
    if updated && new_image_url.is_some() {
        if let Err(e) = state.storage().delete_by_url(&existing.image_url).await {
            tracing::warn!(product_id = %product_id, "failed to delete replaced image: {e}");
        }
    }

    Ok(Redirect::to("/admin/products").into_response())
}

/// Delete an owned product and its stored image.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    session: Session,
    Path(id): Path<i32>,
    axum::Form(form): axum::Form<DeleteForm>,
) -> Result<Response> {
    require_valid_token(&session, &form.csrf_token).await?;

    let product_id = ProductId::new(id);
    let repo = ProductRepository::new(state.pool());

    let Some(product) = repo.get(product_id).await? else {
        return Ok(Redirect::to("/admin/products").into_response());
    };
    if product.user_id != user.id {
        return Ok(Redirect::to("/admin/products").into_response());
    }

    let deleted = repo.delete_owned(product_id, user.id).await?;

    // Best effort: a stranded object is logged, never fatal.
    if deleted {
        if let Err(e) = state.storage().delete_by_url(&product.image_url).await {
            tracing::warn!(product_id = %product_id, "failed to delete product image: {e}");
        }
        tracing::info!(product_id = %product_id, user_id = %user.id, "product deleted");
    }

    Ok(Redirect::to("/admin/products").into_response())
}

/// Delete form data.
#[derive(Debug, serde::Deserialize)]
pub struct DeleteForm {
    pub csrf_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, price: &str, description: &str) -> ProductForm {
        ProductForm {
            title: title.to_string(),
            price: price.to_string(),
            description: description.to_string(),
            csrf_token: String::new(),
            image: None,
        }
    }

    #[test]
    fn accepts_valid_fields() {
        let valid = validate_fields(&form("Walnut chair", "129.50", "A sturdy chair."))
            .expect("valid form");
        assert_eq!(valid.title, "Walnut chair");
        assert_eq!(valid.price, Decimal::new(12950, 2));
    }

    #[test]
    fn rejects_short_title() {
        assert!(validate_fields(&form("ab", "10", "A sturdy chair.")).is_err());
    }

    #[test]
    fn rejects_bad_prices() {
        assert!(validate_fields(&form("Chair", "free", "A sturdy chair.")).is_err());
        assert!(validate_fields(&form("Chair", "0", "A sturdy chair.")).is_err());
        assert!(validate_fields(&form("Chair", "-5", "A sturdy chair.")).is_err());
    }

    #[test]
    fn rejects_out_of_range_description() {
        assert!(validate_fields(&form("Chair", "10", "abcd")).is_err());
        assert!(validate_fields(&form("Chair", "10", &"x".repeat(401))).is_err());
    }

    #[test]
    fn image_type_gate() {
        let png = UploadedImage {
            filename: "a.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1],
        };
        let gif = UploadedImage {
            filename: "a.gif".to_string(),
            content_type: "image/gif".to_string(),
            bytes: vec![1],
        };
        assert!(validate_image(&png).is_ok());
        assert!(validate_image(&gif).is_err());
    }
}
