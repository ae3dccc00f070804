//! Demo data seeding command.
//!
//! Creates one account and a handful of products owned by it, enough to
//! click through the catalog, cart, and checkout flows locally.

use rust_decimal::Decimal;
use sqlx::PgPool;

use fernwood_web::db::ProductRepository;
use fernwood_web::services::auth::{AuthError, AuthService};

use super::CliError;

const DEMO_PRODUCTS: &[(&str, i64, &str)] = &[
    (
        "Walnut reading chair",
        18950,
        "A hand-finished walnut chair with a woven seat, comfortable for long evenings.",
    ),
    (
        "Stoneware mug",
        2400,
        "A heavy 350ml stoneware mug, glazed in forest green.",
    ),
    (
        "Linen throw blanket",
        7600,
        "Washed linen, generously sized, in an undyed natural tone.",
    ),
    (
        "Field notebook",
        1200,
        "48 pages of dotted recycled paper with a stitched spine.",
    ),
    (
        "Beeswax candle pair",
        1900,
        "Two slow-burning pure beeswax pillars with a light honey scent.",
    ),
];

/// Seed a demo account and its products.
///
/// Re-running against the same email is fine; the existing account is kept.
///
/// # Errors
///
/// Returns an error when the database is unreachable or an insert fails.
pub async fn run(email: &str, password: &str) -> Result<(), CliError> {
    let database_url = super::database_url()?;
    let pool = PgPool::connect(&database_url).await?;

    let auth = AuthService::new(&pool);
    let user = match auth.register(email, password).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "demo account created");
            user
        }
        Err(AuthError::UserAlreadyExists) => {
            tracing::info!("demo account already exists, logging in instead");
            auth.login(email, password).await?
        }
        Err(e) => return Err(e.into()),
    };

    let products = ProductRepository::new(&pool);
    for (title, price_cents, description) in DEMO_PRODUCTS {
        let product = products
            .create(
                user.id,
                title,
                Decimal::new(*price_cents, 2),
                description,
                "https://storage.example.com/images/placeholder.png",
            )
            .await?;
        tracing::info!(product_id = %product.id, title = %title, "seeded product");
    }

    tracing::info!("Seeding complete");
    Ok(())
}
