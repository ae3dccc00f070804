//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::config::WebConfig;
use crate::services::email::EmailService;
use crate::services::payment::{PaymentClient, PaymentError};
use crate::services::storage::{ObjectStoreClient, StorageError};

/// Error constructing the application state.
#[derive(Debug, Error)]
pub enum StateInitError {
    #[error("payment client: {0}")]
    Payment(#[from] PaymentError),
    #[error("storage client: {0}")]
    Storage(#[from] StorageError),
    #[error("email transport: {0}")]
    Email(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; gives handlers access to the database pool,
/// configuration, and external service clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    pool: PgPool,
    payments: PaymentClient,
    storage: ObjectStoreClient,
    mailer: EmailService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if any external service client fails to construct.
    pub fn new(config: WebConfig, pool: PgPool) -> Result<Self, StateInitError> {
        let payments = PaymentClient::new(&config.payment)?;
        let storage = ObjectStoreClient::new(&config.storage)?;
        let mailer = EmailService::new(&config.email)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
                storage,
                mailer,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment API client.
    #[must_use]
    pub fn payments(&self) -> &PaymentClient {
        &self.inner.payments
    }

    /// Get a reference to the object storage client.
    #[must_use]
    pub fn storage(&self) -> &ObjectStoreClient {
        &self.inner.storage
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn mailer(&self) -> &EmailService {
        &self.inner.mailer
    }
}
