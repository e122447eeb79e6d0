use crate::domain::catalog::{StockCounter, StockError};
use crate::domain::customer::CustomerError;
use crate::domain::order::OrderError;
use crate::domain::pricing::PricingError;

// ============================================================================
// Application Errors
// ============================================================================
//
// One error type crosses the store / command handler / HTTP boundary.
// Domain errors convert into it; the HTTP layer maps each variant to a
// status code (see api::error).
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid pizza configuration: {0}")]
    InvalidConfiguration(#[from] PricingError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Insufficient stock for {counter}: requested {requested}, available {available}")]
    InsufficientStock {
        counter: StockCounter,
        requested: i32,
        available: i32,
    },

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        AppError::NotFound(what.into())
    }

    /// Attach the counter a stock rule failed on.
    pub fn from_stock(counter: StockCounter, error: StockError) -> Self {
        match error {
            StockError::Insufficient { requested, available } => AppError::InsufficientStock {
                counter,
                requested,
                available,
            },
            StockError::InvalidQuantity(quantity) => {
                AppError::Validation(format!("Invalid stock quantity: {}", quantity))
            }
            overflow @ StockError::QuantityOverflow { .. } => AppError::Validation(overflow.to_string()),
        }
    }
}

impl From<CustomerError> for AppError {
    fn from(error: CustomerError) -> Self {
        AppError::Validation(error.to_string())
    }
}
