use thiserror::Error;
use tracing::error;

/// Error types for the compute module
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A year-month token that is not four digits `YYMM` with a month in 1..=12
    #[error("Invalid period token: {0:?}")]
    InvalidPeriodToken(String),

    /// The same month appears twice in a monthly expense list
    #[error("Duplicate expense month: {0}")]
    DuplicateExpenseMonth(String),

    /// A currency code that is not a known ISO 4217 code
    #[error("Unknown currency: {0:?}")]
    UnknownCurrency(String),

    /// Any other rejected input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A figure too large for a decimal
    #[error("Amount out of range: {0}")]
    Overflow(String),

    /// A record that does not exist in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Runtime error for unexpected situations
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl ComputeError {
    /// Returns true when the error was caused by the caller's input rather
    /// than by the store.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ComputeError::InvalidPeriodToken(_)
                | ComputeError::DuplicateExpenseMonth(_)
                | ComputeError::UnknownCurrency(_)
                | ComputeError::Validation(_)
                | ComputeError::Overflow(_)
        )
    }
}

impl<T> From<std::sync::PoisonError<T>> for ComputeError {
    fn from(poisoned: std::sync::PoisonError<T>) -> Self {
        let err = ComputeError::Runtime(format!("Lock poisoned: {}", poisoned));
        error!(?err, "Shared state lock poisoned");
        err
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
