use thiserror::Error;

use crate::product::ProductId;

/// Caller-input failures. None of these are transient, so nothing retries them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShelfError {
    #[error("Invalid product type: {0}")]
    UnknownProductType(String),
    #[error("Product not found: {0}")]
    NotFound(ProductId),
    #[error("{0}")]
    Validation(String),
}
