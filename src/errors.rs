use crate::price::PriceError;
use axum::http::StatusCode;
use tracing::error;

/// Failures reported by the cart store.
#[derive(thiserror::Error, Debug)]
pub enum CartError {
    /// Durable storage holds something that is not a valid cart.
    #[error("stored cart is malformed: {0}")]
    MalformedStorage(String),
    /// Removal target is outside the current list.
    #[error("no cart line at index {index} (cart has {len} lines)")]
    InvalidIndex { index: usize, len: usize },
    #[error(transparent)]
    UnparsablePrice(#[from] PriceError),
    /// The line already holds the largest representable quantity.
    #[error("{0:?} is already at the maximum quantity")]
    QuantityLimit(String),
    /// Writing the cart back to durable storage failed.
    #[error("failed to persist cart: {0}")]
    Storage(#[from] std::io::Error),
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::UnparsablePrice(_) => Self::bad_request(err.to_string()),
            CartError::InvalidIndex { .. } => Self::not_found(err.to_string()),
            CartError::QuantityLimit(_) => Self::conflict(err.to_string()),
            CartError::MalformedStorage(_) | CartError::Storage(_) => {
                error!("cart operation failed: {err}");
                Self::internal(err)
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
