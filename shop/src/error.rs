//! Shop error types.
//!
//! Every public operation in this crate returns `Result<_, ShopError>`.
//! Nothing is thrown past a store boundary: storage, remote, and validation
//! failures all come back as tagged values, and the presentation layer picks
//! the wording through [`ShopError::user_message`].

use std::fmt;

use storefront_storage::StorageError;

use crate::validation::ValidationErrors;

/// Remote catalog operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    /// `GET <catalog_url>`
    FetchItems,
    /// `GET <random_image_url>`
    FetchRandomImage,
    /// `POST <submit_url>`
    Submit,
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchItems => write!(f, "fetch items"),
            Self::FetchRandomImage => write!(f, "fetch random image"),
            Self::Submit => write!(f, "submit record"),
        }
    }
}

/// Top-level error type for the shop crate.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// Reading from or writing to the key-value store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A persisted blob could not be parsed.
    #[error("malformed blob under key {key:?}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A collection could not be serialized for persistence.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// A remote catalog call failed (transport, status, or payload).
    #[error("remote call failed ({op}): {message}")]
    Remote { op: RemoteOp, message: String },

    /// Form fields failed validation.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// No inventory item has this id.
    #[error("unknown item {0:?}")]
    UnknownItem(String),

    /// Checkout was requested with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Configuration text could not be parsed.
    #[error("config error: {0}")]
    Config(String),
}

impl ShopError {
    /// Create a remote failure for `op`.
    pub fn remote(op: RemoteOp, message: impl Into<String>) -> Self {
        Self::Remote {
            op,
            message: message.into(),
        }
    }

    /// Text suitable for a toast or alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) | Self::Decode { .. } | Self::Encode(_) => {
                "Failed to save your changes. Please try again.".to_string()
            }
            Self::Remote { op, .. } => match op {
                RemoteOp::FetchItems => "Failed to load the menu. Please try again.",
                RemoteOp::FetchRandomImage => {
                    "Failed to fetch random dog image. Please try again."
                }
                RemoteOp::Submit => "Failed to submit pet details. Please try again.",
            }
            .to_string(),
            Self::Validation(_) => "Please fix the errors in the form".to_string(),
            Self::UnknownItem(_) => "That item is no longer available.".to_string(),
            Self::EmptyCart => "Your cart is empty.".to_string(),
            Self::Config(msg) => format!("Invalid configuration: {msg}"),
        }
    }

    /// Returns true for failures of the backing store (read, write, decode).
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Decode { .. } | Self::Encode(_))
    }
}

/// Convenience result type for the shop crate.
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_user_messages_per_op() {
        let err = ShopError::remote(RemoteOp::Submit, "500");
        assert_eq!(
            err.user_message(),
            "Failed to submit pet details. Please try again."
        );
        let err = ShopError::remote(RemoteOp::FetchRandomImage, "timeout");
        assert!(err.user_message().contains("random dog image"));
    }

    #[test]
    fn test_display_carries_detail() {
        let err = ShopError::remote(RemoteOp::FetchItems, "connection refused");
        let s = format!("{}", err);
        assert!(s.contains("fetch items"));
        assert!(s.contains("connection refused"));
    }

    #[test]
    fn test_from_storage_error() {
        let err: ShopError = StorageError::backend("rejected").into();
        assert!(err.is_storage());
        assert!(!ShopError::EmptyCart.is_storage());
    }
}
