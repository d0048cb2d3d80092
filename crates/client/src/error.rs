//! Store-level error type.
//!
//! Store operations return `Result<T, StoreError>`. The same failure is also
//! recorded as a display string in the store's `error` slot, produced by
//! [`StoreError::user_message`].

use pocketshop_core::PhoneError;
use thiserror::Error;

use crate::api::ApiError;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The phone number could not be parsed.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    /// Input rejected before any request was made.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A password reset was attempted without a verified code.
    #[error("Reset code has not been verified")]
    ResetNotVerified,

    /// The operation needs a signed-in user.
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl StoreError {
    /// Message suitable for showing to the user.
    ///
    /// API-reported messages are passed through. Transport and decoding
    /// failures collapse to `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api(err) => err.user_message(fallback),
            Self::InvalidPhone(_) => "Please enter a valid phone number.".to_string(),
            Self::InvalidInput(msg) => msg.clone(),
            Self::ResetNotVerified => "Please verify the reset code first.".to_string(),
            Self::NotAuthenticated => "Please sign in to continue.".to_string(),
        }
    }

    /// Whether the failure means the session is no longer valid.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Api(err) => err.is_unauthorized(),
            _ => false,
        }
    }
}
