//! Account identity and session tokens.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, UserId};
use super::price::Price;
use super::role::UserRole;

/// A storefront account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Login identifier.
    pub phone: String,
    #[serde(default)]
    pub role: UserRole,
    /// Set by administrators to suspend the account.
    #[serde(default)]
    pub is_block: bool,
    #[serde(default)]
    pub total_spent: Price,
    #[serde(default)]
    pub total_orders: u32,
    /// Server-side favorites. Not reconciled with the client wishlist.
    #[serde(default)]
    pub wishlist: Vec<ProductId>,
}

impl User {
    /// First and last name joined by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, _) => self.last_name.clone(),
        }
    }
}

/// Access and refresh tokens for the current session.
///
/// Implements `Debug` manually to redact both tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    /// Bearer token attached to API requests.
    pub access_token: String,
    /// Token exchanged for a new access token after a 401.
    pub refresh_token: String,
}

impl AuthTokens {
    /// Create a token pair.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// A new pair with a fresh access token and the same refresh token.
    #[must_use]
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: self.refresh_token.clone(),
        }
    }

    /// Whether a refresh token is available.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}
