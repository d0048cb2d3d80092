//! Request and response bodies for the REST API.

use pocketshop_core::{Product, User};
use serde::{Deserialize, Serialize};

/// `POST /user/login` body.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub phone: &'a str,
    pub password: &'a str,
}

/// `POST /user/login` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    /// Access token.
    pub token: String,
    pub refresh_token: String,
}

/// `POST /user/register` body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    pub phone: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    pub password: &'a str,
}

/// `POST /user/forgotpassword` body.
#[derive(Serialize)]
pub struct ForgotPasswordRequest<'a> {
    pub phone: &'a str,
}

/// `POST /user/verify-reset-code` body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResetCodeRequest<'a> {
    pub reset_token: &'a str,
}

/// `POST /user/reset-password` body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest<'a> {
    pub password: &'a str,
    pub reset_token: &'a str,
}

/// `GET /user/refresh/:refreshToken` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Paged listing response from `GET /product/query`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductListResponse {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub stats: ListStats,
}

/// Counts returned alongside a listing page.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListStats {
    /// Total matching products across all pages.
    pub total: u64,
    /// Pages for the current limit.
    pub pages: u32,
    pub total_pages: u32,
}

impl ListStats {
    /// Page count, whichever of the two fields the server filled.
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.total_pages.max(self.pages)
    }
}

/// Error body returned by the API.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorPayload {
    /// `message`, then `error`, ignoring blank values.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.message
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.error.filter(|m| !m.trim().is_empty()))
    }
}
