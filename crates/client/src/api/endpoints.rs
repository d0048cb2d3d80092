//! REST endpoint paths, relative to the configured API base URL.

pub const LOGIN: &str = "/user/login";
pub const REGISTER: &str = "/user/register";
pub const LOGOUT: &str = "/user/logout";
pub const FORGOT_PASSWORD: &str = "/user/forgotpassword";
pub const VERIFY_RESET_CODE: &str = "/user/verify-reset-code";
pub const RESET_PASSWORD: &str = "/user/reset-password";

pub const PRODUCT_QUERY: &str = "/product/query";
pub const POPULAR_PRODUCTS: &str = "/product/popular";

pub const CATEGORIES: &str = "/category/get-all";
pub const BANNERS: &str = "/banner/get-all";

/// `GET /user/refresh/:refreshToken`
#[must_use]
pub fn refresh(refresh_token: &str) -> String {
    format!("/user/refresh/{}", segment(refresh_token))
}

/// `GET /user/get-one/:id`
#[must_use]
pub fn user_by_id(id: &str) -> String {
    format!("/user/get-one/{}", segment(id))
}

/// `GET /product/get-one/:id`
#[must_use]
pub fn product_by_id(id: &str) -> String {
    format!("/product/get-one/{}", segment(id))
}

/// Percent-encode a single path segment.
fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
