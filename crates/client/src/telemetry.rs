//! Sentry scope helpers for the storefront stores.
//!
//! All helpers are no-ops when Sentry has not been initialized, so stores
//! can call them unconditionally.

use pocketshop_core::User;

/// Tag later events with the signed-in shopper.
pub fn set_sentry_user(user: &User) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: user.email.clone(),
            username: Some(user.full_name()),
            ..Default::default()
        }));
    });
}

/// Drop the shopper tag after logout or session expiry.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Record a store action as an info breadcrumb, with optional string data.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_user;

    #[test]
    fn test_helpers_are_noops_without_client() {
        set_sentry_user(&sample_user("u1"));
        add_breadcrumb("cart", "Cleared cart", None);
        add_breadcrumb("auth", "Logged in", Some(&[("user_id", "u1")]));
        clear_sentry_user();
    }
}
