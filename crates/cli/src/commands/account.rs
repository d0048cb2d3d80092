//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! pocketshop login -p +15550100 --password hunter22
//! pocketshop whoami
//! pocketshop reset -p +15550100 --password new-secret
//! pocketshop logout
//! ```
//!
//! # Environment Variables
//!
//! - `POCKETSHOP_PASSWORD` - Password for `login` and `register`
//! - `POCKETSHOP_NEW_PASSWORD` - New password for `reset`

use pocketshop_client::Storefront;
use pocketshop_client::stores::RegisterInput;
use secrecy::SecretString;

use crate::error::CliError;
use crate::output::{self, Format};

/// Sign in and print the account.
pub async fn login(
    storefront: &Storefront,
    phone: &str,
    password: &SecretString,
    format: Format,
) -> Result<(), CliError> {
    storefront.auth().login(phone, password).await?;

    let state = storefront.auth().snapshot();
    let user = state.user.ok_or(CliError::NotSignedIn)?;
    match format {
        Format::Json => output::json(&user)?,
        Format::Table => {
            output::message(&format!("Signed in as {}", user.full_name()));
        }
    }
    Ok(())
}

/// Create an account. The user signs in separately afterwards.
pub async fn register(storefront: &Storefront, input: RegisterInput) -> Result<(), CliError> {
    storefront.auth().register(input).await?;
    output::message("Account created. Run `pocketshop login` to sign in.");
    Ok(())
}

/// Sign out. Always succeeds locally.
pub async fn logout(storefront: &Storefront) {
    let was_signed_in = storefront.auth().is_authenticated();
    storefront.auth().logout().await;
    if was_signed_in {
        output::message("Signed out.");
    } else {
        output::message("Not signed in.");
    }
}

/// Reload the account from the API and print it.
pub async fn whoami(storefront: &Storefront, format: Format) -> Result<(), CliError> {
    if !storefront.auth().is_authenticated() {
        return Err(CliError::NotSignedIn);
    }
    storefront.auth().refresh_user().await?;

    let user = storefront.auth().snapshot().user.ok_or(CliError::NotSignedIn)?;
    match format {
        Format::Json => output::json(&user)?,
        Format::Table => output::user(&user),
    }
    Ok(())
}

/// Run the three-step reset flow, reading the SMS code from stdin.
pub async fn reset_password(
    storefront: &Storefront,
    phone: &str,
    password: &SecretString,
) -> Result<(), CliError> {
    let auth = storefront.auth();

    auth.request_verification_code(phone).await?;
    output::message("A verification code was sent by SMS.");

    let code = output::prompt("Code")?;
    auth.verify_code(&code).await?;

    auth.reset_password(password).await?;
    output::message("Password updated. Run `pocketshop login` to sign in.");
    Ok(())
}
