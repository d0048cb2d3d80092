//! Authentication: login, registration, logout, password reset and
//! session restore.
//!
//! State lives in the shared [`AuthSession`]; this store drives its
//! transitions. Failures are recorded as display strings in the state and
//! also returned to the caller.

use std::sync::Arc;

use pocketshop_core::{AuthTokens, Phone, User};
use secrecy::{ExposeSecret, SecretString};
use serde::de::IgnoredAny;
use tokio::sync::watch;
use tracing::instrument;

use crate::api::types::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest,
    VerifyResetCodeRequest,
};
use crate::api::{ApiClient, endpoints};
use crate::error::StoreError;
use crate::session::{AuthSession, AuthState, PasswordReset, StepState};
use crate::storage::StorageError;
use crate::telemetry::{add_breadcrumb, clear_sentry_user, set_sentry_user};

const LOGIN_FALLBACK: &str = "Login failed. Please try again.";
const REGISTER_FALLBACK: &str = "Registration failed. Please try again.";
const CODE_REQUEST_FALLBACK: &str = "Could not send the verification code. Please try again.";
const VERIFY_FALLBACK: &str = "Invalid or expired code. Please try again.";
const RESET_FALLBACK: &str = "Could not reset the password. Please try again.";

/// Minimum password length accepted before contacting the API.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Account registration form.
#[derive(Debug)]
pub struct RegisterInput {
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub password: SecretString,
}

impl RegisterInput {
    fn validate(&self) -> Result<Phone, StoreError> {
        let phone = Phone::parse(&self.phone)?;
        if self.first_name.trim().is_empty() {
            return Err(StoreError::InvalidInput("First name is required.".to_string()));
        }
        if self.last_name.trim().is_empty() {
            return Err(StoreError::InvalidInput("Last name is required.".to_string()));
        }
        if let Some(email) = self.email.as_deref()
            && !email.contains('@')
        {
            return Err(StoreError::InvalidInput("Please enter a valid email address.".to_string()));
        }
        validate_password(&self.password)?;
        Ok(phone)
    }
}

fn validate_password(password: &SecretString) -> Result<(), StoreError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(StoreError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }
    Ok(())
}

/// Auth store handle.
#[derive(Debug)]
pub struct AuthStore {
    api: ApiClient,
    session: Arc<AuthSession>,
}

impl AuthStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.session.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.session.subscribe()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.snapshot().is_authenticated()
    }

    /// Restore the persisted session at startup.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the snapshot cannot be read.
    pub async fn hydrate(&self) -> Result<bool, StorageError> {
        let restored = self.session.hydrate().await?;
        if let Some(user) = self.session.snapshot().user.as_ref() {
            set_sentry_user(user);
        }
        Ok(restored)
    }

    /// Sign in with phone and password.
    ///
    /// # Errors
    ///
    /// Returns the failure after recording its message in `error`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, phone: &str, password: &SecretString) -> Result<(), StoreError> {
        self.session.update(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = self.try_login(phone, password).await;
        match result {
            Ok(response) => {
                let LoginResponse {
                    user,
                    token,
                    refresh_token,
                } = response;
                set_sentry_user(&user);
                tracing::info!(user_id = %user.id, "Logged in");
                add_breadcrumb("auth", "Logged in", Some(&[("user_id", user.id.as_str())]));
                self.session
                    .commit(|state| {
                        state.user = Some(user);
                        state.tokens = Some(AuthTokens::new(token, refresh_token));
                        state.is_loading = false;
                        state.error = None;
                    })
                    .await;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Login failed");
                let message = e.user_message(LOGIN_FALLBACK);
                self.session.update(|state| {
                    state.is_loading = false;
                    state.error = Some(message);
                });
                Err(e)
            }
        }
    }

    async fn try_login(
        &self,
        phone: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, StoreError> {
        let phone = Phone::parse(phone)?;
        let body = LoginRequest {
            phone: phone.as_str(),
            password: password.expose_secret(),
        };
        Ok(self.api.post(endpoints::LOGIN, &body).await?)
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns the failure after recording its message in `error`.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterInput) -> Result<(), StoreError> {
        self.session.update(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = self.try_register(&input).await;
        self.session.update(|state| {
            state.is_loading = false;
            if let Err(e) = &result {
                state.error = Some(e.user_message(REGISTER_FALLBACK));
            }
        });

        match &result {
            Ok(()) => tracing::info!("Registered account"),
            Err(e) => tracing::warn!(error = %e, "Registration failed"),
        }
        result
    }

    async fn try_register(&self, input: &RegisterInput) -> Result<(), StoreError> {
        let phone = input.validate()?;
        let body = RegisterRequest {
            phone: phone.as_str(),
            first_name: input.first_name.trim(),
            last_name: input.last_name.trim(),
            email: input.email.as_deref().map(str::trim),
            password: input.password.expose_secret(),
        };
        let _: IgnoredAny = self.api.post(endpoints::REGISTER, &body).await?;
        Ok(())
    }

    /// Sign out.
    ///
    /// The server is told when a token is held, but local state is cleared
    /// whatever the outcome.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.session.access_token().is_some()
            && let Err(e) = self
                .api
                .post::<_, IgnoredAny>(endpoints::LOGOUT, &serde_json::json!({}))
                .await
        {
            tracing::debug!(error = %e, "Server logout failed, clearing local session anyway");
        }

        self.session.clear().await;
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        tracing::info!("Logged out");
    }

    /// Re-fetch the signed-in user's record.
    ///
    /// A no-op when signed out. If the API no longer accepts the session,
    /// the local session is cleared.
    ///
    /// # Errors
    ///
    /// Returns the request error; nothing is recorded in `error`.
    #[instrument(skip(self))]
    pub async fn refresh_user(&self) -> Result<(), StoreError> {
        let Some(user_id) = self.session.snapshot().user.map(|user| user.id) else {
            return Ok(());
        };

        match self
            .api
            .get::<User>(&endpoints::user_by_id(user_id.as_str()), &[])
            .await
        {
            Ok(user) => {
                self.session
                    .commit(|state| {
                        if state.tokens.is_some() {
                            state.user = Some(user);
                        }
                    })
                    .await;
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(error = %e, "Session rejected, signing out");
                self.session.clear().await;
                clear_sentry_user();
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Send a password reset code to `phone`.
    ///
    /// # Errors
    ///
    /// Returns the failure after recording it on the code-request step.
    #[instrument(skip(self))]
    pub async fn request_verification_code(&self, phone: &str) -> Result<(), StoreError> {
        self.session.update(|state| {
            state.password_reset = PasswordReset::default();
            state.password_reset.code_request.start();
        });

        let result = async {
            let phone = Phone::parse(phone)?;
            let body = ForgotPasswordRequest {
                phone: phone.as_str(),
            };
            let _: IgnoredAny = self.api.post(endpoints::FORGOT_PASSWORD, &body).await?;
            Ok::<_, StoreError>(phone)
        }
        .await;

        self.finish_step(
            |reset| &mut reset.code_request,
            result.as_ref().map(|_| ()),
            CODE_REQUEST_FALLBACK,
        );
        let phone = result?;
        self.session
            .update(|state| state.password_reset.phone = Some(phone.into_inner()));
        Ok(())
    }

    /// Verify the code received by SMS.
    ///
    /// # Errors
    ///
    /// Returns the failure after recording it on the verification step.
    #[instrument(skip(self, code))]
    pub async fn verify_code(&self, code: &str) -> Result<(), StoreError> {
        self.session.update(|state| {
            state.password_reset.verified_token = None;
            state.password_reset.verification.start();
        });

        let code = code.trim();
        let result = async {
            if code.is_empty() {
                return Err(StoreError::InvalidInput("Please enter the code.".to_string()));
            }
            let body = VerifyResetCodeRequest { reset_token: code };
            let _: IgnoredAny = self.api.post(endpoints::VERIFY_RESET_CODE, &body).await?;
            Ok::<(), StoreError>(())
        }
        .await;

        if result.is_ok() {
            self.session
                .update(|state| state.password_reset.verified_token = Some(code.to_string()));
        }
        self.finish_step(
            |reset| &mut reset.verification,
            result.as_ref().map(|_| ()),
            VERIFY_FALLBACK,
        );
        result
    }

    /// Set a new password using the verified code.
    ///
    /// Success clears the whole reset flow.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ResetNotVerified` if no code was verified, or the
    /// request failure after recording it on the reset step.
    #[instrument(skip(self, password))]
    pub async fn reset_password(&self, password: &SecretString) -> Result<(), StoreError> {
        let Some(reset_token) = self.session.snapshot().password_reset.verified_token else {
            self.session.update(|state| {
                state.password_reset.reset.fail(StoreError::ResetNotVerified.user_message(""));
            });
            return Err(StoreError::ResetNotVerified);
        };
        self.session.update(|state| state.password_reset.reset.start());

        let result = async {
            validate_password(password)?;
            let body = ResetPasswordRequest {
                password: password.expose_secret(),
                reset_token: &reset_token,
            };
            let _: IgnoredAny = self.api.post(endpoints::RESET_PASSWORD, &body).await?;
            Ok::<(), StoreError>(())
        }
        .await;

        match &result {
            Ok(()) => {
                tracing::info!("Password reset");
                self.session
                    .update(|state| state.password_reset = PasswordReset::default());
            }
            Err(e) => self.finish_step(|reset| &mut reset.reset, Err(e), RESET_FALLBACK),
        }
        result
    }

    pub fn clear_error(&self) {
        self.session.update(|state| state.error = None);
    }

    fn finish_step(
        &self,
        step: impl FnOnce(&mut PasswordReset) -> &mut StepState,
        result: Result<(), &StoreError>,
        fallback: &str,
    ) {
        self.session.update(|state| {
            let step = step(&mut state.password_reset);
            match result {
                Ok(()) => step.succeed(),
                Err(e) => step.fail(e.user_message(fallback)),
            }
        });
    }
}
