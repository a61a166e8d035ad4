//! `/auth` routes: registration, login, tokens and password reset.

use nongsan_core::dto::{
    AccountInfo, ApiAck, AuthTokens, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    RefreshTokenRequest, RegisterRequest, VerifyForgotPasswordRequest,
};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

/// Authentication endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn auth(&self) -> AuthApi<'_> {
        AuthApi { api: self }
    }
}

impl AuthApi<'_> {
    /// Start registration; the backend emails a verification link.
    ///
    /// # Errors
    ///
    /// `auth-e-01` when the email is taken.
    pub async fn register(&self, request: &RegisterRequest) -> Result<ApiAck, ApiError> {
        self.api
            .post(self.api.auth_url("/register"))
            .json(request)
            .ack()
            .await
    }

    /// The link a verification email points at. Opening it in a browser
    /// completes registration and redirects with the new tokens.
    #[must_use]
    pub fn verify_register_url(&self, code: &str) -> url::Url {
        self.api
            .auth_url(&format!("/register/verify/{}", segment(code)))
    }

    /// # Errors
    ///
    /// `auth-e-02` for an unknown email, `auth-e-04` for a wrong password,
    /// `auth-e-03` when the account lacks the requested role.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthTokens, ApiError> {
        self.api
            .post(self.api.auth_url("/login"))
            .json(request)
            .data()
            .await
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh token is expired or revoked.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        self.api
            .post(self.api.auth_url("/refresh-token"))
            .json(&RefreshTokenRequest {
                refresh_token: refresh_token.to_string(),
            })
            .data()
            .await
    }

    /// Revoke a refresh token server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn logout(&self, refresh_token: &str) -> Result<ApiAck, ApiError> {
        self.api
            .post(self.api.auth_url("/logout"))
            .json(&RefreshTokenRequest {
                refresh_token: refresh_token.to_string(),
            })
            .ack()
            .await
    }

    /// # Errors
    ///
    /// `auth-e-07` when the current password is wrong.
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<ApiAck, ApiError> {
        self.api
            .post(self.api.auth_url("/change-password"))
            .json(request)
            .ack()
            .await
    }

    /// Email a password reset code.
    ///
    /// # Errors
    ///
    /// `auth-e-02` for an unknown email.
    pub async fn forgot_password(&self, email: &str) -> Result<ApiAck, ApiError> {
        self.api
            .post(self.api.auth_url("/forgot-password"))
            .json(&ForgotPasswordRequest {
                email: email.to_string(),
            })
            .ack()
            .await
    }

    /// Set a new password with the emailed code; signs the user in.
    ///
    /// # Errors
    ///
    /// `code-e-01` when the code is unknown.
    pub async fn verify_forgot_password(
        &self,
        request: &VerifyForgotPasswordRequest,
    ) -> Result<AuthTokens, ApiError> {
        self.api
            .post(self.api.auth_url("/forgot-password/verify"))
            .json(request)
            .data()
            .await
    }

    /// The signed-in account's profile summary.
    ///
    /// # Errors
    ///
    /// Returns an error if not signed in.
    pub async fn info(&self) -> Result<AccountInfo, ApiError> {
        self.api.get(self.api.auth_url("/info")).data().await
    }
}
