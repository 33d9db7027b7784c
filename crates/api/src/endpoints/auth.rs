//! `/auth/*` endpoints. None of these carry a token.

use reqwest::Method;
use tracing::instrument;

use crate::client::BackendClient;
use crate::dto::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, ResetPasswordRequest,
    SignupRequest, VerifyOtpRequest,
};
use crate::error::ApiError;

impl BackendClient {
    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials.
    #[instrument(skip(self, request), fields(identifier = %request.identifier))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.send_body(Method::POST, "/auth/login", None, request)
            .await
    }

    /// `POST /auth/signup`. The backend emails an OTP; the account is usable
    /// after [`Self::verify_otp`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the signup.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ApiError> {
        self.send_body(Method::POST, "/auth/signup", None, request)
            .await
    }

    /// `POST /auth/verify-otp`. Answers with a token like [`Self::login`].
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or expired.
    #[instrument(skip(self, request))]
    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> Result<AuthResponse, ApiError> {
        self.send_body(Method::POST, "/auth/verify-otp", None, request)
            .await
    }

    /// `POST /auth/forgot-password`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, request))]
    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.send_body(Method::POST, "/auth/forgot-password", None, request)
            .await
    }

    /// `POST /auth/reset-password`.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is wrong or the password is rejected.
    #[instrument(skip(self, request))]
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.send_body(Method::POST, "/auth/reset-password", None, request)
            .await
    }
}
