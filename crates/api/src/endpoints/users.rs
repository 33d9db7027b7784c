//! `/users` endpoints for the signed-in customer.

use reqwest::Method;
use respawn_core::AddressId;
use respawn_core::account::{Address, Availability, ProfileUpdate, User};
use tracing::instrument;

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::token::AccessToken;

impl BackendClient {
    /// `GET /users/profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &AccessToken) -> Result<User, ApiError> {
        self.get("/users/profile", Some(token)).await
    }

    /// `PUT /users/profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    #[instrument(skip(self, token, update))]
    pub async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        self.send_body(Method::PUT, "/users/profile", Some(token), update)
            .await
    }

    /// `GET /users/check?username=&email=`.
    ///
    /// Best effort: the answer can be outdated by the time the profile is
    /// saved, and the save is the authoritative check.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn check_availability(
        &self,
        token: Option<&AccessToken>,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Availability, ApiError> {
        let mut url = self.endpoint("/users/check")?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(username) = username {
                pairs.append_pair("username", username);
            }
            if let Some(email) = email {
                pairs.append_pair("email", email);
            }
        }
        self.send_json(self.request(Method::GET, url, token)).await
    }

    /// `POST /users/addresses`. Returns the updated profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, address))]
    pub async fn add_address(
        &self,
        token: &AccessToken,
        address: &Address,
    ) -> Result<User, ApiError> {
        self.send_body(Method::POST, "/users/addresses", Some(token), address)
            .await
    }

    /// `DELETE /users/addresses/{id}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_address(&self, token: &AccessToken, id: AddressId) -> Result<(), ApiError> {
        self.delete(&format!("/users/addresses/{id}"), token).await
    }
}
