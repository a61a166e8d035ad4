//! `/api/accounts` routes.

use nongsan_core::dto::{
    AccountRequest, AccountResponse, ApiAck, DeleteAccountRequest, UpgradeToFarmerRequest,
    UpgradeToFarmerResponse,
};

use crate::api::ApiClient;
use crate::error::ApiError;

/// Account endpoints.
#[derive(Debug, Clone, Copy)]
pub struct AccountApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn accounts(&self) -> AccountApi<'_> {
        AccountApi { api: self }
    }
}

impl AccountApi<'_> {
    /// The signed-in account.
    ///
    /// # Errors
    ///
    /// Returns an error if not signed in.
    pub async fn get(&self) -> Result<AccountResponse, ApiError> {
        self.api.get(self.api.api_url("/accounts")).data().await
    }

    /// Replace the account profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request.
    pub async fn update(&self, request: &AccountRequest) -> Result<AccountResponse, ApiError> {
        self.api
            .put(self.api.api_url("/accounts"))
            .json(request)
            .data()
            .await
    }

    /// Update only the fields set in `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the request.
    pub async fn patch(&self, request: &AccountRequest) -> Result<AccountResponse, ApiError> {
        self.api
            .patch(self.api.api_url("/accounts"))
            .json(request)
            .data()
            .await
    }

    /// Open a farm for the signed-in account. When the backend re-issues
    /// tokens they are stored, so farmer routes work right away.
    ///
    /// # Errors
    ///
    /// Returns an error if the account already has a farm.
    pub async fn upgrade_to_farmer(
        &self,
        request: &UpgradeToFarmerRequest,
    ) -> Result<UpgradeToFarmerResponse, ApiError> {
        let response: UpgradeToFarmerResponse = self
            .api
            .post(self.api.api_url("/accounts/upgradeToFarmer"))
            .json(request)
            .data()
            .await?;
        if let (Some(access), Some(refresh)) = (&response.access_token, &response.refresh_token) {
            self.api
                .auth_store()
                .set_tokens(access.clone(), refresh.clone())
                .await;
        }
        Ok(response)
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the request.
    pub async fn delete(&self, request: &DeleteAccountRequest) -> Result<ApiAck, ApiError> {
        self.api
            .delete(self.api.api_url("/accounts"))
            .json(request)
            .ack()
            .await
    }

    /// Every account (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin.
    pub async fn all(&self) -> Result<Vec<AccountResponse>, ApiError> {
        self.api.get(self.api.api_url("/accounts/all")).data().await
    }
}
