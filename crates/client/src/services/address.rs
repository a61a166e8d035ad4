//! `/api/addresses` routes: the consumer's delivery addresses.

use nongsan_core::AddressId;
use nongsan_core::dto::{AddressRequest, AddressResponse, ApiAck};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct AddressApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn addresses(&self) -> AddressApi<'_> {
        AddressApi { api: self }
    }
}

impl AddressApi<'_> {
    fn url(&self, id: &AddressId) -> url::Url {
        self.api
            .api_url(&format!("/addresses/{}", segment(id.as_str())))
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the address.
    pub async fn create(&self, request: &AddressRequest) -> Result<AddressResponse, ApiError> {
        self.api
            .post(self.api.api_url("/addresses"))
            .json(request)
            .data()
            .await
    }

    /// # Errors
    ///
    /// `address-e-01` when not found.
    pub async fn get(&self, id: &AddressId) -> Result<AddressResponse, ApiError> {
        self.api.get(self.url(id)).data().await
    }

    /// # Errors
    ///
    /// Returns an error if not signed in.
    pub async fn list(&self) -> Result<Vec<AddressResponse>, ApiError> {
        self.api.get(self.api.api_url("/addresses")).data().await
    }

    /// # Errors
    ///
    /// `address-e-02` when not found, `address-e-04` when not the owner.
    pub async fn update(
        &self,
        id: &AddressId,
        request: &AddressRequest,
    ) -> Result<AddressResponse, ApiError> {
        self.api.put(self.url(id)).json(request).data().await
    }

    /// Make `id` the default delivery address.
    ///
    /// # Errors
    ///
    /// `address-e-03` when no default can be set.
    pub async fn set_default(&self, id: &AddressId) -> Result<AddressResponse, ApiError> {
        self.api
            .get(
                self.api
                    .api_url(&format!("/addresses/isDefault/{}", segment(id.as_str()))),
            )
            .data()
            .await
    }

    /// # Errors
    ///
    /// `address-e-04` when not the owner.
    pub async fn delete(&self, id: &AddressId) -> Result<ApiAck, ApiError> {
        self.api.delete(self.url(id)).ack().await
    }
}
