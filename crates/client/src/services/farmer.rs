//! `/api/farmers` routes: farm profiles, pickup addresses and moderation.

use nongsan_core::dto::{
    AddressRequest, AddressResponse, ApiAck, ChangeFarmerStatusRequest, FarmerPatchRequest,
    FarmerResponse, FarmerUpdateRequest,
};
use nongsan_core::{AddressId, FarmerId, FarmerStatus};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct FarmerApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn farmers(&self) -> FarmerApi<'_> {
        FarmerApi { api: self }
    }
}

impl FarmerApi<'_> {
    fn url(&self, path: &str) -> url::Url {
        self.api.api_url(&format!("/farmers{path}"))
    }

    /// A farm's public profile.
    ///
    /// # Errors
    ///
    /// `farmer-e-01` when not found.
    pub async fn get(&self, id: &FarmerId) -> Result<FarmerResponse, ApiError> {
        self.api
            .get(self.url(&format!("/{}", segment(id.as_str()))))
            .data()
            .await
    }

    /// The signed-in farmer's own farm.
    ///
    /// # Errors
    ///
    /// Returns an error if the account has no farm.
    pub async fn owner(&self) -> Result<FarmerResponse, ApiError> {
        self.api.get(self.url("/owner")).data().await
    }

    /// Every farm (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin.
    pub async fn list(&self) -> Result<Vec<FarmerResponse>, ApiError> {
        self.api.get(self.url("")).data().await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    pub async fn update(&self, request: &FarmerUpdateRequest) -> Result<FarmerResponse, ApiError> {
        self.api.put(self.url("")).json(request).data().await
    }

    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    pub async fn patch(&self, request: &FarmerPatchRequest) -> Result<FarmerResponse, ApiError> {
        self.api.patch(self.url("")).json(request).data().await
    }

    /// Attach a pickup address to the farm.
    ///
    /// # Errors
    ///
    /// `farmer-e-07` when the farm already has an address.
    pub async fn add_address(&self, request: &AddressRequest) -> Result<FarmerResponse, ApiError> {
        self.api
            .post(self.url("/address"))
            .json(request)
            .data()
            .await
    }

    /// # Errors
    ///
    /// `farmer-e-08` when the address is not the farm's.
    pub async fn update_address(
        &self,
        id: &AddressId,
        request: &AddressRequest,
    ) -> Result<AddressResponse, ApiError> {
        self.api
            .patch(self.url(&format!("/address/{}", segment(id.as_str()))))
            .json(request)
            .data()
            .await
    }

    /// # Errors
    ///
    /// `farmer-e-09` when the address is not the farm's.
    pub async fn delete_address(&self, id: &AddressId) -> Result<ApiAck, ApiError> {
        self.api
            .delete(self.url(&format!("/address/{}", segment(id.as_str()))))
            .ack()
            .await
    }

    /// Block, unblock or pause a farm. Admins may set any status; a farmer
    /// may only toggle `SELF_BLOCK` on their own farm.
    ///
    /// # Errors
    ///
    /// `farmer-e-02` when the caller may not set this status.
    pub async fn change_status(
        &self,
        id: &FarmerId,
        status: FarmerStatus,
    ) -> Result<FarmerResponse, ApiError> {
        self.api
            .post(self.url(&format!("/{}/status", segment(id.as_str()))))
            .json(&ChangeFarmerStatusRequest { status })
            .data()
            .await
    }
}
