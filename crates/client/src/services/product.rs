//! `/api/products` routes.

use nongsan_core::dto::{
    ApiAck, ChangeProductStatusRequest, OcopRequest, PageRequest, PageResponse, ProductName,
    ProductRequest, ProductResponse, ProductTag,
};
use nongsan_core::{FarmerId, ProductId, ProductStatus};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct ProductApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn products(&self) -> ProductApi<'_> {
        ProductApi { api: self }
    }
}

impl ProductApi<'_> {
    fn url(&self, path: &str) -> url::Url {
        self.api.api_url(&format!("/products{path}"))
    }

    fn by_id(&self, id: &ProductId) -> url::Url {
        self.url(&format!("/{}", segment(id.as_str())))
    }

    /// One page of the public catalog (active products only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list(&self, page: PageRequest) -> Result<PageResponse<ProductTag>, ApiError> {
        self.api
            .get(self.url(""))
            .query("page", page.page)
            .query("size", page.size)
            .cached_data()
            .await
    }

    /// List a new product for review (farmer).
    ///
    /// # Errors
    ///
    /// Returns an error if the category does not exist.
    pub async fn create(&self, request: &ProductRequest) -> Result<ProductResponse, ApiError> {
        let product = self
            .api
            .post(self.url(""))
            .json(request)
            .data()
            .await?;
        self.api.invalidate_cache();
        Ok(product)
    }

    /// Every product regardless of status (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin.
    pub async fn admin_list(&self) -> Result<Vec<ProductResponse>, ApiError> {
        self.api.get(self.url("/admin")).data().await
    }

    /// The signed-in farmer's products.
    ///
    /// # Errors
    ///
    /// Returns an error if the account has no farm.
    pub async fn mine(&self) -> Result<Vec<ProductResponse>, ApiError> {
        self.api.get(self.url("/farmer")).data().await
    }

    /// # Errors
    ///
    /// `farmer-e-01` when the farm is not found.
    pub async fn by_farmer(&self, farmer_id: &FarmerId) -> Result<Vec<ProductResponse>, ApiError> {
        self.api
            .get(self.url(&format!("/farmer/{}", segment(farmer_id.as_str()))))
            .data()
            .await
    }

    /// Product detail. Cached for five minutes.
    ///
    /// # Errors
    ///
    /// `product-e-01` when not found.
    pub async fn get(&self, id: &ProductId) -> Result<ProductResponse, ApiError> {
        self.api.get(self.by_id(id)).cached_data().await
    }

    /// ID and name of every product, for pickers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn names(&self) -> Result<Vec<ProductName>, ApiError> {
        self.api.get(self.url("/names")).data().await
    }

    /// # Errors
    ///
    /// `product-e-03` when the caller does not own the product.
    pub async fn update(
        &self,
        id: &ProductId,
        request: &ProductRequest,
    ) -> Result<ProductResponse, ApiError> {
        let product = self.api.put(self.by_id(id)).json(request).data().await?;
        self.api.invalidate_cache();
        Ok(product)
    }

    /// Attach or replace the product's OCOP certificate. It goes back to
    /// `PENDING_VERIFY` until an admin reviews it.
    ///
    /// # Errors
    ///
    /// `ocop-e-03` when the current certificate is not `REJECTED`.
    pub async fn update_ocop(
        &self,
        id: &ProductId,
        request: &OcopRequest,
    ) -> Result<ProductResponse, ApiError> {
        let product = self
            .api
            .put(self.url(&format!("/{}/ocop", segment(id.as_str()))))
            .json(request)
            .data()
            .await?;
        self.api.invalidate_cache();
        Ok(product)
    }

    /// # Errors
    ///
    /// `product-e-03` when the caller does not own the product.
    pub async fn delete(&self, id: &ProductId) -> Result<ApiAck, ApiError> {
        let ack = self.api.delete(self.by_id(id)).ack().await?;
        self.api.invalidate_cache();
        Ok(ack)
    }

    /// Approve, block or reject a listing (admin).
    ///
    /// # Errors
    ///
    /// `product-e-02` when the caller may not set this status.
    pub async fn admin_change_status(
        &self,
        id: &ProductId,
        status: ProductStatus,
    ) -> Result<ProductResponse, ApiError> {
        let product = self
            .api
            .post(self.url("/admin/change-status"))
            .json(&ChangeProductStatusRequest {
                id: id.clone(),
                status,
            })
            .data()
            .await?;
        self.api.invalidate_cache();
        Ok(product)
    }
}
