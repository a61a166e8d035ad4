//! `/api/categories` routes.

use nongsan_core::CategoryId;
use nongsan_core::dto::{ApiAck, CategoryRequest, CategoryTreeNode};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct CategoryApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn categories(&self) -> CategoryApi<'_> {
        CategoryApi { api: self }
    }
}

impl CategoryApi<'_> {
    /// The category forest. Cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn tree(&self) -> Result<Vec<CategoryTreeNode>, ApiError> {
        self.api
            .get(self.api.api_url("/categories"))
            .cached_data()
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the caller is not an admin.
    pub async fn create(&self, request: &CategoryRequest) -> Result<ApiAck, ApiError> {
        let ack = self
            .api
            .post(self.api.api_url("/categories"))
            .json(request)
            .ack()
            .await?;
        self.api.invalidate_cache();
        Ok(ack)
    }

    /// # Errors
    ///
    /// Returns an error if the caller is not an admin.
    pub async fn update(
        &self,
        id: &CategoryId,
        request: &CategoryRequest,
    ) -> Result<ApiAck, ApiError> {
        let ack = self
            .api
            .put(
                self.api
                    .api_url(&format!("/categories/{}", segment(id.as_str()))),
            )
            .json(request)
            .ack()
            .await?;
        self.api.invalidate_cache();
        Ok(ack)
    }

    /// # Errors
    ///
    /// Returns an error if the category still has products.
    pub async fn delete(&self, id: &CategoryId) -> Result<ApiAck, ApiError> {
        let ack = self
            .api
            .delete(
                self.api
                    .api_url(&format!("/categories/{}", segment(id.as_str()))),
            )
            .ack()
            .await?;
        self.api.invalidate_cache();
        Ok(ack)
    }
}
