//! `/api/admin/ocop` routes: OCOP certificate review.

use nongsan_core::ProductId;
use nongsan_core::dto::{OcopRejectRequest, ProductResponse};

use crate::api::{ApiClient, segment};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct AdminOcopApi<'a> {
    api: &'a ApiClient,
}

impl ApiClient {
    #[must_use]
    pub const fn admin_ocop(&self) -> AdminOcopApi<'_> {
        AdminOcopApi { api: self }
    }
}

impl AdminOcopApi<'_> {
    fn url(&self, path: &str) -> url::Url {
        self.api.api_url(&format!("/admin/ocop{path}"))
    }

    /// Products with an OCOP certificate attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin.
    pub async fn list(&self) -> Result<Vec<ProductResponse>, ApiError> {
        self.api.get(self.url("")).data().await
    }

    /// # Errors
    ///
    /// `ocop-e-02` when the product has no certificate, `ocop-e-04` when it
    /// is not awaiting review.
    pub async fn approve(&self, product_id: &ProductId) -> Result<ProductResponse, ApiError> {
        let product = self
            .api
            .post(self.url(&format!("/{}/approve", segment(product_id.as_str()))))
            .data()
            .await?;
        self.api.invalidate_cache();
        Ok(product)
    }

    /// # Errors
    ///
    /// `ocop-e-02` when the product has no certificate, `ocop-e-04` when it
    /// is not awaiting review.
    pub async fn reject(
        &self,
        product_id: &ProductId,
        reason: &str,
    ) -> Result<ProductResponse, ApiError> {
        let product = self
            .api
            .post(self.url(&format!("/{}/reject", segment(product_id.as_str()))))
            .json(&OcopRejectRequest {
                reason: reason.to_string(),
            })
            .data()
            .await?;
        self.api.invalidate_cache();
        Ok(product)
    }
}
