use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::brands::dtos::{BrandRequestDto, BrandResponseDto};
use crate::modules::catalog::CatalogStore;

/// Service for brand operations
pub struct BrandService {
    store: Arc<dyn CatalogStore>,
}

impl BrandService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// List brands ordered by name with their active product counts
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<BrandResponseDto>> {
        let brands = self.store.list_brands(include_inactive).await?;
        let counts = self.store.count_active_products_by_brand().await?;

        Ok(brands
            .into_iter()
            .map(|b| {
                let count = counts.get(&b.id).copied().unwrap_or(0);
                BrandResponseDto::new(b, count)
            })
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<BrandResponseDto> {
        let brand = self
            .store
            .find_brand(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", id)))?;
        let counts = self.store.count_active_products_by_brand().await?;
        let count = counts.get(&id).copied().unwrap_or(0);

        Ok(BrandResponseDto::new(brand, count))
    }

    /// Create a brand. Active brand names are unique (case-insensitive).
    pub async fn create(&self, dto: BrandRequestDto) -> Result<BrandResponseDto> {
        let brand = self.store.insert_brand(&dto.into_input()).await?;
        tracing::info!(brand_id = %brand.id, name = %brand.name, "Brand created");

        Ok(BrandResponseDto::new(brand, 0))
    }

    pub async fn update(&self, id: Uuid, dto: BrandRequestDto) -> Result<BrandResponseDto> {
        self.store
            .update_brand(id, &dto.into_input())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Brand {} not found", id)))?;
        tracing::info!(brand_id = %id, "Brand updated");

        self.get(id).await
    }

    /// Delete a brand no product references
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.store.find_brand(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Brand {} not found", id)));
        }

        if self.store.count_products_for_brand(id).await? > 0 {
            return Err(AppError::Conflict(
                "Cannot delete a brand that has products. Delete or reassign them first."
                    .to_string(),
            ));
        }

        if !self.store.delete_brand(id).await? {
            return Err(AppError::NotFound(format!("Brand {} not found", id)));
        }
        tracing::info!(brand_id = %id, "Brand deleted");
        Ok(())
    }
}
