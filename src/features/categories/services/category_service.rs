use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryDetailDto, CategoryRequestDto, CategoryResponseDto, CategoryTreeDto,
};
use crate::features::categories::tree::{build_tree, check_parent};
use crate::modules::catalog::CatalogStore;

/// Service for category operations
pub struct CategoryService {
    store: Arc<dyn CatalogStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// List categories as a flat list ordered by display order, name, id
    pub async fn list(&self, include_inactive: bool) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.list_categories(include_inactive).await?;
        let counts = self.store.count_active_products_by_category().await?;

        Ok(categories
            .into_iter()
            .map(|c| {
                let count = counts.get(&c.id).copied().unwrap_or(0);
                CategoryResponseDto::new(c, count)
            })
            .collect())
    }

    /// List categories as tree structure starting at the roots
    pub async fn list_tree(&self, include_inactive: bool) -> Result<Vec<CategoryTreeDto>> {
        let categories = self.store.list_categories(include_inactive).await?;
        let counts = self.store.count_active_products_by_category().await?;

        Ok(CategoryTreeDto::from_nodes(build_tree(categories), &counts))
    }

    /// Get a category of any status with its parent name and active children
    pub async fn get(&self, id: Uuid) -> Result<CategoryDetailDto> {
        let category = self
            .store
            .find_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        let parent_name = match category.parent_id {
            Some(parent_id) => self.store.find_category(parent_id).await?.map(|p| p.name),
            None => None,
        };

        let counts = self.store.count_active_products_by_category().await?;
        let count_of = |id: &Uuid| counts.get(id).copied().unwrap_or(0);

        let children = self
            .store
            .list_categories(false)
            .await?
            .into_iter()
            .filter(|c| c.parent_id == Some(id))
            .map(|c| {
                let count = count_of(&c.id);
                CategoryResponseDto::new(c, count)
            })
            .collect();

        let product_count = count_of(&category.id);
        Ok(CategoryDetailDto {
            category: CategoryResponseDto::new(category, product_count),
            parent_name,
            children,
        })
    }

    /// Create a category under an existing active parent (or as a root)
    pub async fn create(&self, dto: CategoryRequestDto) -> Result<CategoryDetailDto> {
        let input = dto.into_input();

        if let Some(parent_id) = input.parent_id {
            let rows = self.store.list_categories(true).await?;
            check_parent(None, parent_id, &rows)?;
        }

        let category = self.store.insert_category(&input).await?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");

        self.get(category.id).await
    }

    /// Replace a category. A changed parent is revalidated against the
    /// whole hierarchy so the tree never gains a cycle.
    pub async fn update(&self, id: Uuid, dto: CategoryRequestDto) -> Result<CategoryDetailDto> {
        let input = dto.into_input();

        let existing = self
            .store
            .find_category(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        if let Some(parent_id) = input.parent_id {
            if existing.parent_id != Some(parent_id) {
                let rows = self.store.list_categories(true).await?;
                check_parent(Some(id), parent_id, &rows)?;
            }
        }

        self.store
            .update_category(id, &input)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;
        tracing::info!(category_id = %id, "Category updated");

        self.get(id).await
    }

    /// Delete a category that has no child categories and no products
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.store.find_category(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        if self.store.count_child_categories(id).await? > 0 {
            return Err(AppError::Conflict(
                "Cannot delete a category that has child categories. Delete or move them first."
                    .to_string(),
            ));
        }
        if self.store.count_products_in_category(id).await? > 0 {
            return Err(AppError::Conflict(
                "Cannot delete a category that has products. Delete or move them first."
                    .to_string(),
            ));
        }

        if !self.store.delete_category(id).await? {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }
        tracing::info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
