//! Category and product maintenance.

use common::{CategoryId, ProductId};
use domain::{Category, CategoryUpdate, NewCategory, NewProduct, Product, ProductUpdate};
use store::{CatalogStore, StoreError};

use crate::error::{Result, SalesError};

/// Catalog use cases over a [`CatalogStore`].
pub struct CatalogService<S: CatalogStore> {
    store: S,
}

impl<S: CatalogStore> CatalogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_category(&self, id: CategoryId) -> Result<Category> {
        Ok(self.store.get_category(id).await?)
    }

    #[tracing::instrument(skip(self, category), fields(name = %category.name))]
    pub async fn create_category(&self, category: NewCategory) -> Result<Category> {
        let created = self.store.create_category(category).await?;
        tracing::info!(category_id = %created.id, "category created");
        Ok(created)
    }

    #[tracing::instrument(skip(self, update))]
    pub async fn update_category(&self, id: CategoryId, update: CategoryUpdate) -> Result<Category> {
        Ok(self.store.update_category(id, update).await?)
    }

    /// Deletes a category. Fails with `CategoryInUse` while products
    /// still reference it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        self.store.delete_category(id).await?;
        tracing::info!(category_id = %id, "category deleted");
        Ok(())
    }

    /// Lists products. A blank filter is the same as no filter.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self, name_filter: Option<&str>) -> Result<Vec<Product>> {
        let filter = name_filter.map(str::trim).filter(|f| !f.is_empty());
        Ok(self.store.list_products(filter).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        Ok(self.store.get_product(id).await?)
    }

    #[tracing::instrument(skip(self, product), fields(name = %product.name, category_id = %product.category_id))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product> {
        let category_id = product.category_id;
        let created = self
            .store
            .create_product(product)
            .await
            .map_err(|e| missing_category(e, category_id))?;
        tracing::info!(product_id = %created.id, "product created");
        Ok(created)
    }

    /// Updates a product. A missing product stays a store `NotFound`; a
    /// missing target category becomes [`SalesError::CategoryNotFound`].
    #[tracing::instrument(skip(self, update))]
    pub async fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product> {
        let category_id = update.category_id;
        let updated = self
            .store
            .update_product(id, update)
            .await
            .map_err(|e| match category_id {
                Some(category_id) => missing_category(e, category_id),
                None => SalesError::Store(e),
            })?;
        Ok(updated)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        self.store.delete_product(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }
}

fn missing_category(e: StoreError, category_id: CategoryId) -> SalesError {
    match e {
        StoreError::NotFound {
            entity: "Category", ..
        } => SalesError::CategoryNotFound(category_id),
        other => SalesError::Store(other),
    }
}
