use std::time::Duration;

use bigdecimal::{BigDecimal, Zero};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::page::{ListResult, Page};
use crate::domain::ports::{EntityCache, ProductRepository};
use crate::domain::product::{NewProduct, ProductChanges, ProductView};

use super::{cache_evict, cache_read, cache_write};

const CACHE_TTL: Duration = Duration::from_secs(600);

pub(crate) fn cache_key(id: Uuid) -> String {
    format!("cache:product:{}", id)
}

fn validate_price(price: &BigDecimal) -> Result<(), DomainError> {
    if *price <= BigDecimal::zero() {
        return Err(DomainError::InvalidInput(
            "price must be positive".to_string(),
        ));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<(), DomainError> {
    if stock < 0 {
        return Err(DomainError::InvalidInput(
            "stock_quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}

pub struct ProductService<R, C> {
    repo: R,
    cache: C,
}

impl<R: ProductRepository, C: EntityCache> ProductService<R, C> {
    pub fn new(repo: R, cache: C) -> Self {
        Self { repo, cache }
    }

    pub fn get(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let key = cache_key(id);
        if let Some(product) = cache_read(&self.cache, &key) {
            return Ok(Some(product));
        }
        let product = self.repo.find_by_id(id)?;
        if let Some(product) = &product {
            cache_write(&self.cache, &key, product, CACHE_TTL);
        }
        Ok(product)
    }

    pub fn list(&self, page: Page) -> Result<ListResult<ProductView>, DomainError> {
        self.repo.list(page)
    }

    pub fn create(&self, new: NewProduct) -> Result<ProductView, DomainError> {
        validate_price(&new.price)?;
        validate_stock(new.stock_quantity)?;
        self.repo.insert(new)
    }

    /// Bounds are re-validated only for fields being changed. Both entity
    /// caches invalidate on write rather than refreshing, so a concurrent
    /// reader can never pin a value that lost a race with this update.
    pub fn update(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Option<ProductView>, DomainError> {
        if let Some(price) = &changes.price {
            validate_price(price)?;
        }
        if let Some(stock) = changes.stock_quantity {
            validate_stock(stock)?;
        }

        let updated = self.repo.update(id, changes)?;
        if updated.is_some() {
            cache_evict(&self.cache, &cache_key(id));
        }
        Ok(updated)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let deleted = self.repo.delete(id)?;
        if deleted {
            cache_evict(&self.cache, &cache_key(id));
        }
        Ok(deleted)
    }
}
