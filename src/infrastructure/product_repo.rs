use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::page::{ListResult, Page};
use crate::domain::ports::{ProductRepository, Repository};
use crate::domain::product::{NewProduct, ProductChanges, ProductView};
use crate::schema::products;

use super::models::{NewProductRow, ProductChangeset, ProductRow};

impl From<ProductRow> for ProductView {
    fn from(row: ProductRow) -> Self {
        ProductView {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            stock_quantity: row.stock_quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Repository for DieselProductRepository {
    type Entity = ProductView;
    type New = NewProduct;
    type Changes = ProductChanges;

    fn find_by_id(&self, id: Uuid) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn list(&self, page: Page) -> Result<ListResult<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = products::table.count().get_result(conn)?;
            let rows = products::table
                .select(ProductRow::as_select())
                .order((products::created_at.desc(), products::id.asc()))
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;
            Ok(ListResult {
                items: rows.into_iter().map(Into::into).collect(),
                total,
            })
        })
    }

    fn insert(&self, new: NewProduct) -> Result<ProductView, DomainError> {
        let mut conn = self.pool.get()?;
        let row: ProductRow = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: new.name,
                description: new.description,
                price: new.price,
                stock_quantity: new.stock_quantity,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Option<ProductView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<ProductRow> = diesel::update(products::table.find(id))
            .set(&ProductChangeset {
                name: changes.name,
                description: changes.description,
                price: changes.price,
                stock_quantity: changes.stock_quantity,
                updated_at: Utc::now(),
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn count(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(products::table.count().get_result(&mut conn)?)
    }
}

impl ProductRepository for DieselProductRepository {}
