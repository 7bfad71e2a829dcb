use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::address::{AddressChanges, AddressView, NewAddress};
use crate::domain::errors::DomainError;
use crate::domain::page::{ListResult, Page};
use crate::domain::ports::{AddressRepository, Repository};
use crate::schema::addresses;

use super::models::{AddressChangeset, AddressRow, NewAddressRow};

impl From<AddressRow> for AddressView {
    fn from(row: AddressRow) -> Self {
        AddressView {
            id: row.id,
            user_id: row.user_id,
            street: row.street,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
            is_primary: row.is_primary,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct DieselAddressRepository {
    pool: DbPool,
}

impl DieselAddressRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Repository for DieselAddressRepository {
    type Entity = AddressView;
    type New = NewAddress;
    type Changes = AddressChanges;

    fn find_by_id(&self, id: Uuid) -> Result<Option<AddressView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = addresses::table
            .find(id)
            .select(AddressRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn list(&self, page: Page) -> Result<ListResult<AddressView>, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = addresses::table.count().get_result(conn)?;
            let rows = addresses::table
                .select(AddressRow::as_select())
                .order((addresses::created_at.desc(), addresses::id.asc()))
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;
            Ok(ListResult {
                items: rows.into_iter().map(Into::into).collect(),
                total,
            })
        })
    }

    fn insert(&self, new: NewAddress) -> Result<AddressView, DomainError> {
        let mut conn = self.pool.get()?;
        let row: AddressRow = diesel::insert_into(addresses::table)
            .values(&NewAddressRow {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                street: new.street,
                city: new.city,
                state: new.state,
                zip_code: new.zip_code,
                country: new.country,
                is_primary: new.is_primary,
            })
            .returning(AddressRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(
        &self,
        id: Uuid,
        changes: AddressChanges,
    ) -> Result<Option<AddressView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<AddressRow> = diesel::update(addresses::table.find(id))
            .set(&AddressChangeset {
                street: changes.street,
                city: changes.city,
                state: changes.state,
                zip_code: changes.zip_code,
                country: changes.country,
                is_primary: changes.is_primary,
                updated_at: Utc::now(),
            })
            .returning(AddressRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(addresses::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn count(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(addresses::table.count().get_result(&mut conn)?)
    }
}

impl AddressRepository for DieselAddressRepository {
    fn list_for_user(
        &self,
        user_id: Uuid,
        page: Page,
    ) -> Result<ListResult<AddressView>, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = addresses::table
                .filter(addresses::user_id.eq(user_id))
                .count()
                .get_result(conn)?;
            let rows = addresses::table
                .filter(addresses::user_id.eq(user_id))
                .select(AddressRow::as_select())
                .order((addresses::created_at.desc(), addresses::id.asc()))
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;
            Ok(ListResult {
                items: rows.into_iter().map(Into::into).collect(),
                total,
            })
        })
    }
}
