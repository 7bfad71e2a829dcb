use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::address::{AddressChanges, AddressView, NewAddress};
use super::errors::DomainError;
use super::order::{OrderLineInput, OrderView};
use super::page::{ListResult, Page};
use super::product::{NewProduct, ProductChanges, ProductView};
use super::report::ReportView;
use super::user::{NewUser, UserChanges, UserView};

/// The six access shapes every plain entity needs: point lookup, paged list,
/// insert, partial update, delete, count. Entity-specific lookups live in the
/// extension traits below; business rules never live here.
pub trait Repository: Send + Sync + 'static {
    type Entity;
    type New;
    type Changes;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Self::Entity>, DomainError>;
    fn list(&self, page: Page) -> Result<ListResult<Self::Entity>, DomainError>;
    fn insert(&self, new: Self::New) -> Result<Self::Entity, DomainError>;
    fn update(&self, id: Uuid, changes: Self::Changes)
        -> Result<Option<Self::Entity>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn count(&self) -> Result<i64, DomainError>;
}

pub trait UserRepository:
    Repository<Entity = UserView, New = NewUser, Changes = UserChanges>
{
    fn find_by_username(&self, username: &str) -> Result<Option<UserView>, DomainError>;
    fn find_by_email(&self, email: &str) -> Result<Option<UserView>, DomainError>;
}

pub trait AddressRepository:
    Repository<Entity = AddressView, New = NewAddress, Changes = AddressChanges>
{
    fn list_for_user(&self, user_id: Uuid, page: Page)
        -> Result<ListResult<AddressView>, DomainError>;
}

pub trait ProductRepository:
    Repository<Entity = ProductView, New = NewProduct, Changes = ProductChanges>
{
}

/// Orders do not fit the generic shape: they are only ever created through
/// the workflow, and their one mutable field is the status.
pub trait OrderRepository: Send + Sync + 'static {
    /// Persist an order and its aggregated lines, decrementing each product's
    /// stock, all inside a single transaction. Fails with `NotFound` naming
    /// every missing product id, or `InsufficientStock` naming the first
    /// product whose stock cannot cover its line; either way nothing is
    /// written.
    fn create_with_lines(
        &self,
        user_id: Uuid,
        lines: &[OrderLineInput],
    ) -> Result<Uuid, DomainError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, page: Page) -> Result<ListResult<OrderView>, DomainError>;
    fn update_status(&self, id: Uuid, status: &str) -> Result<Option<OrderView>, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
    fn count(&self) -> Result<i64, DomainError>;
}

/// Reports are write-once: one batch insert per scheduled run, plus the
/// per-day read used by the REST surface.
pub trait ReportRepository: Send + Sync + 'static {
    /// Sum association-row quantities per order (zero for line-less orders)
    /// and insert one report row per order stamped `now`, in one transaction.
    fn generate(&self, now: DateTime<Utc>) -> Result<Vec<ReportView>, DomainError>;

    fn find_by_date(&self, day: NaiveDate) -> Result<Vec<ReportView>, DomainError>;
}

/// Opaque byte cache with per-entry expiry. Implementations map transport
/// failures to `DomainError::Unavailable`; callers decide whether that is
/// fatal (for the entity caches it never is).
pub trait EntityCache: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;
    fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError>;
    fn delete(&self, key: &str) -> Result<(), DomainError>;
}

pub trait EventPublisher: Send + Sync + 'static {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), DomainError>;
}
