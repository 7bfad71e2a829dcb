use std::time::Duration;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::page::{ListResult, Page};
use crate::domain::ports::{EntityCache, UserRepository};
use crate::domain::user::{NewUser, UserChanges, UserView};

use super::{cache_evict, cache_read, cache_write};

const CACHE_TTL: Duration = Duration::from_secs(3600);

fn cache_key(id: Uuid) -> String {
    format!("cache:user:{}", id)
}

pub struct UserService<R, C> {
    repo: R,
    cache: C,
}

impl<R: UserRepository, C: EntityCache> UserService<R, C> {
    pub fn new(repo: R, cache: C) -> Self {
        Self { repo, cache }
    }

    /// Read-through: cache hit skips the store entirely, a miss populates
    /// the cache for an hour.
    pub fn get(&self, id: Uuid) -> Result<Option<UserView>, DomainError> {
        let key = cache_key(id);
        if let Some(user) = cache_read(&self.cache, &key) {
            return Ok(Some(user));
        }
        let user = self.repo.find_by_id(id)?;
        if let Some(user) = &user {
            cache_write(&self.cache, &key, user, CACHE_TTL);
        }
        Ok(user)
    }

    pub fn list(&self, page: Page) -> Result<ListResult<UserView>, DomainError> {
        self.repo.list(page)
    }

    pub fn create(&self, new: NewUser) -> Result<UserView, DomainError> {
        if self.repo.find_by_email(&new.email)?.is_some() {
            return Err(DomainError::Conflict(format!(
                "user with email {} already exists",
                new.email
            )));
        }
        if self.repo.find_by_username(&new.username)?.is_some() {
            return Err(DomainError::Conflict(format!(
                "user with username {} already exists",
                new.username
            )));
        }
        self.repo.insert(new)
    }

    /// Partial update; uniqueness is re-checked only for fields actually
    /// being changed. The cache entry is evicted, not refreshed, so the next
    /// read observes the store.
    pub fn update(&self, id: Uuid, changes: UserChanges)
        -> Result<Option<UserView>, DomainError> {
        let Some(existing) = self.repo.find_by_id(id)? else {
            return Ok(None);
        };

        if let Some(email) = &changes.email {
            if *email != existing.email && self.repo.find_by_email(email)?.is_some() {
                return Err(DomainError::Conflict(format!(
                    "user with email {} already exists",
                    email
                )));
            }
        }
        if let Some(username) = &changes.username {
            if *username != existing.username && self.repo.find_by_username(username)?.is_some() {
                return Err(DomainError::Conflict(format!(
                    "user with username {} already exists",
                    username
                )));
            }
        }

        let updated = self.repo.update(id, changes)?;
        cache_evict(&self.cache, &cache_key(id));
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
