use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::page::{ListResult, Page};
use crate::domain::ports::{Repository, UserRepository};
use crate::domain::user::{NewUser, UserChanges, UserView};
use crate::schema::users;

use super::models::{NewUserRow, UserChangeset, UserRow};

impl From<UserRow> for UserView {
    fn from(row: UserRow) -> Self {
        UserView {
            id: row.id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Repository for DieselUserRepository {
    type Entity = UserView;
    type New = NewUser;
    type Changes = UserChanges;

    fn find_by_id(&self, id: Uuid) -> Result<Option<UserView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn list(&self, page: Page) -> Result<ListResult<UserView>, DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = users::table.count().get_result(conn)?;
            let rows = users::table
                .select(UserRow::as_select())
                .order((users::created_at.desc(), users::id.asc()))
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;
            Ok(ListResult {
                items: rows.into_iter().map(Into::into).collect(),
                total,
            })
        })
    }

    fn insert(&self, new: NewUser) -> Result<UserView, DomainError> {
        let mut conn = self.pool.get()?;
        let row: UserRow = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                username: new.username,
                email: new.email,
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<UserRow> = diesel::update(users::table.find(id))
            .set(&UserChangeset {
                username: changes.username,
                email: changes.email,
                updated_at: Utc::now(),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(users::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn count(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(users::table.count().get_result(&mut conn)?)
    }
}

impl UserRepository for DieselUserRepository {
    fn find_by_username(&self, username: &str) -> Result<Option<UserView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<UserView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::testing::setup_db;

    fn make_user(n: u32) -> NewUser {
        NewUser {
            username: format!("user{}", n),
            email: format!("user{}@example.com", n),
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_id_roundtrip() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);

        let created = repo.insert(make_user(1)).expect("insert failed");
        let found = repo
            .find_by_id(created.id)
            .expect("find failed")
            .expect("user should exist");

        assert_eq!(found.username, "user1");
        assert_eq!(found.email, "user1@example.com");
    }

    #[tokio::test]
    async fn duplicate_email_violates_unique_constraint() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);

        repo.insert(make_user(1)).expect("insert failed");
        let err = repo
            .insert(NewUser {
                username: "other".to_string(),
                email: "user1@example.com".to_string(),
            })
            .expect_err("duplicate email should fail");

        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn find_by_email_and_username() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);
        repo.insert(make_user(7)).expect("insert failed");

        assert!(repo
            .find_by_email("user7@example.com")
            .expect("query failed")
            .is_some());
        assert!(repo
            .find_by_username("user7")
            .expect("query failed")
            .is_some());
        assert!(repo
            .find_by_email("nobody@example.com")
            .expect("query failed")
            .is_none());
    }

    #[tokio::test]
    async fn partial_update_leaves_other_fields_untouched() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);
        let created = repo.insert(make_user(1)).expect("insert failed");

        let updated = repo
            .update(
                created.id,
                UserChanges {
                    email: Some("new@example.com".to_string()),
                    ..Default::default()
                },
            )
            .expect("update failed")
            .expect("user should exist");

        assert_eq!(updated.username, "user1");
        assert_eq!(updated.email, "new@example.com");
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);

        let result = repo
            .update(Uuid::new_v4(), UserChanges::default())
            .expect("update should not error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_is_reported_once() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);
        let created = repo.insert(make_user(1)).expect("insert failed");

        assert!(repo.delete(created.id).expect("delete failed"));
        assert!(!repo.delete(created.id).expect("second delete failed"));
        assert!(repo
            .find_by_id(created.id)
            .expect("find failed")
            .is_none());
    }

    #[tokio::test]
    async fn list_pages_are_disjoint() {
        let (_container, pool) = setup_db().await;
        let repo = DieselUserRepository::new(pool);
        for n in 0..15 {
            repo.insert(make_user(n)).expect("insert failed");
        }

        let page1 = repo.list(Page::new(1, 10)).expect("page 1 failed");
        let page2 = repo.list(Page::new(2, 10)).expect("page 2 failed");

        assert_eq!(page1.total, 15);
        assert_eq!(page1.items.len(), 10);
        assert_eq!(page2.items.len(), 5);
        for u in &page2.items {
            assert!(page1.items.iter().all(|p| p.id != u.id));
        }
    }
}
