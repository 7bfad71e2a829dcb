use uuid::Uuid;

use crate::domain::address::{AddressChanges, AddressView, NewAddress};
use crate::domain::errors::DomainError;
use crate::domain::page::{ListResult, Page};
use crate::domain::ports::{AddressRepository, Repository, UserRepository};

pub struct AddressService<A, U> {
    addresses: A,
    users: U,
}

impl<A: AddressRepository, U: UserRepository> AddressService<A, U> {
    pub fn new(addresses: A, users: U) -> Self {
        Self { addresses, users }
    }

    pub fn get(&self, id: Uuid) -> Result<Option<AddressView>, DomainError> {
        self.addresses.find_by_id(id)
    }

    /// `user_id` narrows the listing to one user's addresses.
    pub fn list(
        &self,
        user_id: Option<Uuid>,
        page: Page,
    ) -> Result<ListResult<AddressView>, DomainError> {
        match user_id {
            Some(user_id) => self.addresses.list_for_user(user_id, page),
            None => self.addresses.list(page),
        }
    }

    pub fn create(&self, new: NewAddress) -> Result<AddressView, DomainError> {
        if self.users.find_by_id(new.user_id)?.is_none() {
            return Err(DomainError::not_found("user", new.user_id));
        }
        self.addresses.insert(new)
    }

    pub fn update(
        &self,
        id: Uuid,
        changes: AddressChanges,
    ) -> Result<Option<AddressView>, DomainError> {
        self.addresses.update(id, changes)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        self.addresses.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::application::testsupport::MemoryUserRepo;

    #[derive(Default)]
    struct MemoryAddressRepo {
        addresses: Mutex<Vec<AddressView>>,
    }

    impl Repository for MemoryAddressRepo {
        type Entity = AddressView;
        type New = NewAddress;
        type Changes = AddressChanges;

        fn find_by_id(&self, id: Uuid) -> Result<Option<AddressView>, DomainError> {
            Ok(self
                .addresses
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == id)
                .cloned())
        }

        fn list(&self, _page: Page) -> Result<ListResult<AddressView>, DomainError> {
            let addresses = self.addresses.lock().unwrap();
            Ok(ListResult {
                items: addresses.clone(),
                total: addresses.len() as i64,
            })
        }

        fn insert(&self, new: NewAddress) -> Result<AddressView, DomainError> {
            let now = Utc::now();
            let address = AddressView {
                id: Uuid::new_v4(),
                user_id: new.user_id,
                street: new.street,
                city: new.city,
                state: new.state,
                zip_code: new.zip_code,
                country: new.country,
                is_primary: new.is_primary,
                created_at: now,
                updated_at: now,
            };
            self.addresses.lock().unwrap().push(address.clone());
            Ok(address)
        }

        fn update(
            &self,
            id: Uuid,
            changes: AddressChanges,
        ) -> Result<Option<AddressView>, DomainError> {
            let mut addresses = self.addresses.lock().unwrap();
            let Some(address) = addresses.iter_mut().find(|a| a.id == id) else {
                return Ok(None);
            };
            if let Some(street) = changes.street {
                address.street = street;
            }
            if let Some(is_primary) = changes.is_primary {
                address.is_primary = is_primary;
            }
            address.updated_at = Utc::now();
            Ok(Some(address.clone()))
        }

        fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
            let mut addresses = self.addresses.lock().unwrap();
            let before = addresses.len();
            addresses.retain(|a| a.id != id);
            Ok(addresses.len() < before)
        }

        fn count(&self) -> Result<i64, DomainError> {
            Ok(self.addresses.lock().unwrap().len() as i64)
        }
    }

    impl AddressRepository for MemoryAddressRepo {
        fn list_for_user(
            &self,
            user_id: Uuid,
            _page: Page,
        ) -> Result<ListResult<AddressView>, DomainError> {
            let items: Vec<AddressView> = self
                .addresses
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect();
            Ok(ListResult {
                total: items.len() as i64,
                items,
            })
        }
    }

    fn make_address(user_id: Uuid) -> NewAddress {
        NewAddress {
            user_id,
            street: "742 Evergreen Terrace".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62704".to_string(),
            country: "USA".to_string(),
            is_primary: true,
        }
    }

    fn service_with_user() -> (AddressService<MemoryAddressRepo, MemoryUserRepo>, Uuid) {
        let (users, user_id) = MemoryUserRepo::with_user("homer", "homer@x.com");
        (
            AddressService::new(MemoryAddressRepo::default(), users),
            user_id,
        )
    }

    #[test]
    fn create_requires_an_existing_user() {
        let (svc, _user_id) = service_with_user();

        let err = svc
            .create(make_address(Uuid::new_v4()))
            .expect_err("unknown user should fail");
        assert!(matches!(err, DomainError::NotFound { entity: "user", .. }));
    }

    #[test]
    fn create_and_filtered_list() {
        let (svc, user_id) = service_with_user();
        svc.create(make_address(user_id)).expect("create failed");

        let all = svc.list(None, Page::new(1, 10)).expect("list failed");
        assert_eq!(all.total, 1);

        let mine = svc
            .list(Some(user_id), Page::new(1, 10))
            .expect("list failed");
        assert_eq!(mine.total, 1);

        let theirs = svc
            .list(Some(Uuid::new_v4()), Page::new(1, 10))
            .expect("list failed");
        assert_eq!(theirs.total, 0);
    }

    #[test]
    fn delete_reports_not_found_for_unknown_id() {
        let (svc, _user_id) = service_with_user();
        assert!(!svc.delete(Uuid::new_v4()).expect("delete failed"));
    }
}
