use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{aggregate_lines, OrderView};
use crate::domain::page::{ListResult, Page};
use crate::domain::ports::{EntityCache, OrderRepository, UserRepository};

use super::cache_evict;
use super::product_service;

pub struct OrderService<O, U, C> {
    orders: O,
    users: U,
    product_cache: C,
}

impl<O: OrderRepository, U: UserRepository, C: EntityCache> OrderService<O, U, C> {
    pub fn new(orders: O, users: U, product_cache: C) -> Self {
        Self {
            orders,
            users,
            product_cache,
        }
    }

    /// The order-creation workflow: validate the user, fold duplicate product
    /// ids into aggregated lines, then hand the whole batch to the repository
    /// which validates products and stock inside one transaction. On success
    /// the cached entries of the decremented products are evicted and the
    /// persisted order is read back in full.
    pub fn create(&self, user_id: Uuid, product_ids: &[Uuid]) -> Result<OrderView, DomainError> {
        if self.users.find_by_id(user_id)?.is_none() {
            return Err(DomainError::not_found("user", user_id));
        }
        if product_ids.is_empty() {
            return Err(DomainError::InvalidInput(
                "order must reference at least one product".to_string(),
            ));
        }

        let lines = aggregate_lines(product_ids);
        let order_id = self.orders.create_with_lines(user_id, &lines)?;

        for line in &lines {
            cache_evict(&self.product_cache, &product_service::cache_key(line.product_id));
        }

        self.orders
            .find_by_id(order_id)?
            .ok_or_else(|| DomainError::Internal("created order not readable".to_string()))
    }

    pub fn get(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        self.orders.find_by_id(id)
    }

    pub fn list(&self, page: Page) -> Result<ListResult<OrderView>, DomainError> {
        self.orders.list(page)
    }

    pub fn update_status(&self, id: Uuid, status: &str)
        -> Result<Option<OrderView>, DomainError> {
        self.orders.update_status(id, status)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        self.orders.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::application::testsupport::{MemoryCache, MemoryUserRepo};
    use crate::domain::order::{OrderLineInput, STATUS_PENDING};
    use crate::domain::ports::EntityCache as _;

    /// Order repository double that records the lines it is asked to persist.
    #[derive(Default)]
    struct RecordingOrderRepo {
        created: Mutex<Vec<(Uuid, Vec<OrderLineInput>)>>,
        orders: Mutex<Vec<OrderView>>,
        fail_with: Mutex<Option<DomainError>>,
    }

    impl OrderRepository for RecordingOrderRepo {
        fn create_with_lines(
            &self,
            user_id: Uuid,
            lines: &[OrderLineInput],
        ) -> Result<Uuid, DomainError> {
            if let Some(err) = self.fail_with.lock().unwrap().take() {
                return Err(err);
            }
            let now = Utc::now();
            let order = OrderView {
                id: Uuid::new_v4(),
                user_id,
                status: STATUS_PENDING.to_string(),
                created_at: now,
                updated_at: now,
                lines: lines
                    .iter()
                    .map(|l| crate::domain::order::OrderLineView {
                        product_id: l.product_id,
                        quantity: l.quantity,
                    })
                    .collect(),
            };
            let id = order.id;
            self.created
                .lock()
                .unwrap()
                .push((user_id, lines.to_vec()));
            self.orders.lock().unwrap().push(order);
            Ok(id)
        }

        fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
            Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
        }

        fn list(&self, _page: Page) -> Result<ListResult<OrderView>, DomainError> {
            let orders = self.orders.lock().unwrap();
            Ok(ListResult {
                items: orders.clone(),
                total: orders.len() as i64,
            })
        }

        fn update_status(&self, id: Uuid, status: &str)
            -> Result<Option<OrderView>, DomainError> {
            let mut orders = self.orders.lock().unwrap();
            let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
                return Ok(None);
            };
            order.status = status.to_string();
            Ok(Some(order.clone()))
        }

        fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
            let mut orders = self.orders.lock().unwrap();
            let before = orders.len();
            orders.retain(|o| o.id != id);
            Ok(orders.len() < before)
        }

        fn count(&self) -> Result<i64, DomainError> {
            Ok(self.orders.lock().unwrap().len() as i64)
        }
    }

    fn service_with_user() -> (
        OrderService<RecordingOrderRepo, MemoryUserRepo, MemoryCache>,
        Uuid,
    ) {
        let (users, user_id) = MemoryUserRepo::with_user("alice", "alice@x.com");
        let svc = OrderService::new(
            RecordingOrderRepo::default(),
            users,
            MemoryCache::default(),
        );
        (svc, user_id)
    }

    #[test]
    fn unknown_user_fails_before_any_repository_call() {
        let (svc, _user_id) = service_with_user();

        let err = svc
            .create(Uuid::new_v4(), &[Uuid::new_v4()])
            .expect_err("unknown user should fail");

        assert!(matches!(err, DomainError::NotFound { entity: "user", .. }));
        assert!(svc.orders.created.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_product_list_is_invalid() {
        let (svc, user_id) = service_with_user();

        let err = svc
            .create(user_id, &[])
            .expect_err("empty order should fail");
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[test]
    fn duplicate_ids_reach_the_repository_aggregated() {
        let (svc, user_id) = service_with_user();
        let widget = Uuid::new_v4();

        let order = svc
            .create(user_id, &[widget, widget])
            .expect("create failed");

        assert_eq!(order.status, STATUS_PENDING);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].quantity, 2);

        let created = svc.orders.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(
            created[0].1,
            vec![OrderLineInput {
                product_id: widget,
                quantity: 2
            }]
        );
    }

    #[test]
    fn successful_create_evicts_cached_products() {
        let (svc, user_id) = service_with_user();
        let widget = Uuid::new_v4();
        let key = crate::application::product_service::cache_key(widget);
        svc.product_cache
            .set(&key, b"{}", Duration::from_secs(60))
            .expect("seed cache failed");

        svc.create(user_id, &[widget]).expect("create failed");

        assert!(!svc.product_cache.contains(&key));
    }

    #[test]
    fn repository_failures_pass_through_unchanged() {
        let (svc, user_id) = service_with_user();
        *svc.orders.fail_with.lock().unwrap() = Some(DomainError::InsufficientStock {
            product: "Widget".to_string(),
        });

        let err = svc
            .create(user_id, &[Uuid::new_v4()])
            .expect_err("repo failure should surface");
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
    }

    #[test]
    fn status_update_and_delete_pass_through() {
        let (svc, user_id) = service_with_user();
        let order = svc.create(user_id, &[Uuid::new_v4()]).expect("create failed");

        let shipped = svc
            .update_status(order.id, "shipped")
            .expect("update failed")
            .expect("order should exist");
        assert_eq!(shipped.status, "shipped");

        assert!(svc.delete(order.id).expect("delete failed"));
        assert!(svc.get(order.id).expect("get failed").is_none());
    }
}
