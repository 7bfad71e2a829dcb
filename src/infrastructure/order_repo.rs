use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderLineInput, OrderLineView, OrderView, STATUS_PENDING};
use crate::domain::page::{ListResult, Page};
use crate::domain::ports::OrderRepository;
use crate::schema::{order_products, orders, products};

use super::models::{NewOrderProductRow, NewOrderRow, OrderProductRow, OrderRow};

fn to_view(order: OrderRow, lines: Vec<OrderProductRow>) -> OrderView {
    OrderView {
        id: order.id,
        user_id: order.user_id,
        status: order.status,
        created_at: order.created_at,
        updated_at: order.updated_at,
        lines: lines
            .into_iter()
            .map(|l| OrderLineView {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect(),
    }
}

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create_with_lines(
        &self,
        user_id: Uuid,
        lines: &[OrderLineInput],
    ) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Batch-resolve the requested products so every missing id is
            //    reported at once, not just the first.
            let requested: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
            let found: Vec<(Uuid, String)> = products::table
                .filter(products::id.eq_any(&requested))
                .select((products::id, products::name))
                .load(conn)?;

            if found.len() != requested.len() {
                let missing: Vec<String> = requested
                    .iter()
                    .filter(|id| !found.iter().any(|(fid, _)| fid == *id))
                    .map(ToString::to_string)
                    .collect();
                return Err(DomainError::not_found("product", missing.join(", ")));
            }

            // 2. Decrement stock with a conditional update per line. The
            //    quantity guard in the WHERE clause makes check-and-decrement
            //    atomic, so concurrent orders cannot drive stock negative.
            //    A failed guard rolls back any decrements already applied.
            for line in lines {
                let updated = diesel::update(
                    products::table.filter(
                        products::id
                            .eq(line.product_id)
                            .and(products::stock_quantity.ge(line.quantity)),
                    ),
                )
                .set((
                    products::stock_quantity.eq(products::stock_quantity - line.quantity),
                    products::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;

                if updated == 0 {
                    let name = found
                        .iter()
                        .find(|(id, _)| *id == line.product_id)
                        .map(|(_, name)| name.clone())
                        .unwrap_or_else(|| line.product_id.to_string());
                    return Err(DomainError::InsufficientStock { product: name });
                }
            }

            // 3. Insert the order and one association row per aggregated line.
            let order_id = Uuid::new_v4();
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order_id,
                    user_id,
                    status: STATUS_PENDING.to_string(),
                })
                .execute(conn)?;

            let new_lines: Vec<NewOrderProductRow> = lines
                .iter()
                .map(|l| NewOrderProductRow {
                    order_id,
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect();
            diesel::insert_into(order_products::table)
                .values(&new_lines)
                .execute(conn)?;

            Ok(order_id)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = order_products::table
            .filter(order_products::order_id.eq(order.id))
            .select(OrderProductRow::as_select())
            .load(&mut conn)?;

        Ok(Some(to_view(order, lines)))
    }

    fn list(&self, page: Page) -> Result<ListResult<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = orders::table.count().get_result(conn)?;

            let rows = orders::table
                .select(OrderRow::as_select())
                .order((orders::created_at.desc(), orders::id.asc()))
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;

            let lines: Vec<OrderProductRow> = OrderProductRow::belonging_to(&rows)
                .select(OrderProductRow::as_select())
                .load(conn)?;
            let grouped = lines.grouped_by(&rows);

            Ok(ListResult {
                items: rows
                    .into_iter()
                    .zip(grouped)
                    .map(|(order, lines)| to_view(order, lines))
                    .collect(),
                total,
            })
        })
    }

    fn update_status(&self, id: Uuid, status: &str) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(orders::table.find(id))
            .set((
                orders::status.eq(status),
                orders::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Ok(None);
        }
        self.find_by_id(id)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        // Association rows go with the order via ON DELETE CASCADE.
        let deleted = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }

    fn count(&self) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;
        Ok(orders::table.count().get_result(&mut conn)?)
    }
}
