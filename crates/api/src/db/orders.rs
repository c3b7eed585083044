//! Order repository.
//!
//! Orders are relational rows with JSONB snapshots for line items and the
//! shipping address. Status columns are stored as text and parsed into the
//! core enums on read; unknown values are surfaced as data corruption
//! rather than silently defaulted, since money is involved.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};

use bramble_core::{OrderId, OrderStatus, PaymentStatus, UserId};

use crate::models::{Order, OrderItem, ShippingAddress};

use super::RepositoryError;

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    order_number: String,
    user_id: i32,
    items: JsonValue,
    shipping_address: JsonValue,
    payment_method: String,
    payment_status: String,
    status: String,
    subtotal: Decimal,
    shipping_fee: Decimal,
    tax: Decimal,
    total: Decimal,
    tracking_number: Option<String>,
    admin_note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    delivered_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let items: Vec<OrderItem> = serde_json::from_value(row.items)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid order items: {e}")))?;
        let shipping_address: ShippingAddress = serde_json::from_value(row.shipping_address)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid shipping address: {e}"))
            })?;
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;
        let payment_status: PaymentStatus = row
            .payment_status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            user_id: UserId::new(row.user_id),
            items,
            shipping_address,
            payment_method: row.payment_method,
            payment_status,
            status,
            subtotal: row.subtotal,
            shipping_fee: row.shipping_fee,
            tax: row.tax,
            total: row.total,
            tracking_number: row.tracking_number,
            admin_note: row.admin_note,
            created_at: row.created_at,
            updated_at: row.updated_at,
            delivered_at: row.delivered_at,
            cancelled_at: row.cancelled_at,
        })
    }
}

/// Fields for inserting a new order. Totals are computed by the caller.
#[derive(Debug)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Admin list filters.
#[derive(Debug, Default)]
pub struct OrderListFilter {
    pub status: Option<OrderStatus>,
    /// Matches against the order number.
    pub search: Option<String>,
}

/// Optional admin metadata updates; `None` leaves a column untouched.
#[derive(Debug, Default)]
pub struct AdminOrderPatch {
    pub payment_status: Option<PaymentStatus>,
    pub tracking_number: Option<String>,
    pub admin_note: Option<String>,
}

impl AdminOrderPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.payment_status.is_none()
            && self.tracking_number.is_none()
            && self.admin_note.is_none()
    }
}

const SELECT_COLUMNS: &str = "SELECT id, order_number, user_id, items, shipping_address, \
     payment_method, payment_status, status, subtotal, shipping_fee, tax, total, \
     tracking_number, admin_note, created_at, updated_at, delivered_at, cancelled_at \
     FROM orders";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new order. The order number is generated in SQL from a
    /// sequence (`BG-000123`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let items = serde_json::to_value(&new.items)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
        let address = serde_json::to_value(&new.shipping_address)
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (order_number, user_id, items, shipping_address, \
                 payment_method, payment_status, status, subtotal, shipping_fee, tax, total) \
             VALUES ('BG-' || LPAD(nextval('order_number_seq')::text, 6, '0'), \
                 $1, $2, $3, $4, 'pending', 'pending', $5, $6, $7, $8) \
             RETURNING id, order_number, user_id, items, shipping_address, payment_method, \
                 payment_status, status, subtotal, shipping_fee, tax, total, tracking_number, \
                 admin_note, created_at, updated_at, delivered_at, cancelled_at",
        )
        .bind(new.user_id.as_i32())
        .bind(items)
        .bind(address)
        .bind(&new.payment_method)
        .bind(new.subtotal)
        .bind(new.shipping_fee)
        .bind(new.tax)
        .bind(new.total)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_sqlx)?;

        row.try_into()
    }

    /// Get any order by ID (admin paths).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?
            .try_into()
    }

    /// Get an order by ID, scoped to its owner. Another user's order reads
    /// as not found rather than forbidden, so order IDs are not probeable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_COLUMNS} WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }

    /// List a user's own orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, u64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id.as_i32())
            .fetch_one(self.pool)
            .await?;
        let total = u64::try_from(total).unwrap_or(0);

        let page = page.max(1).min(bramble_core::page::total_pages(total, limit));
        let offset = i64::from(page - 1) * i64::from(limit);

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_COLUMNS} WHERE user_id = $1 ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_id.as_i32())
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((orders, total))
    }

    /// Admin list across all users with optional status/search filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_admin(
        &self,
        filter: &OrderListFilter,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, u64), RepositoryError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_filter(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;
        let total = u64::try_from(total).unwrap_or(0);

        let page = page.max(1).min(bramble_core::page::total_pages(total, limit));
        let offset = i64::from(page - 1) * i64::from(limit);

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build_query_as::<OrderRow>().fetch_all(self.pool).await?;
        let orders = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((orders, total))
    }

    /// Every order matching the filter, newest first, for export.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_export(
        &self,
        filter: &OrderListFilter,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC");

        let rows = qb.build_query_as::<OrderRow>().fetch_all(self.pool).await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Set the order status, stamping `delivered_at`/`cancelled_at` when a
    /// terminal state is entered. Transition validation happens in the
    /// handler, where the actor (customer vs admin) is known.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET status = $2, updated_at = NOW(), \
                 delivered_at = CASE WHEN $2 = 'delivered' THEN NOW() ELSE delivered_at END, \
                 cancelled_at = CASE WHEN $2 = 'cancelled' THEN NOW() ELSE cancelled_at END \
             WHERE id = $1 \
             RETURNING id, order_number, user_id, items, shipping_address, payment_method, \
                 payment_status, status, subtotal, shipping_fee, tax, total, tracking_number, \
                 admin_note, created_at, updated_at, delivered_at, cancelled_at",
        )
        .bind(id.as_i32())
        .bind(status.to_string())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Apply admin metadata updates (payment status, tracking, note).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn apply_patch(
        &self,
        id: OrderId,
        patch: &AdminOrderPatch,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "UPDATE orders SET \
                 payment_status = COALESCE($2, payment_status), \
                 tracking_number = COALESCE($3, tracking_number), \
                 admin_note = COALESCE($4, admin_note), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, order_number, user_id, items, shipping_address, payment_method, \
                 payment_status, status, subtotal, shipping_fee, tax, total, tracking_number, \
                 admin_note, created_at, updated_at, delivered_at, cancelled_at",
        )
        .bind(id.as_i32())
        .bind(patch.payment_status.map(|s| s.to_string()))
        .bind(patch.tracking_number.as_deref())
        .bind(patch.admin_note.as_deref())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Delete an order (admin only).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matches.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &OrderListFilter) {
    qb.push(" WHERE 1=1");
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let escaped = format!(
            "%{}%",
            search.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
        );
        qb.push(" AND order_number ILIKE ").push_bind(escaped);
    }
}
