//! Customer order endpoints. All handlers are owner-scoped.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use bramble_core::{Envelope, OrderId, Page};

use crate::db::{NewOrder, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Order, OrderItem, ShippingAddress};
use crate::state::AppState;

/// Flat shipping fee charged per order.
const SHIPPING_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2); // 5.00

/// Tax rate applied to the subtotal.
const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2); // 0.08

/// Subtotal threshold above which shipping is free.
const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(5000, 0, 0, false, 2); // 50.00

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<CartLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: bramble_core::ProductId,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Place an order from a cart payload.
///
/// Line names and prices are snapshotted from the catalog at order time;
/// totals are computed server-side so the client cannot set its own prices.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<Envelope<Order>>> {
    if req.items.is_empty() {
        return Err(AppError::BadRequest("Order has no items".to_owned()));
    }

    let mut items = Vec::with_capacity(req.items.len());
    for line in &req.items {
        if line.quantity == 0 {
            return Err(AppError::BadRequest("Item quantity must be at least 1".to_owned()));
        }
        let product = state.catalog().get_product(line.product_id).await?;
        if !product.is_active {
            return Err(AppError::BadRequest(format!(
                "Product is not available: {}",
                product.name
            )));
        }
        items.push(OrderItem {
            product_id: product.id,
            name: product.name,
            quantity: line.quantity,
            price: product.price,
        });
    }

    let subtotal: Decimal = items.iter().map(OrderItem::line_total).sum();
    let shipping_fee = if subtotal >= FREE_SHIPPING_THRESHOLD {
        Decimal::ZERO
    } else {
        SHIPPING_FEE
    };
    let tax = (subtotal * TAX_RATE).round_dp(2);
    let total = subtotal + shipping_fee + tax;

    let order = OrderRepository::new(state.pool())
        .create(&NewOrder {
            user_id: user.id,
            items,
            shipping_address: req.shipping_address,
            payment_method: req.payment_method,
            subtotal,
            shipping_fee,
            tax,
            total,
        })
        .await?;

    tracing::info!(order = %order.order_number, user_id = %user.id, "order placed");
    Ok(Json(Envelope::ok(order)))
}

/// The authenticated user's order history, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Page<Order>>>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(bramble_core::page::DEFAULT_PAGE_SIZE)
        .clamp(1, bramble_core::page::MAX_PAGE_SIZE);

    let (orders, total) = OrderRepository::new(state.pool())
        .list_for_user(user.id, page, limit)
        .await?;
    Ok(Json(Envelope::ok(Page::new(orders, total, page, limit))))
}

/// A single order, if it belongs to the authenticated user.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Envelope<Order>>> {
    let order = OrderRepository::new(state.pool())
        .get_for_user(id, user.id)
        .await?;
    Ok(Json(Envelope::ok(order)))
}

/// Cancel an order. Customers may only cancel while the order is pending;
/// after that, cancellation goes through support.
pub async fn cancel(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Envelope<Order>>> {
    let repo = OrderRepository::new(state.pool());
    let order = repo.get_for_user(id, user.id).await?;

    if !order.status.customer_can_cancel() {
        return Err(AppError::BadRequest(format!(
            "Order can no longer be cancelled (status: {})",
            order.status
        )));
    }

    let cancelled = repo
        .update_status(id, bramble_core::OrderStatus::Cancelled)
        .await?;
    tracing::info!(order = %cancelled.order_number, "order cancelled by customer");
    Ok(Json(Envelope::ok(cancelled)))
}
