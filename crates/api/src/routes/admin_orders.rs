//! Admin order endpoints: listing, status management, export.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use bramble_core::{Envelope, OrderId, OrderStatus, Page, PaymentStatus};

use crate::db::{AdminOrderPatch, OrderListFilter, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Order;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub tracking_number: Option<String>,
    pub admin_note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

fn parse_status(raw: &str) -> Result<OrderStatus> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown order status: {raw}")))
}

fn filter_from(status: Option<&str>, search: Option<&str>) -> Result<OrderListFilter> {
    Ok(OrderListFilter {
        status: status.map(parse_status).transpose()?,
        search: search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned),
    })
}

/// All orders, paginated, with optional status filter and order-number
/// search.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Envelope<Page<Order>>>> {
    let filter = filter_from(params.status.as_deref(), params.search.as_deref())?;
    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(bramble_core::page::DEFAULT_PAGE_SIZE)
        .clamp(1, bramble_core::page::MAX_PAGE_SIZE);

    let (orders, total) = OrderRepository::new(state.pool())
        .list_admin(&filter, page, limit)
        .await?;
    Ok(Json(Envelope::ok(Page::new(orders, total, page, limit))))
}

/// Update an order: optional guarded status transition plus metadata.
///
/// Status changes are validated against the allowed-transition table;
/// skipping ahead, moving backwards, or leaving a terminal state is a 400.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(req): Json<AdminUpdateRequest>,
) -> Result<Json<Envelope<Order>>> {
    let repo = OrderRepository::new(state.pool());
    let mut order = repo.get(id).await?;

    if let Some(raw) = req.status.as_deref() {
        let next = parse_status(raw)?;
        if !order.status.can_transition_to(next) {
            return Err(AppError::BadRequest(format!(
                "Cannot transition order from {} to {next}",
                order.status
            )));
        }
        order = repo.update_status(id, next).await?;
        tracing::info!(order = %order.order_number, status = %next, "order status updated");
    }

    let patch = AdminOrderPatch {
        payment_status: req
            .payment_status
            .as_deref()
            .map(|raw| {
                raw.parse::<PaymentStatus>()
                    .map_err(|_| AppError::BadRequest(format!("Unknown payment status: {raw}")))
            })
            .transpose()?,
        tracking_number: req.tracking_number,
        admin_note: req.admin_note,
    };
    if !patch.is_empty() {
        order = repo.apply_patch(id, &patch).await?;
    }

    Ok(Json(Envelope::ok(order)))
}

/// Delete an order.
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<OrderId>,
) -> Result<Json<Envelope<()>>> {
    OrderRepository::new(state.pool()).delete(id).await?;
    Ok(Json(Envelope::message("Order deleted")))
}

/// Export orders as CSV (default) or JSON, for spreadsheets and
/// bookkeeping.
pub async fn export(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ExportParams>,
) -> Result<Response> {
    let filter = filter_from(params.status.as_deref(), params.search.as_deref())?;
    let orders = OrderRepository::new(state.pool())
        .list_export(&filter)
        .await?;

    let stamp = chrono::Utc::now().format("%Y%m%d");
    match params.format.as_deref() {
        None | Some("csv") => {
            let body = orders_to_csv(&orders);
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"orders-{stamp}.csv\""),
                    ),
                ],
                body,
            )
                .into_response())
        }
        Some("json") => Ok((
            StatusCode::OK,
            [(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"orders-{stamp}.json\""),
            )],
            Json(Envelope::ok(orders)),
        )
            .into_response()),
        Some(other) => Err(AppError::BadRequest(format!(
            "Unknown export format: {other}"
        ))),
    }
}

const CSV_HEADER: &str = "orderNumber,status,paymentStatus,paymentMethod,customer,city,country,\
items,subtotal,shippingFee,tax,total,trackingNumber,createdAt";

/// Render orders as RFC 4180 CSV.
fn orders_to_csv(orders: &[Order]) -> String {
    let mut out = String::with_capacity(orders.len() * 128 + CSV_HEADER.len());
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");

    for order in orders {
        let items = order
            .items
            .iter()
            .map(|i| format!("{} x{}", i.name, i.quantity))
            .collect::<Vec<_>>()
            .join("; ");

        let fields = [
            order.order_number.clone(),
            order.status.to_string(),
            order.payment_status.to_string(),
            order.payment_method.clone(),
            order.shipping_address.full_name.clone(),
            order.shipping_address.city.clone(),
            order.shipping_address.country.clone(),
            items,
            order.subtotal.to_string(),
            order.shipping_fee.to_string(),
            order.tax.to_string(),
            order.total.to_string(),
            order.tracking_number.clone().unwrap_or_default(),
            order.created_at.to_rfc3339(),
        ];

        let row = fields
            .iter()
            .map(|f| csv_escape(f))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&row);
        out.push_str("\r\n");
    }
    out
}

/// Quote a CSV field when it contains a comma, quote, or line break.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    use bramble_core::{ProductId, UserId};
    use crate::models::{OrderItem, ShippingAddress};

    fn sample_order() -> Order {
        Order {
            id: OrderId::new(1),
            order_number: "BG-000042".to_owned(),
            user_id: UserId::new(7),
            items: vec![OrderItem {
                product_id: ProductId::new(3),
                name: "Lavender Soap, Large".to_owned(),
                quantity: 2,
                price: Decimal::new(1250, 2),
            }],
            shipping_address: ShippingAddress {
                full_name: "Jo \"Swift\" Doe".to_owned(),
                phone: String::new(),
                line1: "1 Main St".to_owned(),
                line2: String::new(),
                city: "Portland".to_owned(),
                region: "OR".to_owned(),
                postal_code: "97201".to_owned(),
                country: "US".to_owned(),
            },
            payment_method: "card".to_owned(),
            payment_status: PaymentStatus::Paid,
            status: OrderStatus::Shipped,
            subtotal: Decimal::new(2500, 2),
            shipping_fee: Decimal::new(500, 2),
            tax: Decimal::new(200, 2),
            total: Decimal::new(3200, 2),
            tracking_number: Some("TRK123".to_owned()),
            admin_note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            delivered_at: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_csv_has_header_and_quoted_fields() {
        let csv = orders_to_csv(&[sample_order()]);
        let mut lines = csv.split("\r\n");
        assert_eq!(lines.next().unwrap(), CSV_HEADER);
        let row = lines.next().unwrap();
        assert!(row.starts_with("BG-000042,shipped,paid,card"));
        // item name with a comma is quoted
        assert!(row.contains("\"Lavender Soap, Large x2\""));
        // embedded quotes doubled
        assert!(row.contains("\"Jo \"\"Swift\"\" Doe\""));
    }

    #[test]
    fn test_csv_empty_set_is_header_only() {
        let csv = orders_to_csv(&[]);
        assert_eq!(csv, format!("{CSV_HEADER}\r\n"));
    }

    #[test]
    fn test_filter_rejects_unknown_status() {
        assert!(filter_from(Some("bogus"), None).is_err());
        let filter = filter_from(Some("shipped"), Some("  BG-9 ")).unwrap();
        assert_eq!(filter.status, Some(OrderStatus::Shipped));
        assert_eq!(filter.search.as_deref(), Some("BG-9"));
    }
}
