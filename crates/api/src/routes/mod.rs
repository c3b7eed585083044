//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /api/health                  - Health check
//!
//! # Auth
//! POST /api/auth/register           - Create account, returns token
//! POST /api/auth/login              - Verify credentials, returns token
//! POST /api/auth/logout             - Invalidate token (auth)
//! GET  /api/auth/me                 - Current user (auth)
//!
//! # Products
//! GET    /api/products              - Paginated product listing
//! GET    /api/products/{id}         - Product by ID
//! GET    /api/products/slug/{slug}  - Product by slug
//! POST   /api/products              - Create product (admin)
//! PUT    /api/products/{id}         - Update product (admin)
//! DELETE /api/products/{id}         - Delete product (admin)
//!
//! # Categories
//! GET    /api/categories            - All categories (cached)
//! GET    /api/categories/{id}       - Category by ID
//! GET    /api/categories/slug/{slug} - Category by slug
//! POST   /api/categories            - Create category (admin)
//! PUT    /api/categories/{id}       - Update category (admin)
//! DELETE /api/categories/{id}       - Delete category (admin)
//!
//! # Orders (auth)
//! POST /api/orders                  - Place an order
//! GET  /api/orders                  - Own order history
//! GET  /api/orders/{id}             - Own order detail
//! PUT  /api/orders/{id}/cancel      - Cancel own pending order
//!
//! # Admin orders (admin)
//! GET    /api/admin/orders          - All orders with filters
//! GET    /api/admin/orders/export   - CSV/JSON export
//! PUT    /api/admin/orders/{id}     - Status transition + metadata
//! DELETE /api/admin/orders/{id}     - Delete order
//!
//! # Slider
//! GET    /api/slider                - Active slides, in position order
//! GET    /api/admin/slider          - All slides (admin)
//! POST   /api/admin/slider          - Create slide (admin)
//! PUT    /api/admin/slider/{id}     - Update slide (admin)
//! DELETE /api/admin/slider/{id}     - Delete slide (admin)
//! ```

pub mod admin_orders;
pub mod auth;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;
pub mod slider;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/slug/{slug}", get(products::show_by_slug))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route("/slug/{slug}", get(categories::show_by_slug))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::remove),
        )
}

/// Create the customer order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", put(orders::cancel))
}

/// Create the admin order routes router.
pub fn admin_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_orders::list))
        .route("/export", get(admin_orders::export))
        .route(
            "/{id}",
            put(admin_orders::update).delete(admin_orders::remove),
        )
}

/// Create the slider routes router.
pub fn admin_slide_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(slider::list_all).post(slider::create))
        .route("/{id}", put(slider::update).delete(slider::remove))
}

/// Create all API routes, nested under `/api` by the caller.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/orders", order_routes())
        .nest("/admin/orders", admin_order_routes())
        .route("/slider", get(slider::list_active))
        .nest("/admin/slider", admin_slide_routes())
}
