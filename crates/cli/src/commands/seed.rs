//! Demo data seeding for local development.
//!
//! Idempotent: documents are upserted by slug, so re-running refreshes the
//! demo catalog without duplicating rows.

use serde_json::json;
use sqlx::PgPool;

use super::{CommandError, connect};

/// Seed the database with a small demo catalog and slider.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let bath_id = upsert_category(
        &pool,
        "bath-and-body",
        json!({
            "name": "Bath & Body",
            "description": "Soaps, salts, and scrubs made in small batches",
            "isActive": true
        }),
    )
    .await?;

    let home_id = upsert_category(
        &pool,
        "home",
        json!({
            "name": "Home",
            "description": "Candles and home goods",
            "isActive": true
        }),
    )
    .await?;

    let products = [
        (
            "lavender-soap",
            json!({
                "name": "Lavender Soap",
                "description": "Cold-process bar soap with French lavender",
                "price": "8.50",
                "stock": 120,
                "sku": "BG-SOAP-LAV",
                "categoryId": bath_id,
                "isActive": true,
                "isFeatured": true,
                "images": [{ "url": "/uploads/demo-lavender.jpg", "altText": "Lavender soap bar", "isPrimary": true }]
            }),
        ),
        (
            "cedar-candle",
            json!({
                "name": "Cedar Candle",
                "description": "Soy wax candle, 40 hour burn",
                "price": "18.00",
                "stock": 45,
                "sku": "BG-CNDL-CED",
                "categoryId": home_id,
                "isActive": true,
                "isBestSeller": true,
                "images": [{ "url": "/uploads/demo-cedar.jpg", "altText": "Cedar candle", "isPrimary": true }]
            }),
        ),
        (
            "oat-milk-bath",
            json!({
                "name": "Oat Milk Bath",
                "description": "Colloidal oat soak for sensitive skin",
                "price": "14.25",
                "stock": 0,
                "sku": "BG-BATH-OAT",
                "categoryId": bath_id,
                "isActive": true
            }),
        ),
    ];

    for (slug, doc) in products {
        sqlx::query(
            "INSERT INTO products (slug, doc) VALUES ($1, $2) \
             ON CONFLICT (slug) DO UPDATE SET doc = EXCLUDED.doc, updated_at = NOW()",
        )
        .bind(slug)
        .bind(&doc)
        .execute(&pool)
        .await?;
    }

    sqlx::query(
        "INSERT INTO slides (title, subtitle, image, link, position, is_active) \
         SELECT $1, $2, $3, $4, $5, TRUE \
         WHERE NOT EXISTS (SELECT 1 FROM slides WHERE title = $1)",
    )
    .bind("Small batch, big care")
    .bind("New bath & body arrivals")
    .bind("/uploads/demo-hero.jpg")
    .bind("/products?category=bath-and-body")
    .bind(0)
    .execute(&pool)
    .await?;

    tracing::info!("Seed complete!");
    Ok(())
}

async fn upsert_category(
    pool: &PgPool,
    slug: &str,
    doc: serde_json::Value,
) -> Result<i32, CommandError> {
    let id: i32 = sqlx::query_scalar(
        "INSERT INTO categories (slug, doc) VALUES ($1, $2) \
         ON CONFLICT (slug) DO UPDATE SET doc = EXCLUDED.doc, updated_at = NOW() \
         RETURNING id",
    )
    .bind(slug)
    .bind(&doc)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
