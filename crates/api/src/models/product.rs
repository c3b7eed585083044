//! Product view model.

use bramble_core::{CategoryId, ProductId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product image, always in object form.
///
/// Legacy documents store images as bare URL strings; normalization lifts
/// those into this shape with an empty alt text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub is_primary: bool,
}

/// Fully-defaulted product view.
///
/// Every field is populated after normalization, so presentation code never
/// encounters missing values. Serialized field names are camelCase to match
/// the wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub short_description: String,
    pub price: Decimal,
    pub compare_at_price: Decimal,
    pub cost_price: Decimal,
    pub stock: i64,
    pub sku: String,
    pub barcode: String,
    pub weight: Decimal,
    pub category_id: Option<CategoryId>,
    pub tags: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub is_best_seller: bool,
    pub images: Vec<ProductImage>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The meaningful primary image: first flagged `is_primary`, else the
    /// first image, else none.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|img| img.is_primary)
            .or_else(|| self.images.first())
    }
}

impl Default for Product {
    fn default() -> Self {
        Self {
            id: ProductId::new(0),
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            short_description: String::new(),
            price: Decimal::ZERO,
            compare_at_price: Decimal::ZERO,
            cost_price: Decimal::ZERO,
            stock: 0,
            sku: String::new(),
            barcode: String::new(),
            weight: Decimal::ZERO,
            category_id: None,
            tags: Vec::new(),
            is_active: true,
            is_featured: false,
            is_best_seller: false,
            images: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_image_prefers_flag() {
        let product = Product {
            images: vec![
                ProductImage {
                    url: "a.jpg".into(),
                    ..ProductImage::default()
                },
                ProductImage {
                    url: "b.jpg".into(),
                    is_primary: true,
                    ..ProductImage::default()
                },
            ],
            ..Product::default()
        };
        assert_eq!(product.primary_image().unwrap().url, "b.jpg");
    }

    #[test]
    fn test_primary_image_falls_back_to_first() {
        let product = Product {
            images: vec![ProductImage {
                url: "a.jpg".into(),
                ..ProductImage::default()
            }],
            ..Product::default()
        };
        assert_eq!(product.primary_image().unwrap().url, "a.jpg");
    }

    #[test]
    fn test_primary_image_empty() {
        assert!(Product::default().primary_image().is_none());
    }
}
