//! Read-side normalization of loosely-shaped catalog documents.
//!
//! Stored documents accumulated shape drift over time: images as bare URL
//! strings or as objects, prices as numbers or numeric strings, flags
//! missing entirely. Normalization converts any of those (including a
//! missing document) into a fully-defaulted view object, and tags which
//! fields had to be defaulted so malformed input is visible in logs rather
//! than silently absorbed.
//!
//! Normalization is total: it never errors.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::{Category, CategoryImage, Product, ProductImage};

/// A normalized view plus the names of the fields that were defaulted.
#[derive(Debug, Clone)]
pub struct Normalized<T> {
    pub value: T,
    pub defaulted: Vec<&'static str>,
}

impl<T> Normalized<T> {
    /// Whether any field had to be defaulted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty()
    }
}

/// Normalize a product document into a fully-populated [`Product`].
///
/// Defaulting rules: missing strings become `""`, missing numerics become 0,
/// `isActive` is `true` unless explicitly `false`, `isFeatured` and
/// `isBestSeller` are `false`, missing arrays are empty. Identity and audit
/// timestamps come from the surrounding row, not the document, and are left
/// at their defaults here.
#[must_use]
pub fn normalize_product(doc: Option<&Value>) -> Normalized<Product> {
    let mut defaulted = Vec::new();
    let doc = match doc {
        Some(v @ Value::Object(_)) => v,
        _ => {
            defaulted.push("document");
            &Value::Null
        }
    };

    let product = Product {
        name: string_field(doc, "name", &mut defaulted),
        slug: string_field(doc, "slug", &mut defaulted),
        description: string_field(doc, "description", &mut defaulted),
        short_description: string_field(doc, "shortDescription", &mut defaulted),
        price: decimal_field(doc, "price", &mut defaulted),
        compare_at_price: decimal_field(doc, "compareAtPrice", &mut defaulted),
        cost_price: decimal_field(doc, "costPrice", &mut defaulted),
        stock: int_field(doc, "stock", &mut defaulted),
        sku: string_field(doc, "sku", &mut defaulted),
        barcode: string_field(doc, "barcode", &mut defaulted),
        weight: decimal_field(doc, "weight", &mut defaulted),
        category_id: doc
            .get("categoryId")
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())
            .map(Into::into),
        tags: string_array_field(doc, "tags", &mut defaulted),
        is_active: bool_field(doc, "isActive", true, &mut defaulted),
        is_featured: bool_field(doc, "isFeatured", false, &mut defaulted),
        is_best_seller: bool_field(doc, "isBestSeller", false, &mut defaulted),
        images: images_field(doc, &mut defaulted),
        ..Product::default()
    };

    Normalized {
        value: product,
        defaulted,
    }
}

/// Normalize a category document into a fully-populated [`Category`].
#[must_use]
pub fn normalize_category(doc: Option<&Value>) -> Normalized<Category> {
    let mut defaulted = Vec::new();
    let doc = match doc {
        Some(v @ Value::Object(_)) => v,
        _ => {
            defaulted.push("document");
            &Value::Null
        }
    };

    let category = Category {
        name: string_field(doc, "name", &mut defaulted),
        slug: string_field(doc, "slug", &mut defaulted),
        description: string_field(doc, "description", &mut defaulted),
        image: category_image_field(doc),
        parent_id: doc
            .get("parentId")
            .and_then(Value::as_i64)
            .and_then(|id| i32::try_from(id).ok())
            .map(Into::into),
        is_active: bool_field(doc, "isActive", true, &mut defaulted),
        ..Category::default()
    };

    Normalized {
        value: category,
        defaulted,
    }
}

/// Derive a URL-safe slug from a display name.
///
/// Lowercases, maps runs of non-alphanumeric characters to single hyphens,
/// and trims leading/trailing hyphens.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_hyphen = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

fn string_field(doc: &Value, key: &'static str, defaulted: &mut Vec<&'static str>) -> String {
    match doc.get(key).and_then(Value::as_str) {
        Some(s) => s.to_owned(),
        None => {
            defaulted.push(key);
            String::new()
        }
    }
}

/// Parse a decimal that may be stored as a JSON number or a numeric string.
fn decimal_field(doc: &Value, key: &'static str, defaulted: &mut Vec<&'static str>) -> Decimal {
    let parsed = match doc.get(key) {
        Some(Value::Number(n)) => n.to_string().parse::<Decimal>().ok(),
        Some(Value::String(s)) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        defaulted.push(key);
        Decimal::ZERO
    })
}

fn int_field(doc: &Value, key: &'static str, defaulted: &mut Vec<&'static str>) -> i64 {
    let parsed = match doc.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.unwrap_or_else(|| {
        defaulted.push(key);
        0
    })
}

fn bool_field(
    doc: &Value,
    key: &'static str,
    default: bool,
    defaulted: &mut Vec<&'static str>,
) -> bool {
    match doc.get(key).and_then(Value::as_bool) {
        Some(b) => b,
        None => {
            defaulted.push(key);
            default
        }
    }
}

fn string_array_field(
    doc: &Value,
    key: &'static str,
    defaulted: &mut Vec<&'static str>,
) -> Vec<String> {
    match doc.get(key).and_then(Value::as_array) {
        Some(arr) => arr
            .iter()
            .filter_map(Value::as_str)
            .map(ToOwned::to_owned)
            .collect(),
        None => {
            defaulted.push(key);
            Vec::new()
        }
    }
}

/// Normalize the image list. Each element may be a legacy bare URL string or
/// an object with `url`/`altText`/`isPrimary`; anything else is skipped.
fn images_field(doc: &Value, defaulted: &mut Vec<&'static str>) -> Vec<ProductImage> {
    let Some(arr) = doc.get("images").and_then(Value::as_array) else {
        defaulted.push("images");
        return Vec::new();
    };

    arr.iter()
        .filter_map(|entry| match entry {
            Value::String(url) => Some(ProductImage {
                url: url.clone(),
                alt_text: String::new(),
                is_primary: false,
            }),
            Value::Object(obj) => Some(ProductImage {
                url: obj.get("url").and_then(Value::as_str).unwrap_or("").to_owned(),
                alt_text: obj
                    .get("altText")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_owned(),
                is_primary: obj
                    .get("isPrimary")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            }),
            _ => None,
        })
        .collect()
}

/// Category image: legacy string or object, normalized to an object; absent
/// stays absent.
fn category_image_field(doc: &Value) -> Option<CategoryImage> {
    match doc.get("image") {
        Some(Value::String(url)) => Some(CategoryImage {
            url: url.clone(),
            alt_text: String::new(),
        }),
        Some(Value::Object(obj)) => Some(CategoryImage {
            url: obj.get("url").and_then(Value::as_str).unwrap_or("").to_owned(),
            alt_text: obj
                .get("altText")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_owned(),
        }),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_null_document_fully_defaults() {
        let n = normalize_product(None);
        assert!(n.defaulted.contains(&"document"));
        assert_eq!(n.value.name, "");
        assert_eq!(n.value.price, Decimal::ZERO);
        assert_eq!(n.value.stock, 0);
        assert!(n.value.is_active);
        assert!(!n.value.is_featured);
        assert!(!n.value.is_best_seller);
        assert!(n.value.tags.is_empty());
        assert!(n.value.images.is_empty());
    }

    #[test]
    fn test_is_active_only_false_when_explicit() {
        let n = normalize_product(Some(&json!({"isActive": false})));
        assert!(!n.value.is_active);

        let n = normalize_product(Some(&json!({"name": "x"})));
        assert!(n.value.is_active);
        assert!(n.defaulted.contains(&"isActive"));
    }

    #[test]
    fn test_clean_document_reports_no_defaults() {
        let doc = json!({
            "name": "Enamel Mug", "slug": "enamel-mug", "description": "d",
            "shortDescription": "s", "price": 12.5, "compareAtPrice": 15,
            "costPrice": 7, "stock": 40, "sku": "MUG-1", "barcode": "123",
            "weight": 0.3, "tags": ["kitchen"], "isActive": true,
            "isFeatured": false, "isBestSeller": false,
            "images": [{"url": "a.jpg", "altText": "mug", "isPrimary": true}]
        });
        let n = normalize_product(Some(&doc));
        assert!(n.is_clean(), "unexpected defaults: {:?}", n.defaulted);
        assert_eq!(n.value.price, Decimal::new(125, 1));
    }

    #[test]
    fn test_legacy_string_images_lifted_to_objects() {
        let n = normalize_product(Some(&json!({"images": ["a.jpg", {"url": "b.jpg", "isPrimary": true}]})));
        assert_eq!(n.value.images.len(), 2);
        assert_eq!(n.value.images[0].url, "a.jpg");
        assert!(!n.value.images[0].is_primary);
        assert_eq!(n.value.primary_image().unwrap().url, "b.jpg");
    }

    #[test]
    fn test_price_accepts_numeric_string() {
        let n = normalize_product(Some(&json!({"price": "19.99"})));
        assert_eq!(n.value.price, Decimal::new(1999, 2));
        assert!(!n.defaulted.contains(&"price"));
    }

    #[test]
    fn test_garbage_price_defaults_to_zero() {
        let n = normalize_product(Some(&json!({"price": "not a number"})));
        assert_eq!(n.value.price, Decimal::ZERO);
        assert!(n.defaulted.contains(&"price"));
    }

    #[test]
    fn test_non_object_document_defaults() {
        let n = normalize_product(Some(&json!("oops")));
        assert!(n.defaulted.contains(&"document"));
        assert_eq!(n.value.name, "");
    }

    #[test]
    fn test_category_string_image_normalized() {
        let n = normalize_category(Some(&json!({"name": "Kitchen", "image": "cat.jpg"})));
        let image = n.value.image.unwrap();
        assert_eq!(image.url, "cat.jpg");
        assert_eq!(image.alt_text, "");
    }

    #[test]
    fn test_category_missing_image_stays_absent() {
        let n = normalize_category(Some(&json!({"name": "Kitchen"})));
        assert!(n.value.image.is_none());
    }

    #[test]
    fn test_category_defaults() {
        let n = normalize_category(None);
        assert!(n.value.is_active);
        assert_eq!(n.value.name, "");
        assert!(n.value.parent_id.is_none());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Enamel Mug"), "enamel-mug");
        assert_eq!(slugify("  Fancy -- Soap!  "), "fancy-soap");
        assert_eq!(slugify("Émigré"), "migr");
        assert_eq!(slugify(""), "");
    }
}
