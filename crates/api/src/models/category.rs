//! Category view model.

use bramble_core::CategoryId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category image, always in object form after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryImage {
    pub url: String,
    #[serde(default)]
    pub alt_text: String,
}

/// Fully-defaulted category view.
///
/// `parent_id` forms a shallow tree. Parent references are not validated for
/// cycles at this level; the admin write path rejects a category naming
/// itself as parent and leaves deeper validation to the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<CategoryImage>,
    pub parent_id: Option<CategoryId>,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: CategoryId::new(0),
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            image: None,
            parent_id: None,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }
}
