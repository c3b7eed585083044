//! Homepage slider view model.

use bramble_core::SlideId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A homepage slider entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: SlideId,
    pub title: String,
    pub subtitle: String,
    pub image: String,
    pub link: String,
    pub position: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Slide {
    fn default() -> Self {
        Self {
            id: SlideId::new(0),
            title: String::new(),
            subtitle: String::new(),
            image: String::new(),
            link: String::new(),
            position: 0,
            is_active: true,
            created_at: None,
            updated_at: None,
        }
    }
}
