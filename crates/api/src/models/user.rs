//! User view model.

use bramble_core::{Email, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A user as exposed by the API. The password hash never leaves the
/// repository layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
