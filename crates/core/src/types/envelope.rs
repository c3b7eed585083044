//! The JSON response envelope used by every API endpoint.

use serde::{Deserialize, Serialize};

/// Uniform wrapper for API responses: `{success, data?, error?, message?}`.
///
/// Successful responses carry `data` (and occasionally a human-readable
/// `message`); failures carry `error`. Absent fields are omitted from the
/// serialized JSON entirely rather than sent as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful response carrying `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    /// A successful response carrying `data` and a message.
    #[must_use]
    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: Some(message.into()),
        }
    }

    /// A failed response carrying an error string.
    #[must_use]
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

impl Envelope<()> {
    /// A successful response with no payload, only a message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            error: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_omits_error_fields() {
        let env = Envelope::ok(5);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 5}));
    }

    #[test]
    fn test_err_omits_data() {
        let env: Envelope<()> = Envelope::err("nope");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "nope"}));
    }

    #[test]
    fn test_message_only() {
        let env = Envelope::message("deleted");
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "deleted"})
        );
    }
}
