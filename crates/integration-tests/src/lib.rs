//! Integration tests for the Bramble Goods API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! bramble-cli migrate && bramble-cli seed
//!
//! # Start the API server
//! cargo run -p bramble-api
//!
//! # Run integration tests
//! cargo test -p bramble-integration-tests -- --ignored
//! ```
//!
//! Tests are `#[ignore]`d by default because they need a running server.

use reqwest::Client;
use serde_json::Value;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("BRAMBLE_API_URL").unwrap_or_else(|_| "http://localhost:4000".to_string())
}

/// Shared test context: HTTP client plus base URL.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Create a context with a plain (unauthenticated) client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: api_base_url(),
        }
    }

    /// Register a throwaway user and return its bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the server is unreachable or the response shape is wrong;
    /// these tests assume a healthy local stack.
    pub async fn register_user(&self, email: &str, password: &str) -> String {
        let resp = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&serde_json::json!({
                "name": "Test User",
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("register request failed");

        let body: Value = resp.json().await.expect("register response not JSON");
        assert_eq!(body["success"], true, "register failed: {body}");
        body["data"]["token"]
            .as_str()
            .expect("register response missing token")
            .to_owned()
    }

    /// GET a path and parse the JSON envelope.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn get_json(&self, path: &str) -> Value {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .expect("request failed")
            .json()
            .await
            .expect("response not JSON")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A unique email for this test run.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{prefix}+{nanos}@test.bramblegoods.shop")
}
