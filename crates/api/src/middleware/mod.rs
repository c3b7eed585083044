//! Request middleware: bearer-token auth extractors and CORS enforcement.

pub mod auth;
pub mod cors;

pub use auth::{RequireAdmin, RequireUser};
pub use cors::{cors_layer, enforce_origin};
