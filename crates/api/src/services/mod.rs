//! Application services: authentication and upload handling.

pub mod auth;
pub mod uploads;
