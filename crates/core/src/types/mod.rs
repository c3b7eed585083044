//! Core types for Bramble Goods.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod envelope;
pub mod id;
pub mod page;
pub mod status;

pub use email::{Email, EmailError};
pub use envelope::Envelope;
pub use id::*;
pub use page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page};
pub use status::*;
