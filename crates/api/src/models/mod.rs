//! View models returned by the API.
//!
//! These are the fully-defaulted shapes produced by the catalog
//! normalization layer and by the relational repositories. They are
//! read-only copies: nothing here feeds back into storage directly.

pub mod category;
pub mod order;
pub mod product;
pub mod slide;
pub mod user;

pub use category::{Category, CategoryImage};
pub use order::{Order, OrderItem, ShippingAddress};
pub use product::{Product, ProductImage};
pub use slide::Slide;
pub use user::User;
