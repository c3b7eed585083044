//! Bramble Goods API library.
//!
//! Serves the storefront and admin JSON API: catalog reads (normalized
//! product/category documents, cached categories), auth, orders, and the
//! homepage slider. Exposed as a library so routes and services can be
//! tested without a running binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
