//! Stockroom Core - Domain types and order rules.
//!
//! This crate is shared by the API server, the CLI, and the integration tests:
//! - `api` - JSON REST server over `PostgreSQL`
//! - `cli` - Migrations and demo data
//!
//! # Architecture
//!
//! The core crate contains only types, traits, and pure logic - no database
//! access and no HTTP. Storage is reached through the [`assignment::OrderLedger`]
//! trait, which the API crate implements for `PostgreSQL`.
//!
//! # Modules
//!
//! - [`types`] - Typed ids and the store/product/item/order entities
//! - [`aggregate`] - Folds flat order/item join rows into nested orders
//! - [`assignment`] - Moves an item in and out of an order, keeping the total

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregate;
pub mod assignment;
pub mod types;

pub use types::*;
