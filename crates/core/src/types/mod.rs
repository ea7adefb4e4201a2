//! Core types for Stockroom.
//!
//! This module provides type-safe ids and the four resource entities.

pub mod entity;
pub mod id;

pub use entity::{Item, Order, OrderItem, Product, Store};
pub use id::*;
