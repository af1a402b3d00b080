//! Core types for Vitrina.
//!
//! This module provides type-safe wrappers for the cart's domain concepts.

pub mod id;
pub mod money;
pub mod product;

pub use id::{IdGenerator, ProductId};
pub use money::{CURRENCY_PREFIX, format_price, parse_price, parse_price_opt};
pub use product::{DEFAULT_CATEGORY, Product};
