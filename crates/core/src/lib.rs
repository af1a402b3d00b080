//! Vitrina Core - Cart state model.
//!
//! This crate provides the types shared by the page-side controller:
//! - [`types`] - Product ids, prices and the product entity
//! - [`cart`] - The quantity-aggregating cart store and its persistence codec
//! - [`storage`] - The client-local key/value storage abstraction
//!
//! # Architecture
//!
//! The core crate contains no filesystem or network I/O. The cart store
//! persists itself through the [`storage::Storage`] trait; durable backends
//! live in `vitrina-storefront`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod storage;
pub mod types;

pub use cart::{CartStore, STORAGE_KEY};
pub use storage::{MemoryStorage, Storage, StorageError};
pub use types::*;
