//! Vitrina storefront library.
//!
//! Discovers product cards on a page, keeps the shopping cart in sync with
//! storage and renders the cart widget (badge, modal and toast). The page
//! is modelled by [`dom::Document`] so the whole flow runs and tests without
//! a browser.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod events;
pub mod storage;
pub mod telemetry;
pub mod widget;

pub use catalog::{Catalog, ScanReport};
pub use config::{ConfigError, StorefrontConfig};
pub use controller::{Notice, Storefront};
pub use dom::{Document, DomError, Element, NodeId};
pub use error::{AppError, Result};
pub use events::{Action, Handler};
pub use storage::FileStorage;
pub use widget::{CartItemView, CartView, CartWidget};
