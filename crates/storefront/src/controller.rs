//! Page-lifetime storefront controller.
//!
//! Owns the document, the cart, the discovery registry and the widget for
//! one page load. Every input (click, key press, timer tick) runs to
//! completion against `&mut self`; there is no shared state to lock.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};
use vitrina_core::{CartStore, IdGenerator, Product, ProductId, Storage, format_price};

use crate::catalog::{Catalog, ScanReport};
use crate::config::StorefrontConfig;
use crate::dom::{Document, NodeId};
use crate::error::Result;
use crate::events::Action;
use crate::widget::CartWidget;

/// Blocking message for an empty-cart checkout.
pub const EMPTY_CHECKOUT_MESSAGE: &str = "Tu carrito está vacío";

/// Blocking notification the host should surface (an `alert()` on a real
/// page).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Alert(String),
}

/// The storefront for one page load.
#[derive(Debug)]
pub struct Storefront<S: Storage> {
    document: Document,
    cart: CartStore<S>,
    catalog: Catalog,
    widget: CartWidget,
    ids: IdGenerator,
    config: StorefrontConfig,
    notices: Vec<Notice>,
}

impl<S: Storage> Storefront<S> {
    /// Initialize the storefront on `document`.
    ///
    /// Hydrates the cart from `storage`, mounts the widget, scans product
    /// cards and renders the widget once.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the document rejects the
    /// widget markup.
    pub fn new(document: Document, storage: S, config: StorefrontConfig) -> Result<Self> {
        let ids = IdGenerator::seeded_from_clock(config.id_prefix.clone());
        Self::with_id_generator(document, storage, config, ids)
    }

    /// Like [`Storefront::new`] with an explicit id source.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` is invalid or the document rejects the
    /// widget markup.
    #[instrument(skip_all)]
    pub fn with_id_generator(
        mut document: Document,
        storage: S,
        config: StorefrontConfig,
        ids: IdGenerator,
    ) -> Result<Self> {
        config.validate()?;

        let cart = CartStore::with_key(storage, config.storage_key.clone());
        let widget = CartWidget::mount(&mut document, config.toast_duration())?;
        let catalog = Catalog::new(config.card_class.clone());

        let mut storefront = Self {
            document,
            cart,
            catalog,
            widget,
            ids,
            config,
            notices: Vec::new(),
        };
        let report = storefront.scan()?;
        storefront.refresh()?;

        info!(
            products = report.registered,
            cart_lines = storefront.cart.len(),
            "Storefront initialized"
        );
        Ok(storefront)
    }

    /// Run initialization again: re-mount the widget and re-scan the page.
    ///
    /// Existing widget elements, registered products and bound buttons are
    /// reused, so nothing is duplicated. Cards added since the last scan are
    /// picked up.
    ///
    /// # Errors
    ///
    /// Returns an error if the document rejects the widget markup.
    #[instrument(skip_all)]
    pub fn reinitialize(&mut self) -> Result<ScanReport> {
        self.widget = CartWidget::mount(&mut self.document, self.config.toast_duration())?;
        let report = self.scan()?;
        self.refresh()?;
        Ok(report)
    }

    fn scan(&mut self) -> Result<ScanReport> {
        Ok(self.catalog.scan(&mut self.document, &mut self.ids)?)
    }

    fn refresh(&mut self) -> Result<()> {
        self.widget.refresh(&mut self.document, &self.cart)?;
        Ok(())
    }

    /// Click `target`.
    ///
    /// Storefront actions are run; tags of handlers owned by other page
    /// scripts ([`Action::Custom`]) are returned for the host to dispatch.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is not part of this document.
    #[instrument(skip(self, now))]
    pub fn click(&mut self, target: NodeId, now: DateTime<Utc>) -> Result<Vec<String>> {
        let actions = self.document.dispatch_click(target)?;
        let mut external = Vec::new();
        for action in actions {
            match action {
                Action::Custom(tag) => external.push(tag),
                action => self.handle(action, now)?,
            }
        }
        Ok(external)
    }

    /// Run one storefront action.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget markup has been removed from the
    /// document.
    pub fn handle(&mut self, action: Action, now: DateTime<Utc>) -> Result<()> {
        match action {
            Action::AddToCart(id) => self.add_from_catalog(&id, now),
            Action::ToggleCart => Ok(self.widget.toggle(&mut self.document)?),
            Action::CloseCart => Ok(self.widget.close(&mut self.document)?),
            Action::Increment(id) => self.step_quantity(&id, 1),
            Action::Decrement(id) => self.step_quantity(&id, -1),
            Action::RemoveLine(id) => self.remove_product(&id),
            Action::ClearCart => self.clear_cart(),
            Action::Checkout => self.checkout(),
            Action::Custom(_) => Ok(()),
        }
    }

    /// Handle a key press; `Escape` closes the cart modal.
    ///
    /// # Errors
    ///
    /// Returns an error if the modal has been removed from the document.
    pub fn key_press(&mut self, key: &str) -> Result<()> {
        if key == "Escape" && self.widget.is_open(&self.document) {
            self.widget.close(&mut self.document)?;
        }
        Ok(())
    }

    /// Advance timers; hides the toast once its time is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the toast has been removed from the document.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.widget.toast_mut().tick(&mut self.document, now)?;
        Ok(())
    }

    fn add_from_catalog(&mut self, id: &ProductId, now: DateTime<Utc>) -> Result<()> {
        let Some(product) = self.catalog.cart_copy(id) else {
            warn!(product_id = %id, "Add to cart for unknown product");
            return Ok(());
        };
        self.add_product(product, now)
    }

    /// Add `product` to the cart, re-render and confirm with a toast.
    ///
    /// This is the entry point for other page scripts (a promo banner, a
    /// console snippet) that want to put something in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget markup has been removed from the
    /// document.
    pub fn add_product(&mut self, product: Product, now: DateTime<Utc>) -> Result<()> {
        let message = format!("{} agregado al carrito", product.name());
        self.cart.add(product);
        self.refresh()?;
        self.widget.notify(&mut self.document, &message, now)?;
        Ok(())
    }

    /// Set a line's quantity and re-render.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget markup has been removed from the
    /// document.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) -> Result<()> {
        self.cart.update_qty(id, quantity);
        self.refresh()
    }

    /// Remove a line and re-render.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget markup has been removed from the
    /// document.
    pub fn remove_product(&mut self, id: &ProductId) -> Result<()> {
        self.cart.remove(id);
        self.refresh()
    }

    /// Empty the cart and re-render.
    ///
    /// # Errors
    ///
    /// Returns an error if the widget markup has been removed from the
    /// document.
    pub fn clear_cart(&mut self) -> Result<()> {
        self.cart.clear();
        self.refresh()
    }

    fn step_quantity(&mut self, id: &ProductId, delta: i64) -> Result<()> {
        let Some(current) = self.cart.get(id).map(Product::quantity) else {
            return Ok(());
        };
        self.update_quantity(id, i64::from(current) + delta)
    }

    /// Simulated checkout: empties the cart and confirms.
    ///
    /// An empty cart only raises [`EMPTY_CHECKOUT_MESSAGE`].
    ///
    /// # Errors
    ///
    /// Returns an error if the widget markup has been removed from the
    /// document.
    pub fn checkout(&mut self) -> Result<()> {
        if self.cart.is_empty() {
            self.notices
                .push(Notice::Alert(EMPTY_CHECKOUT_MESSAGE.to_string()));
            return Ok(());
        }

        let total = format_price(self.cart.total());
        let count = self.cart.count();
        self.cart.clear();
        self.widget.close(&mut self.document)?;
        self.refresh()?;

        info!(items = count, total = %total, "Checkout simulated");
        self.notices.push(Notice::Alert(format!(
            "¡Gracias por tu compra! Total: {total}"
        )));
        Ok(())
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for other page scripts that edit markup.
    ///
    /// Call [`Storefront::reinitialize`] afterwards if product cards changed.
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn widget(&self) -> &CartWidget {
        &self.widget
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Notices raised so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// End of the page: hand back the storage so the next load can hydrate
    /// from it.
    pub fn unload(self) -> S {
        self.cart.into_storage()
    }
}
