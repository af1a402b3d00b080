//! Floating cart widget.
//!
//! A toggle button with a live count badge, a modal listing the cart lines,
//! and a toast for feedback. The widget holds no cart state of its own: after
//! every cart mutation the caller asks it to [`refresh`](CartWidget::refresh)
//! and it re-reads `count()`, `total()` and `items()` from the store.
//!
//! All widget elements carry fixed ids. Mounting looks each one up first and
//! only creates what is missing, so initializing twice never duplicates them.

pub mod toast;

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use vitrina_core::{CartStore, Product, ProductId, Storage, format_price};

use crate::dom::{Document, DomError, Element, NodeId};
use crate::events::{Action, Handler};

pub use toast::Toast;

pub const CART_TOGGLE_ID: &str = "cart-toggle";
pub const CART_COUNT_ID: &str = "cart-count";
pub const CART_MODAL_ID: &str = "cart-modal";
pub const CART_ITEMS_ID: &str = "cart-items";
pub const CART_TOTAL_ID: &str = "cart-total";
pub const CART_CLEAR_ID: &str = "cart-clear";
pub const CART_CHECKOUT_ID: &str = "cart-checkout";
pub const CART_CLOSE_ID: &str = "cart-close";
pub const CART_TOAST_ID: &str = "cart-toast";

/// Text of the placeholder line shown for an empty cart.
pub const EMPTY_CART_LABEL: &str = "Tu carrito está vacío";

/// Class present on the modal while it is open.
const OPEN_CLASS: &str = "open";

/// One cart line prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemView {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// The whole cart prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u64,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: format_price(Decimal::ZERO),
            item_count: 0,
        }
    }
}

impl From<&Product> for CartItemView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id().clone(),
            name: product.name().to_string(),
            quantity: product.quantity(),
            price: format_price(product.unit_price()),
            line_price: format_price(product.line_total()),
        }
    }
}

impl<S: Storage> From<&CartStore<S>> for CartView {
    fn from(cart: &CartStore<S>) -> Self {
        Self {
            items: cart.iter().map(CartItemView::from).collect(),
            total: format_price(cart.total()),
            item_count: cart.count(),
        }
    }
}

/// Handles to the mounted widget elements.
#[derive(Debug, Clone)]
pub struct CartWidget {
    toggle: NodeId,
    badge: NodeId,
    modal: NodeId,
    items: NodeId,
    total: NodeId,
    toast: Toast,
}

impl CartWidget {
    /// Find or create the widget elements under `<body>` and bind their
    /// fixed controls.
    ///
    /// # Errors
    ///
    /// Returns an error if the document rejects an insertion.
    pub fn mount(document: &mut Document, toast_duration: TimeDelta) -> Result<Self, DomError> {
        let body = document.body();

        let toggle = ensure(document, body, CART_TOGGLE_ID, || {
            Element::new("button").class("cart-toggle").text("Carrito")
        })?;
        document.set_on_click(toggle, Handler::new(Action::ToggleCart))?;
        let badge = ensure(document, toggle, CART_COUNT_ID, || {
            Element::new("span").class("cart-count").text("0")
        })?;

        let modal = ensure(document, body, CART_MODAL_ID, || {
            Element::new("div")
                .class("cart-modal")
                .attr("hidden", "")
                .attr("role", "dialog")
        })?;
        let close = ensure(document, modal, CART_CLOSE_ID, || {
            Element::new("button").class("cart-close").text("×")
        })?;
        document.set_on_click(close, Handler::stopping(Action::CloseCart))?;
        let items = ensure(document, modal, CART_ITEMS_ID, || {
            Element::new("ul").class("cart-items")
        })?;
        let total = ensure(document, modal, CART_TOTAL_ID, || {
            Element::new("strong").class("cart-total")
        })?;
        let clear = ensure(document, modal, CART_CLEAR_ID, || {
            Element::new("button").class("cart-clear").text("Vaciar carrito")
        })?;
        document.set_on_click(clear, Handler::stopping(Action::ClearCart))?;
        let checkout = ensure(document, modal, CART_CHECKOUT_ID, || {
            Element::new("button")
                .class("cart-checkout")
                .text("Finalizar compra")
        })?;
        document.set_on_click(checkout, Handler::stopping(Action::Checkout))?;

        let toast = ensure(document, body, CART_TOAST_ID, || {
            Element::new("div").class("cart-toast").attr("role", "status")
        })?;

        Ok(Self {
            toggle,
            badge,
            modal,
            items,
            total,
            toast: Toast::new(toast, toast_duration),
        })
    }

    /// Re-render badge, line items and total from `cart`.
    ///
    /// # Errors
    ///
    /// Returns an error if a widget element is missing from `document`.
    pub fn refresh<S: Storage>(
        &self,
        document: &mut Document,
        cart: &CartStore<S>,
    ) -> Result<(), DomError> {
        self.render(document, &CartView::from(cart))
    }

    /// Render a prepared view.
    ///
    /// # Errors
    ///
    /// Returns an error if a widget element is missing from `document`.
    pub fn render(&self, document: &mut Document, view: &CartView) -> Result<(), DomError> {
        document.set_text(self.badge, view.item_count.to_string())?;
        document.set_class(self.badge, "empty", view.item_count == 0)?;

        document.clear_children(self.items)?;
        if view.items.is_empty() {
            document.append(
                self.items,
                Element::new("li").class("cart-empty").text(EMPTY_CART_LABEL),
            )?;
        }
        for item in &view.items {
            render_line(document, self.items, item)?;
        }

        document.set_text(self.total, view.total.clone())?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the modal element is missing from `document`.
    pub fn open(&self, document: &mut Document) -> Result<(), DomError> {
        document.add_class(self.modal, OPEN_CLASS)?;
        document.remove_attr(self.modal, "hidden")
    }

    /// # Errors
    ///
    /// Returns an error if the modal element is missing from `document`.
    pub fn close(&self, document: &mut Document) -> Result<(), DomError> {
        document.remove_class(self.modal, OPEN_CLASS)?;
        document.set_attr(self.modal, "hidden", "")
    }

    /// Open the modal if closed, close it if open.
    ///
    /// # Errors
    ///
    /// Returns an error if the modal element is missing from `document`.
    pub fn toggle(&self, document: &mut Document) -> Result<(), DomError> {
        if self.is_open(document) {
            self.close(document)
        } else {
            self.open(document)
        }
    }

    #[must_use]
    pub fn is_open(&self, document: &Document) -> bool {
        document.has_class(self.modal, OPEN_CLASS)
    }

    /// Show a transient message.
    ///
    /// # Errors
    ///
    /// Returns an error if the toast element is missing from `document`.
    pub fn notify(
        &mut self,
        document: &mut Document,
        message: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomError> {
        self.toast.show(document, message, now)
    }

    #[must_use]
    pub const fn toast(&self) -> &Toast {
        &self.toast
    }

    pub const fn toast_mut(&mut self) -> &mut Toast {
        &mut self.toast
    }

    #[must_use]
    pub const fn toggle_button(&self) -> NodeId {
        self.toggle
    }

    #[must_use]
    pub const fn badge(&self) -> NodeId {
        self.badge
    }

    #[must_use]
    pub const fn modal(&self) -> NodeId {
        self.modal
    }

    #[must_use]
    pub const fn items_list(&self) -> NodeId {
        self.items
    }

    #[must_use]
    pub const fn total_label(&self) -> NodeId {
        self.total
    }
}

/// Look up `id`, creating it under `parent` from `build` when absent.
fn ensure(
    document: &mut Document,
    parent: NodeId,
    id: &str,
    build: impl FnOnce() -> Element,
) -> Result<NodeId, DomError> {
    if let Some(existing) = document.get_element_by_id(id) {
        return Ok(existing);
    }
    document.append(parent, build().id(id))
}

fn render_line(
    document: &mut Document,
    list: NodeId,
    item: &CartItemView,
) -> Result<NodeId, DomError> {
    let line = document.append(
        list,
        Element::new("li")
            .class("cart-line")
            .attr("data-id", item.id.as_str())
            .child(Element::new("span").class("cart-line-name").text(&item.name))
            .child(
                Element::new("span")
                    .class("cart-line-qty")
                    .text(item.quantity.to_string()),
            )
            .child(
                Element::new("span")
                    .class("cart-line-price")
                    .text(&item.line_price),
            ),
    )?;

    for (class, label, action) in [
        ("cart-line-dec", "−", Action::Decrement(item.id.clone())),
        ("cart-line-inc", "+", Action::Increment(item.id.clone())),
        ("cart-line-remove", "×", Action::RemoveLine(item.id.clone())),
    ] {
        let button = document.append(line, Element::new("button").class(class).text(label))?;
        document.set_on_click(button, Handler::stopping(action))?;
    }

    Ok(line)
}
