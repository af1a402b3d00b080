//! Click handlers and the actions they trigger.

use vitrina_core::ProductId;

/// What a click on an element asks the storefront to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Add a fresh copy of a discovered product to the cart.
    AddToCart(ProductId),
    /// Open the cart modal if closed, close it if open.
    ToggleCart,
    /// Close the cart modal.
    CloseCart,
    /// Raise a cart line's quantity by one.
    Increment(ProductId),
    /// Lower a cart line's quantity by one, removing it at zero.
    Decrement(ProductId),
    /// Remove a cart line.
    RemoveLine(ProductId),
    /// Empty the cart.
    ClearCart,
    /// Simulated checkout.
    Checkout,
    /// A handler owned by some other page script; the storefront passes the
    /// tag back to the host untouched.
    Custom(String),
}

/// A click handler: the action to run and whether the click stops there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    pub action: Action,
    pub stop_propagation: bool,
}

impl Handler {
    /// A handler that lets the click bubble to ancestors.
    #[must_use]
    pub const fn new(action: Action) -> Self {
        Self {
            action,
            stop_propagation: false,
        }
    }

    /// A handler that keeps the click from reaching ancestor handlers.
    #[must_use]
    pub const fn stopping(action: Action) -> Self {
        Self {
            action,
            stop_propagation: true,
        }
    }
}
