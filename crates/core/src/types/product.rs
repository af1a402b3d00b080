//! Product entity.

use rust_decimal::Decimal;

use super::id::ProductId;
use super::money::format_price;

/// Category assigned when markup or persisted state carries none.
pub const DEFAULT_CATEGORY: &str = "general";

/// One catalog item, either as discovered on the page or as a cart line.
///
/// The id is fixed at construction. Quantity is only changed by the cart
/// store, which keeps it at one or more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    unit_price: Decimal,
    category: String,
    quantity: u32,
}

impl Product {
    /// Create a product with quantity 1 in the default category.
    ///
    /// The price is taken as given; callers normalise free text through
    /// [`parse_price`](super::money::parse_price) first.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, unit_price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit_price,
            category: DEFAULT_CATEGORY.to_string(),
            quantity: 1,
        }
    }

    /// Set the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the starting quantity (used when rebuilding persisted lines).
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub const fn id(&self) -> &ProductId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    pub(crate) const fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    /// Price of this line: unit price times quantity.
    ///
    /// Saturates at [`Decimal::MAX`] (or [`Decimal::MIN`] for negative
    /// prices) instead of overflowing.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }

    /// Name and formatted unit price, e.g. `Cupcake - S/ 5.00`.
    #[must_use]
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.name, format_price(self.unit_price))
    }

    /// Name and category, e.g. `Cupcake (postres)`.
    #[must_use]
    pub fn category_label(&self) -> String {
        format!("{} ({})", self.name, self.category)
    }

    /// A copy of this product with quantity reset to 1.
    ///
    /// Add-to-cart always hands the cart a fresh copy of the registry entry,
    /// never the registry's own instance.
    #[must_use]
    pub fn fresh_copy(&self) -> Self {
        Self {
            quantity: 1,
            ..self.clone()
        }
    }
}
