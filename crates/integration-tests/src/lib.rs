//! Integration tests for Vitrina.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrina-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_properties` - Property tests for the cart store and its codec
//! - `storefront_session` - Full page sessions through the storefront controller
//!
//! This library holds the page fixtures the test files share.

use chrono::{DateTime, TimeZone, Utc};
use vitrina_storefront::dom::{DomError, Element};
use vitrina_storefront::{Document, NodeId};

/// A product card as it appears in catalog markup.
#[derive(Debug, Clone)]
pub struct CardFixture {
    pub data_id: Option<String>,
    pub name: String,
    pub price: String,
    pub category: Option<String>,
}

impl CardFixture {
    #[must_use]
    pub fn new(data_id: &str, name: &str, price: &str) -> Self {
        Self {
            data_id: Some(data_id.to_string()),
            name: name.to_string(),
            price: price.to_string(),
            category: None,
        }
    }

    /// A card without `data-id`; the storefront has to generate one.
    #[must_use]
    pub fn anonymous(name: &str, price: &str) -> Self {
        Self {
            data_id: None,
            ..Self::new("", name, price)
        }
    }

    #[must_use]
    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    fn element(&self) -> Element {
        let mut card = Element::new("article").class("product-card");
        if let Some(id) = &self.data_id {
            card = card.attr("data-id", id.as_str());
        }
        if let Some(category) = &self.category {
            card = card.attr("data-category", category.as_str());
        }
        card.child(Element::new("h3").text(self.name.as_str()))
            .child(Element::new("span").class("price").text(self.price.as_str()))
            .child(Element::new("div").class("card-actions"))
    }
}

/// The demo catalog: Cupcake, Torta and Brownie.
#[must_use]
pub fn bakery_cards() -> Vec<CardFixture> {
    vec![
        CardFixture::new("p1", "Cupcake", "S/ 5.00").category("postres"),
        CardFixture::new("p2", "Torta", "S/ 300.00").category("postres"),
        CardFixture::anonymous("Brownie", "S/ 7,50"),
    ]
}

/// Build a page with `cards` inside a `<main>` grid.
///
/// # Errors
///
/// Returns an error if the document rejects an insertion.
pub fn page_with(cards: &[CardFixture]) -> Result<Document, DomError> {
    let mut doc = Document::new();
    let grid = doc.append(doc.body(), Element::new("main").class("catalog"))?;
    for card in cards {
        doc.append(grid, card.element())?;
    }
    Ok(doc)
}

/// Append one more card to an existing page.
///
/// # Errors
///
/// Returns an error if the page has no catalog grid or rejects the card.
pub fn append_card(doc: &mut Document, card: &CardFixture) -> Result<NodeId, DomError> {
    let grid = doc
        .elements_by_class("catalog")
        .first()
        .copied()
        .ok_or(DomError::NodeNotFound(doc.body()))?;
    doc.append(grid, card.element())
}

/// Fixed clock for deterministic toast timing.
#[must_use]
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}
