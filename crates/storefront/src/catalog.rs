//! Catalog discovery.
//!
//! Scans the page for product cards, builds a [`Product`] for each one and
//! keeps them in a registry keyed by id. Every card ends up with an
//! add-to-cart button whose click handler is assigned (never stacked) to
//! [`Action::AddToCart`] and stops the click before it reaches any
//! card-level handler.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};
use vitrina_core::{IdGenerator, Product, ProductId, parse_price};

use crate::dom::{Document, DomError, Element, NodeId};
use crate::events::{Action, Handler};

/// Class of the add-to-cart control inside a card.
pub const ADD_BUTTON_CLASS: &str = "add-to-cart";
/// Class of the container a synthesized add button is placed in.
pub const ACTIONS_CLASS: &str = "card-actions";
/// Class of the element holding the price text.
pub const PRICE_CLASS: &str = "price";
/// Class of a non-heading element holding the product name.
pub const NAME_CLASS: &str = "product-name";
/// Label of a synthesized add button.
pub const ADD_BUTTON_LABEL: &str = "Agregar al carrito";

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Outcome of one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Cards found on the page.
    pub cards: usize,
    /// Products newly added to the registry.
    pub registered: usize,
    /// Add buttons created because a card had none.
    pub synthesized_buttons: usize,
    /// Ids that had to be generated.
    pub generated_ids: usize,
}

/// The discovery registry.
#[derive(Debug, Clone)]
pub struct Catalog {
    card_class: String,
    products: IndexMap<ProductId, Product>,
}

impl Catalog {
    /// Create an empty registry for cards marked with `card_class`.
    #[must_use]
    pub fn new(card_class: impl Into<String>) -> Self {
        Self {
            card_class: card_class.into(),
            products: IndexMap::new(),
        }
    }

    /// Scan every product card in `document`.
    ///
    /// Already-known ids are not registered again, and cards keep the ids
    /// they were given on earlier scans, so scanning twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the document rejects a write.
    #[instrument(skip_all, fields(card_class = %self.card_class))]
    pub fn scan(
        &mut self,
        document: &mut Document,
        ids: &mut IdGenerator,
    ) -> Result<ScanReport, DomError> {
        let cards = document.elements_by_class(&self.card_class);
        let mut report = ScanReport {
            cards: cards.len(),
            ..ScanReport::default()
        };

        for (index, card) in cards.into_iter().enumerate() {
            let id = match card_id(document, card) {
                Some(id) => id,
                None => {
                    let id = ids.next_id();
                    document.set_attr(card, "data-id", id.as_str())?;
                    report.generated_ids += 1;
                    id
                }
            };

            if !self.products.contains_key(&id) {
                let product = read_product(document, card, id.clone(), index);
                debug!(product_id = %id, name = product.name(), "Registered product");
                self.products.insert(id.clone(), product);
                report.registered += 1;
            }

            if bind_add_button(document, card, &id)? {
                report.synthesized_buttons += 1;
            }
        }

        info!(
            cards = report.cards,
            registered = report.registered,
            synthesized = report.synthesized_buttons,
            "Catalog scan complete"
        );
        Ok(report)
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.products.contains_key(id)
    }

    /// A copy of the registered product with quantity 1, ready for the cart.
    #[must_use]
    pub fn cart_copy(&self, id: &ProductId) -> Option<Product> {
        self.products.get(id).map(Product::fresh_copy)
    }

    /// Registered products in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Forget every registered product (the page navigated away).
    pub fn clear(&mut self) {
        self.products.clear();
    }
}

/// `data-id`, then the element id.
fn card_id(document: &Document, card: NodeId) -> Option<ProductId> {
    ["data-id", "id"]
        .into_iter()
        .filter_map(|name| document.attr(card, name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(ProductId::from)
}

fn read_product(document: &Document, card: NodeId, id: ProductId, index: usize) -> Product {
    let descendants = document.descendants(card);

    let name = descendants
        .iter()
        .filter(|n| {
            document
                .tag(**n)
                .is_some_and(|tag| HEADINGS.contains(&tag))
                || document.has_class(**n, NAME_CLASS)
        })
        .map(|n| document.text_content(*n).trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| format!("Producto {}", index + 1));

    let price = descendants
        .iter()
        .find(|n| document.has_class(**n, PRICE_CLASS))
        .map(|n| document.text_content(*n))
        .or_else(|| document.attr(card, "data-price").map(str::to_string))
        .map_or(Decimal::ZERO, |text| parse_price(&text));

    let mut product = Product::new(id, name, price);
    if let Some(category) = document
        .attr(card, "data-category")
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        product = product.with_category(category);
    }
    product
}

/// Make sure `card` has an add button bound to `id`. Returns whether one
/// had to be created.
fn bind_add_button(
    document: &mut Document,
    card: NodeId,
    id: &ProductId,
) -> Result<bool, DomError> {
    let (button, created) = if let Some(existing) = document.find_by_class(card, ADD_BUTTON_CLASS)
    {
        (existing, false)
    } else {
        let container = document.find_by_class(card, ACTIONS_CLASS).unwrap_or(card);
        let button = document.append(
            container,
            Element::new("button")
                .class(ADD_BUTTON_CLASS)
                .attr("type", "button")
                .text(ADD_BUTTON_LABEL),
        )?;
        (button, true)
    };

    document.set_on_click(button, Handler::stopping(Action::AddToCart(id.clone())))?;
    Ok(created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page() -> Document {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(
            body,
            Element::new("article")
                .class("product-card")
                .attr("data-id", "p1")
                .attr("data-category", "postres")
                .child(Element::new("h3").text(" Cupcake "))
                .child(Element::new("span").class("price").text("S/ 5.00"))
                .child(Element::new("div").class("card-actions")),
        )
        .unwrap();
        doc.append(
            body,
            Element::new("article")
                .class("product-card")
                .id("torta-card")
                .child(Element::new("h2").text("Torta"))
                .child(Element::new("p").class("price").text("S/ 300"))
                .child(Element::new("button").class("add-to-cart").text("Comprar")),
        )
        .unwrap();
        doc.append(
            body,
            Element::new("article")
                .class("product-card")
                .child(Element::new("p").text("sin nombre ni precio")),
        )
        .unwrap();
        doc
    }

    fn scan(doc: &mut Document) -> (Catalog, ScanReport) {
        let mut catalog = Catalog::new("product-card");
        let mut ids = IdGenerator::starting_at("prod-", 100);
        let report = catalog.scan(doc, &mut ids).unwrap();
        (catalog, report)
    }

    #[test]
    fn test_scan_reads_cards() {
        let mut doc = page();
        let (catalog, report) = scan(&mut doc);
        assert_eq!(report.cards, 3);
        assert_eq!(report.registered, 3);
        assert_eq!(report.generated_ids, 1);

        let cupcake = catalog.get(&ProductId::from("p1")).unwrap();
        assert_eq!(cupcake.name(), "Cupcake");
        assert_eq!(cupcake.unit_price(), Decimal::from(5));
        assert_eq!(cupcake.category(), "postres");

        let torta = catalog.get(&ProductId::from("torta-card")).unwrap();
        assert_eq!(torta.name(), "Torta");
        assert_eq!(torta.unit_price(), Decimal::from(300));
        assert_eq!(torta.category(), "general");

        let unnamed = catalog.get(&ProductId::from("prod-100")).unwrap();
        assert_eq!(unnamed.name(), "Producto 3");
        assert_eq!(unnamed.unit_price(), Decimal::ZERO);
    }

    #[test]
    fn test_add_buttons_bound_and_synthesized() {
        let mut doc = page();
        let (_, report) = scan(&mut doc);
        assert_eq!(report.synthesized_buttons, 2);

        let buttons = doc.elements_by_class(ADD_BUTTON_CLASS);
        assert_eq!(buttons.len(), 3);

        // The first card's button lands in its actions container.
        let first = buttons[0];
        let container = doc.parent(first).unwrap();
        assert!(doc.has_class(container, ACTIONS_CLASS));
        assert_eq!(doc.text(first), ADD_BUTTON_LABEL);

        // The author's own button is reused and bound.
        assert_eq!(doc.text(buttons[1]), "Comprar");
        let handler = doc.on_click(buttons[1]).unwrap();
        assert_eq!(handler.action, Action::AddToCart(ProductId::from("torta-card")));
        assert!(handler.stop_propagation);
    }

    #[test]
    fn test_add_button_does_not_reach_card_handler() {
        let mut doc = page();
        let card = doc.elements_by_class("product-card")[0];
        doc.set_on_click(card, Handler::new(Action::Custom("card-details".into())))
            .unwrap();
        scan(&mut doc);

        let button = doc.find_by_class(card, ADD_BUTTON_CLASS).unwrap();
        assert_eq!(
            doc.dispatch_click(button).unwrap(),
            vec![Action::AddToCart(ProductId::from("p1"))]
        );
    }

    #[test]
    fn test_rescan_is_idempotent() {
        let mut doc = page();
        let mut catalog = Catalog::new("product-card");
        let mut ids = IdGenerator::starting_at("prod-", 100);
        catalog.scan(&mut doc, &mut ids).unwrap();
        let nodes_before = doc.descendants(doc.body()).len();

        let again = catalog.scan(&mut doc, &mut ids).unwrap();
        assert_eq!(again.registered, 0);
        assert_eq!(again.synthesized_buttons, 0);
        assert_eq!(again.generated_ids, 0);
        assert_eq!(catalog.len(), 3);
        assert_eq!(doc.descendants(doc.body()).len(), nodes_before);
    }

    #[test]
    fn test_known_id_keeps_first_registration() {
        let mut doc = page();
        let (mut catalog, _) = scan(&mut doc);
        doc.append(
            doc.body(),
            Element::new("article")
                .class("product-card")
                .attr("data-id", "p1")
                .child(Element::new("h3").text("Impostor"))
                .child(Element::new("span").class("price").text("S/ 1.00")),
        )
        .unwrap();
        let mut ids = IdGenerator::starting_at("prod-", 500);
        let report = catalog.scan(&mut doc, &mut ids).unwrap();
        assert_eq!(report.registered, 0);
        assert_eq!(catalog.get(&ProductId::from("p1")).unwrap().name(), "Cupcake");
    }

    #[test]
    fn test_data_price_fallback() {
        let mut doc = Document::new();
        doc.append(
            doc.body(),
            Element::new("div")
                .class("product-card")
                .attr("data-id", "p7")
                .attr("data-price", "12,50")
                .child(Element::new("span").class("product-name").text("Alfajor")),
        )
        .unwrap();
        let (catalog, _) = scan(&mut doc);
        let alfajor = catalog.get(&ProductId::from("p7")).unwrap();
        assert_eq!(alfajor.name(), "Alfajor");
        assert_eq!(alfajor.unit_price(), Decimal::new(1250, 2));
    }

    #[test]
    fn test_cart_copy_starts_at_one() {
        let mut doc = page();
        let (catalog, _) = scan(&mut doc);
        let copy = catalog.cart_copy(&ProductId::from("p1")).unwrap();
        assert_eq!(copy.quantity(), 1);
        assert!(catalog.cart_copy(&ProductId::from("nope")).is_none());
    }
}
