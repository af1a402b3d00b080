//! Arena-backed page model.
//!
//! The storefront never touches a real browser; it reads and writes this
//! document instead. Elements live in a flat arena addressed by [`NodeId`].
//! Detaching an element only unlinks it from its parent; the id stays valid
//! and the element can be re-attached. Removing an element frees its whole
//! subtree. Freed slots are reused by later elements under a new generation,
//! so ids of removed elements report [`DomError::NodeNotFound`] instead of
//! aliasing whatever took their slot.
//!
//! Each element has a single click-handler slot. Setting a handler replaces
//! the previous one, so re-rendering never stacks duplicate listeners.

use core::fmt;

use indexmap::IndexMap;
use thiserror::Error;

use crate::events::{Action, Handler};

/// Handle to an element in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)?;
        if self.generation > 0 {
            write!(f, "v{}", self.generation)?;
        }
        Ok(())
    }
}

/// Errors from document operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The id does not belong to this document.
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// Appending would make an element its own ancestor.
    #[error("cannot append {child} under {parent}: would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// `<body>` cannot be removed.
    #[error("cannot remove the document body")]
    RemoveBody,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: IndexMap<String, String>,
    classes: Vec<String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    on_click: Option<Handler>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: IndexMap::new(),
            classes: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            on_click: None,
        }
    }
}

/// Declarative description of an element subtree, used to build markup.
///
/// ```
/// use vitrina_storefront::dom::{Document, Element};
///
/// let mut doc = Document::new();
/// let card = doc
///     .append(
///         doc.body(),
///         Element::new("article")
///             .class("product-card")
///             .attr("data-id", "p1")
///             .child(Element::new("h3").text("Cupcake"))
///             .child(Element::new("span").class("price").text("S/ 5.00")),
///     )
///     .unwrap();
/// assert_eq!(doc.attr(card, "data-id"), Some("p1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A page: a tree of elements rooted at `<body>`.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only `<body>`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new("body")),
            }],
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    /// The root element.
    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(DomError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(DomError::NodeNotFound(id))
    }

    /// Create a detached element, reusing a freed slot when one exists.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        if let Some(index) = self.free.pop()
            && let Some(slot) = self.slots.get_mut(index)
        {
            slot.node = Some(Node::new(tag));
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            node: Some(Node::new(tag)),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Live elements, attached or detached.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Arena slots allocated so far, including freed ones awaiting reuse.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Move `child` to the end of `parent`'s children.
    ///
    /// # Errors
    ///
    /// Returns an error if either id is unknown or `child` is an ancestor of
    /// `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(child)?;
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(DomError::Cycle { parent, child });
            }
            cursor = self.node(current)?.parent;
        }

        self.detach(child)?;
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Build `element` and append it under `parent`, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if `parent` is unknown.
    pub fn append(&mut self, parent: NodeId, element: Element) -> Result<NodeId, DomError> {
        self.node(parent)?;
        let id = self.create_element(&element.tag);
        {
            let node = self.node_mut(id)?;
            node.attrs.extend(element.attrs);
            node.classes.extend(element.classes);
            node.text = element.text;
        }
        for child in element.children {
            self.append(id, child)?;
        }
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Unlink `node` from its parent. Detached subtrees no longer match
    /// queries.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.node(node)?.parent else {
            return Ok(());
        };
        self.node_mut(parent)?.children.retain(|c| *c != node);
        self.node_mut(node)?.parent = None;
        Ok(())
    }

    /// Detach `node` and free it along with every descendant.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is unknown or is `<body>`.
    pub fn remove(&mut self, node: NodeId) -> Result<(), DomError> {
        if node == self.body {
            return Err(DomError::RemoveBody);
        }
        self.detach(node)?;

        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index)
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            if let Some(freed) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                stack.extend(freed.children);
            }
        }
        Ok(())
    }

    /// Remove and free every child of `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn clear_children(&mut self, node: NodeId) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.node_mut(child)?.parent = None;
            self.remove(child)?;
        }
        Ok(())
    }

    /// Detach every child of `node`, keeping them alive.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn remove_children(&mut self, node: NodeId) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.node(node).ok().map(|n| n.tag.as_str())
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).ok().and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match self.node(node) {
            Ok(n) => &n.children,
            Err(_) => &[],
        }
    }

    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node).ok()?.attrs.get(name).map(String::as_str)
    }

    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn set_attr(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.node_mut(node)?
            .attrs
            .insert(name.to_string(), value.into());
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        self.node_mut(node)?.attrs.shift_remove(name);
        Ok(())
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_ok_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        let node = self.node_mut(node)?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.node_mut(node)?.classes.retain(|c| c != class);
        Ok(())
    }

    /// Add or remove `class` depending on `on`.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn set_class(&mut self, node: NodeId, class: &str, on: bool) -> Result<(), DomError> {
        if on {
            self.add_class(node, class)
        } else {
            self.remove_class(node, class)
        }
    }

    /// The element's own text, excluding descendants.
    #[must_use]
    pub fn text(&self, node: NodeId) -> &str {
        self.node(node).map_or("", |n| n.text.as_str())
    }

    /// The element's text followed by all descendant text, in document order.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = self.text(node).to_string();
        for child in self.descendants(node) {
            out.push_str(self.text(child));
        }
        out
    }

    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        self.node_mut(node)?.text = text.into();
        Ok(())
    }

    /// All descendants of `node` in pre-order, excluding `node` itself.
    #[must_use]
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// First descendant of `node` carrying `class`.
    #[must_use]
    pub fn find_by_class(&self, node: NodeId, class: &str) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|n| self.has_class(*n, class))
    }

    /// Every element attached to the document that carries `class`.
    #[must_use]
    pub fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .descendants(self.body)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect();
        if self.has_class(self.body, class) {
            out.insert(0, self.body);
        }
        out
    }

    /// First attached element whose `id` attribute equals `id`.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.body)
            .chain(self.descendants(self.body))
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    /// Whether `node` is reachable from `<body>`.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.body {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Assign the click handler of `node`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` is unknown.
    pub fn set_on_click(&mut self, node: NodeId, handler: Handler) -> Result<(), DomError> {
        self.node_mut(node)?.on_click = Some(handler);
        Ok(())
    }

    #[must_use]
    pub fn on_click(&self, node: NodeId) -> Option<&Handler> {
        self.node(node).ok()?.on_click.as_ref()
    }

    /// Click `target`: collect the actions of its handler and of each
    /// ancestor's handler, innermost first, until one stops propagation.
    ///
    /// # Errors
    ///
    /// Returns an error if `target` is unknown.
    pub fn dispatch_click(&self, target: NodeId) -> Result<Vec<Action>, DomError> {
        self.node(target)?;
        let mut actions = Vec::new();
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            if let Some(handler) = self.on_click(current) {
                actions.push(handler.action.clone());
                if handler.stop_propagation {
                    break;
                }
            }
            cursor = self.parent(current);
        }
        Ok(actions)
    }

    /// Serialize `node` and its subtree as HTML.
    #[must_use]
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Ok(n) = self.node(node) else {
            return;
        };
        out.push('<');
        out.push_str(&n.tag);
        if !n.classes.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&escape(&n.classes.join(" ")));
            out.push('"');
        }
        for (name, value) in &n.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
        out.push('>');
        out.push_str(&escape(&n.text));
        for child in &n.children {
            self.write_html(*child, out);
        }
        out.push_str("</");
        out.push_str(&n.tag);
        out.push('>');
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
