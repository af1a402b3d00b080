//! Product identifiers.
//!
//! Ids come from markup (`data-id` / element `id`) when the page author set
//! them, and from an [`IdGenerator`] otherwise.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a catalog product, unique within a cart and within the
/// discovery registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fallback id source for product cards without an id in markup.
///
/// A monotonically increasing counter seeded from the wall clock. Ids are
/// unique within one page lifetime, not across reloads.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: String,
    next: u64,
}

impl IdGenerator {
    /// Default prefix for generated ids.
    pub const DEFAULT_PREFIX: &'static str = "prod-";

    /// Create a generator seeded from the current time in milliseconds.
    #[must_use]
    pub fn seeded_from_clock(prefix: impl Into<String>) -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self::starting_at(prefix, u64::try_from(millis).unwrap_or(0))
    }

    /// Create a generator whose first id uses `seed`.
    #[must_use]
    pub fn starting_at(prefix: impl Into<String>, seed: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: seed,
        }
    }

    /// Produce the next id and advance the counter.
    pub fn next_id(&mut self) -> ProductId {
        let id = ProductId(format!("{}{}", self.prefix, self.next));
        self.next = self.next.wrapping_add(1);
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::seeded_from_clock(Self::DEFAULT_PREFIX)
    }
}
