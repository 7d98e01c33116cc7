use std::collections::BTreeSet;

use super::SealId;

/// A seal together with the tag names it carries.
///
/// Tag names are kept as a set; the store may return them in any order and
/// membership is all that matters for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSeal {
    id: SealId,
    tags: BTreeSet<String>,
}

impl TaggedSeal {
    /// Creates a seal with no tags.
    pub fn untagged(id: SealId) -> Self {
        Self {
            id,
            tags: BTreeSet::new(),
        }
    }

    /// Creates a seal carrying the given tag names.
    ///
    /// # Examples
    ///
    /// ```
    /// use sealmap::{SealId, TaggedSeal};
    ///
    /// let seal = TaggedSeal::new(SealId::new(1), ["wax", "red", "wax"]);
    /// assert_eq!(seal.tags().count(), 2);
    /// assert!(seal.has_tag("red"));
    /// ```
    pub fn new<I, S>(id: SealId, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the seal's identifier.
    pub fn id(&self) -> SealId {
        self.id
    }

    /// Iterates the tag names in lexicographic order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Returns true if the seal carries `name`.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    /// Returns true if the seal carries no tags at all.
    pub fn is_untagged(&self) -> bool {
        self.tags.is_empty()
    }

    /// Adds a tag name to this seal.
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.insert(name.into());
    }
}
