//! Item notes supplied by the host.

use std::collections::BTreeMap;

use propbag_core::ItemId;
use serde::{Deserialize, Serialize};

/// Read access to the host's item database.
pub trait ItemCatalog {
    /// The free-form note of an item, if the item exists.
    fn note(&self, item: ItemId) -> Option<&str>;
}

/// In-memory item notes, loadable from a JSON object of `id -> note`.
///
/// # Example
///
/// ```
/// use propbag_core::ItemId;
/// use propbag_stock::{ItemCatalog, ItemNotes};
///
/// let notes: ItemNotes = serde_json::from_str(r#"{"7": "<GStocks: 3>"}"#).unwrap();
/// assert_eq!(notes.note(ItemId::new(7)), Some("<GStocks: 3>"));
/// assert_eq!(notes.note(ItemId::new(8)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemNotes(BTreeMap<ItemId, String>);

impl ItemNotes {
    /// No items.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the note of an item.
    pub fn insert(&mut self, item: ItemId, note: impl Into<String>) {
        self.0.insert(item, note.into());
    }

    /// Builder form of [`ItemNotes::insert`].
    #[must_use]
    pub fn with(mut self, item: u32, note: impl Into<String>) -> Self {
        self.insert(ItemId::new(item), note);
        self
    }

    /// Item ids in order.
    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.0.keys().copied()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl ItemCatalog for ItemNotes {
    fn note(&self, item: ItemId) -> Option<&str> {
        self.0.get(&item).map(String::as_str)
    }
}

impl<C: ItemCatalog + ?Sized> ItemCatalog for &C {
    fn note(&self, item: ItemId) -> Option<&str> {
        (**self).note(item)
    }
}
