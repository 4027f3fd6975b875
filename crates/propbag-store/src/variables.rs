//! The host variable store.
//!
//! The host owns a flat mapping from entry id to value and persists it
//! itself. [`VariableStore`] is the seam the core reads and writes through;
//! [`Variables`] is the in-memory implementation used by sessions and tests.

use std::collections::BTreeMap;

use propbag_core::{EntryId, Value};
use serde::{Deserialize, Serialize};

/// A slot promoted to hold named properties.
///
/// Keys are stored already normalized.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, Value>);

impl PropertyBag {
    /// An empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a property by normalized key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Mutable lookup by normalized key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Write a property, returning the previous value.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Remove a property, returning it.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Iterate over the normalized keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Contents of one host slot.
///
/// Serializes untagged, so a bag is a JSON object and a scalar is the plain
/// value, which is how the host persists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    /// Named properties.
    Bag(PropertyBag),
    /// A raw host value.
    Scalar(Value),
}

impl Slot {
    /// Borrow the bag, if the slot has been promoted.
    #[must_use]
    pub fn as_bag(&self) -> Option<&PropertyBag> {
        match self {
            Self::Bag(bag) => Some(bag),
            Self::Scalar(_) => None,
        }
    }

    /// Whether the slot has been promoted to a bag.
    #[must_use]
    pub fn is_bag(&self) -> bool {
        matches!(self, Self::Bag(_))
    }

    /// Promote to an empty bag unless already one, and borrow the bag.
    ///
    /// Scalar content is discarded without reconciliation.
    pub fn promote(&mut self) -> &mut PropertyBag {
        match self {
            Self::Bag(bag) => bag,
            Self::Scalar(_) => {
                *self = Self::Bag(PropertyBag::new());
                self.promote()
            },
        }
    }
}

/// Mutable id-addressed storage supplied by the host.
pub trait VariableStore {
    /// Borrow a slot. `None` means the host never wrote it.
    fn slot(&self, id: EntryId) -> Option<&Slot>;

    /// Mutably borrow a slot.
    fn slot_mut(&mut self, id: EntryId) -> Option<&mut Slot>;

    /// Replace a slot wholesale.
    fn set_slot(&mut self, id: EntryId, slot: Slot);

    /// Borrow a slot, first writing `slot` if the host never wrote it.
    fn slot_or_insert(&mut self, id: EntryId, slot: Slot) -> &mut Slot;

    /// The scalar view of a slot as the host reports it.
    ///
    /// Unwritten slots read as `0`; promoted slots have no scalar and read
    /// as [`Value::Undefined`].
    fn scalar(&self, id: EntryId) -> Value {
        match self.slot(id) {
            None => Value::Int(0),
            Some(Slot::Scalar(value)) => value.clone(),
            Some(Slot::Bag(_)) => Value::Undefined,
        }
    }
}

impl<T: VariableStore + ?Sized> VariableStore for &mut T {
    fn slot(&self, id: EntryId) -> Option<&Slot> {
        (**self).slot(id)
    }

    fn slot_mut(&mut self, id: EntryId) -> Option<&mut Slot> {
        (**self).slot_mut(id)
    }

    fn set_slot(&mut self, id: EntryId, slot: Slot) {
        (**self).set_slot(id, slot);
    }

    fn slot_or_insert(&mut self, id: EntryId, slot: Slot) -> &mut Slot {
        (**self).slot_or_insert(id, slot)
    }
}

/// In-memory variable store.
///
/// # Example
///
/// ```
/// use propbag_core::{EntryId, Value};
/// use propbag_store::{Variables, VariableStore};
///
/// let mut vars = Variables::new();
/// let id = EntryId::new(31).unwrap();
/// assert_eq!(vars.scalar(id), Value::Int(0));
///
/// vars.set(id, Value::Int(3));
/// assert_eq!(vars.scalar(id), Value::Int(3));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variables {
    slots: BTreeMap<EntryId, Slot>,
}

impl Variables {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a scalar, discarding whatever the slot held (bags included).
    pub fn set(&mut self, id: EntryId, value: impl Into<Value>) {
        self.slots.insert(id, Slot::Scalar(value.into()));
    }

    /// Number of written slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterate over written slots in id order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryId, &Slot)> {
        self.slots.iter().map(|(id, slot)| (*id, slot))
    }

    /// Forget every slot.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl VariableStore for Variables {
    fn slot(&self, id: EntryId) -> Option<&Slot> {
        self.slots.get(&id)
    }

    fn slot_mut(&mut self, id: EntryId) -> Option<&mut Slot> {
        self.slots.get_mut(&id)
    }

    fn set_slot(&mut self, id: EntryId, slot: Slot) {
        self.slots.insert(id, slot);
    }

    fn slot_or_insert(&mut self, id: EntryId, slot: Slot) -> &mut Slot {
        self.slots.entry(id).or_insert(slot)
    }
}
