//! Property bags over the host variable store.
//!
//! [`PropertyStore`] wraps a [`VariableStore`] and treats individual slots as
//! bags of named properties. Keys go through the store's [`KeyPolicy`]
//! before every read and write. A slot that is not yet a bag is promoted on
//! the first write, and its previous scalar content is discarded.

use propbag_core::{EntryId, IntoEntryId, KeyPolicy, Value};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::variables::{PropertyBag, Slot, VariableStore};

/// Bag-level view over a host variable store.
///
/// # Example
///
/// ```
/// use propbag_core::{KeyPolicy, Value};
/// use propbag_store::{PropertyStore, Variables};
///
/// let mut store = PropertyStore::new(Variables::new(), KeyPolicy::case_insensitive());
/// store.set_property(1, "Salt", 5).unwrap();
/// assert_eq!(store.get_property(1, "salt").unwrap(), Value::Int(5));
/// assert_eq!(store.get_property(1, "pepper").unwrap(), Value::Undefined);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertyStore<S> {
    store: S,
    policy: KeyPolicy,
    reserved: Option<EntryId>,
}

impl<S: VariableStore> PropertyStore<S> {
    /// Wrap a host store.
    pub fn new(store: S, policy: KeyPolicy) -> Self {
        Self {
            store,
            policy,
            reserved: None,
        }
    }

    /// Reserve a slot that property writes must never touch.
    #[must_use]
    pub fn with_reserved(mut self, reserved: Option<EntryId>) -> Self {
        self.reserved = reserved;
        self
    }

    /// The active key policy.
    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// The reserved slot, if any.
    pub fn reserved(&self) -> Option<EntryId> {
        self.reserved
    }

    /// Borrow the underlying host store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrow the underlying host store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Unwrap into the host store.
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Ensure the slot is a bag, creating an empty one if needed.
    ///
    /// An existing bag keeps its properties.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] for out-of-range ids, [`StoreError::ReservedSlot`]
    /// for the alias slot.
    pub fn setup(&mut self, id: impl IntoEntryId) -> StoreResult<()> {
        let id = self.writable(id, "setup")?;
        self.bag_mut(id);
        Ok(())
    }

    /// Write a property, promoting the slot to a bag if needed.
    ///
    /// Writing the `createNewArray` sentinel stores an empty sequence.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] or [`StoreError::ReservedSlot`]; nothing is
    /// written in either case.
    pub fn set_property(
        &mut self,
        id: impl IntoEntryId,
        key: &str,
        value: impl Into<Value>,
    ) -> StoreResult<()> {
        let id = self.writable(id, "set_property")?;
        let key = self.policy.normalize(key).into_owned();
        let value = value.into();
        let value = if value.is_create_sequence() {
            Value::List(Vec::new())
        } else {
            value
        };
        debug!(%id, key = %key, value = %value, "set property");
        self.bag_mut(id).insert(key, value);
        Ok(())
    }

    /// Read a property.
    ///
    /// Returns [`Value::Undefined`] when the slot is not a bag or the key is
    /// absent. That is an expected outcome, not an error.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] for out-of-range ids.
    pub fn get_property(&self, id: impl IntoEntryId, key: &str) -> StoreResult<Value> {
        let id = checked(id, "get_property")?;
        Ok(self.lookup(id, key).cloned().unwrap_or_default())
    }

    /// Whether the slot is a bag holding `key`.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] for out-of-range ids.
    pub fn has_property(&self, id: impl IntoEntryId, key: &str) -> StoreResult<bool> {
        let id = checked(id, "has_property")?;
        Ok(self.lookup(id, key).is_some())
    }

    /// Normalized keys of a bag, in order. Empty for non-bag slots.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] for out-of-range ids.
    pub fn property_keys(&self, id: impl IntoEntryId) -> StoreResult<Vec<String>> {
        let id = checked(id, "property_keys")?;
        Ok(self
            .store
            .slot(id)
            .and_then(Slot::as_bag)
            .map(|bag| bag.keys().map(str::to_owned).collect())
            .unwrap_or_default())
    }

    /// Remove a property, returning what it held.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] or [`StoreError::ReservedSlot`].
    pub fn remove_property(&mut self, id: impl IntoEntryId, key: &str) -> StoreResult<Value> {
        let id = self.writable(id, "remove_property")?;
        let key = self.policy.normalize(key);
        let removed = match self.store.slot_mut(id) {
            Some(Slot::Bag(bag)) => bag.remove(&key),
            _ => None,
        };
        Ok(removed.unwrap_or_default())
    }

    /// Append to the sequence stored at `key`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotASequence`] when the property is absent or holds
    /// something else; [`StoreError::InvalidId`] or
    /// [`StoreError::ReservedSlot`] for bad ids.
    pub fn push_to_property(
        &mut self,
        id: impl IntoEntryId,
        key: &str,
        value: impl Into<Value>,
    ) -> StoreResult<()> {
        let id = self.writable(id, "push_to_property")?;
        let key = self.policy.normalize(key).into_owned();
        let slot = match self.store.slot_mut(id) {
            Some(Slot::Bag(bag)) => bag.get_mut(&key),
            _ => None,
        };
        match slot {
            Some(Value::List(items)) => {
                items.push(value.into());
                Ok(())
            },
            other => Err(StoreError::NotASequence {
                id,
                found: other.map_or("undefined", |v| v.type_name()),
                key,
            }),
        }
    }

    /// Length of the sequence stored at `key`.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotASequence`] when the property is absent or holds
    /// something else; [`StoreError::InvalidId`] for bad ids.
    pub fn sequence_length(&self, id: impl IntoEntryId, key: &str) -> StoreResult<usize> {
        let id = checked(id, "sequence_length")?;
        match self.lookup(id, key) {
            Some(Value::List(items)) => Ok(items.len()),
            other => Err(StoreError::NotASequence {
                id,
                key: self.policy.normalize(key).into_owned(),
                found: other.map_or("undefined", Value::type_name),
            }),
        }
    }

    fn lookup(&self, id: EntryId, key: &str) -> Option<&Value> {
        let key = self.policy.normalize(key);
        self.store.slot(id)?.as_bag()?.get(&key)
    }

    /// Borrow the bag at `id`, promoting the slot first if it is not one.
    fn bag_mut(&mut self, id: EntryId) -> &mut PropertyBag {
        let slot = self
            .store
            .slot_or_insert(id, Slot::Bag(PropertyBag::new()));
        if !slot.is_bag() {
            debug!(%id, "promoting slot to property bag");
        }
        slot.promote()
    }

    fn writable(&self, id: impl IntoEntryId, op: &'static str) -> StoreResult<EntryId> {
        let id = checked(id, op)?;
        if self.reserved == Some(id) {
            warn!(%id, op, "refusing to write the alias name slot");
            return Err(StoreError::ReservedSlot { id });
        }
        Ok(id)
    }
}

/// Validate an id at the API boundary, reporting rejections.
fn checked(id: impl IntoEntryId, op: &'static str) -> StoreResult<EntryId> {
    id.into_entry_id().map_err(|err| {
        warn!(op, error = %err, "rejected entry id; nothing was changed");
        err.into()
    })
}

#[cfg(test)]
#[path = "bag_tests.rs"]
mod tests;
