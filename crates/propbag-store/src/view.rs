//! Read-only lookups across the alias index and the property store.

use propbag_core::{EntryId, Value};

use crate::alias::AliasIndex;
use crate::bag::PropertyStore;
use crate::variables::VariableStore;

/// Borrowed view resolving `id-or-alias` tokens to property values.
///
/// Macro rendering and stock formulas both read through this view, so a
/// name means the same entry everywhere.
#[derive(Debug)]
pub struct StoreView<'a, S> {
    aliases: &'a AliasIndex,
    store: &'a PropertyStore<S>,
}

impl<S> Clone for StoreView<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for StoreView<'_, S> {}

impl<'a, S: VariableStore> StoreView<'a, S> {
    /// Pair an alias index with a store.
    pub fn new(aliases: &'a AliasIndex, store: &'a PropertyStore<S>) -> Self {
        Self { aliases, store }
    }

    /// Resolve an id-or-alias token.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<EntryId> {
        self.aliases.resolve(token)
    }

    /// Read a property of a resolved entry.
    #[must_use]
    pub fn property(&self, id: EntryId, key: &str) -> Value {
        self.store.get_property(id, key).unwrap_or_default()
    }

    /// Resolve `owner` and read `key`, [`Value::Undefined`] if either step
    /// finds nothing.
    #[must_use]
    pub fn lookup(&self, owner: &str, key: &str) -> Value {
        self.resolve(owner)
            .map_or(Value::Undefined, |id| self.property(id, key))
    }

    /// The host's scalar value of a variable.
    #[must_use]
    pub fn variable(&self, id: EntryId) -> Value {
        self.store.store().scalar(id)
    }

    /// The alias half of the view.
    #[must_use]
    pub fn aliases(&self) -> &'a AliasIndex {
        self.aliases
    }

    /// The store half of the view.
    #[must_use]
    pub fn store(&self) -> &'a PropertyStore<S> {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use propbag_core::KeyPolicy;

    use super::*;
    use crate::variables::Variables;

    #[test]
    fn test_lookup_through_alias() {
        let policy = KeyPolicy::case_insensitive();
        let mut store = PropertyStore::new(Variables::new(), policy);
        let mut aliases = AliasIndex::new(policy);
        store.set_property(8, "Level", 12).unwrap();
        aliases.upsert(EntryId::new(8).unwrap(), "Hero");

        let view = StoreView::new(&aliases, &store);
        assert_eq!(view.lookup("HERO", "level"), Value::Int(12));
        assert_eq!(view.lookup("8", "level"), Value::Int(12));
        assert_eq!(view.lookup("villain", "level"), Value::Undefined);
        assert_eq!(view.variable(EntryId::new(8).unwrap()), Value::Undefined);
        assert_eq!(view.variable(EntryId::new(9).unwrap()), Value::Int(0));
    }
}
