//! Alias index: user-chosen names for numeric entry ids.
//!
//! The index is its own container, disjoint from the variable store. Each id
//! has at most one live name. Several ids may fold onto the same name; a
//! lookup then answers with whichever of them was named first, and falls
//! through to the next one when that id is renamed.

use std::collections::BTreeMap;

use propbag_core::{EntryId, KeyPolicy, parse_integer_token};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One persisted `(name, id)` pair.
///
/// The name is stored already normalized by the policy that was active when
/// it was inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    /// Normalized alias name.
    pub name: String,
    /// Entry the name points at.
    pub id: EntryId,
}

impl AliasRecord {
    /// Build a record from its parts.
    pub fn new(name: impl Into<String>, id: EntryId) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }
}

/// Name to id mapping with insertion-order tie breaking.
///
/// # Example
///
/// ```
/// use propbag_core::{EntryId, KeyPolicy};
/// use propbag_store::AliasIndex;
///
/// let mut aliases = AliasIndex::new(KeyPolicy::case_insensitive());
/// let hero = EntryId::new(2).unwrap();
/// aliases.upsert(hero, "Mark");
///
/// assert_eq!(aliases.resolve("mark"), Some(hero));
/// assert_eq!(aliases.resolve("2"), Some(hero));
/// assert_eq!(aliases.resolve("nobody"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    policy: KeyPolicy,
    by_id: BTreeMap<EntryId, Named>,
    by_name: BTreeMap<String, Vec<(u64, EntryId)>>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct Named {
    name: String,
    seq: u64,
}

impl AliasIndex {
    /// An empty index normalizing names with `policy`.
    #[must_use]
    pub fn new(policy: KeyPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Rebuild an index from persisted records, oldest first.
    ///
    /// Names are taken as stored and not normalized again, so records keep
    /// the folding they were written with even if the policy has changed
    /// since.
    pub fn from_records(policy: KeyPolicy, records: impl IntoIterator<Item = AliasRecord>) -> Self {
        let mut index = Self::new(policy);
        for record in records {
            index.insert_normalized(record.id, record.name);
        }
        index
    }

    /// The policy applied to new names and lookups.
    #[must_use]
    pub fn policy(&self) -> KeyPolicy {
        self.policy
    }

    /// Name `id`, replacing any name it had.
    ///
    /// The record moves to the back of the insertion order even when the
    /// name is unchanged.
    pub fn upsert(&mut self, id: EntryId, name: &str) {
        let name = self.policy.normalize(name).into_owned();
        debug!(%id, name = %name, "alias upsert");
        self.insert_normalized(id, name);
    }

    /// Drop the name of `id`, returning it.
    pub fn remove(&mut self, id: EntryId) -> Option<String> {
        let named = self.by_id.remove(&id)?;
        if let Some(ids) = self.by_name.get_mut(&named.name) {
            ids.retain(|(seq, _)| *seq != named.seq);
            if ids.is_empty() {
                self.by_name.remove(&named.name);
            }
        }
        Some(named.name)
    }

    /// Resolve a macro or command token to an entry id.
    ///
    /// Integer tokens bypass aliasing entirely; one outside the id range
    /// resolves to `None`. Anything else is normalized and looked up by name.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<EntryId> {
        if let Some(raw) = parse_integer_token(token) {
            return EntryId::new(raw).ok();
        }
        self.lookup(token)
    }

    /// Look a name up without the integer bypass.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<EntryId> {
        let name = self.policy.normalize(name);
        self.by_name
            .get(name.as_ref())
            .and_then(|ids| ids.first())
            .map(|(_, id)| *id)
    }

    /// The current name of `id`.
    #[must_use]
    pub fn name_of(&self, id: EntryId) -> Option<&str> {
        self.by_id.get(&id).map(|named| named.name.as_str())
    }

    /// Number of named entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no entry is named.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Records in insertion order, ready for persistence.
    #[must_use]
    pub fn records(&self) -> Vec<AliasRecord> {
        let mut named: Vec<_> = self.by_id.iter().collect();
        named.sort_by_key(|(_, named)| named.seq);
        named
            .into_iter()
            .map(|(id, named)| AliasRecord::new(named.name.clone(), *id))
            .collect()
    }

    /// Forget every name.
    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_name.clear();
    }

    fn insert_normalized(&mut self, id: EntryId, name: String) {
        self.remove(id);
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.by_name
            .entry(name.clone())
            .or_default()
            .push((seq, id));
        self.by_id.insert(id, Named { name, seq });
    }
}

/// Display names the host gives its variables.
///
/// When alias tracking is on, every property write names its entry after
/// the host's label for that variable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableNames(BTreeMap<EntryId, String>);

impl VariableNames {
    /// No names.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Label a variable.
    pub fn set(&mut self, id: EntryId, name: impl Into<String>) {
        self.0.insert(id, name.into());
    }

    /// The label of a variable; `None` when unset or blank.
    #[must_use]
    pub fn name(&self, id: EntryId) -> Option<&str> {
        self.0
            .get(&id)
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(EntryId, String)> for VariableNames {
    fn from_iter<I: IntoIterator<Item = (EntryId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: i64) -> EntryId {
        EntryId::new(raw).unwrap()
    }

    #[test]
    fn test_upsert_and_resolve_case_insensitive() {
        let mut aliases = AliasIndex::new(KeyPolicy::case_insensitive());
        aliases.upsert(id(2), "Mark");
        assert_eq!(aliases.resolve("mark"), Some(id(2)));
        assert_eq!(aliases.resolve("MARK"), Some(id(2)));
        assert_eq!(aliases.name_of(id(2)), Some("mark"));
    }

    #[test]
    fn test_case_sensitive_lookup() {
        let mut aliases = AliasIndex::new(KeyPolicy::case_sensitive());
        aliases.upsert(id(2), "Mark");
        assert_eq!(aliases.resolve("Mark"), Some(id(2)));
        assert_eq!(aliases.resolve("mark"), None);
    }

    #[test]
    fn test_integer_tokens_bypass_names() {
        let mut aliases = AliasIndex::new(KeyPolicy::default());
        // An alias that looks like a number can never win over the id.
        aliases.upsert(id(5), "7");
        assert_eq!(aliases.resolve("7"), Some(id(7)));
        assert_eq!(aliases.resolve(" 12 "), Some(id(12)));
        assert_eq!(aliases.resolve("0"), None);
        assert_eq!(aliases.resolve("10000"), None);
        assert_eq!(aliases.resolve("-4"), None);
    }

    #[test]
    fn test_upsert_replaces_previous_name() {
        let mut aliases = AliasIndex::new(KeyPolicy::default());
        aliases.upsert(id(3), "old");
        aliases.upsert(id(3), "new");
        assert_eq!(aliases.len(), 1);
        assert_eq!(aliases.resolve("old"), None);
        assert_eq!(aliases.resolve("new"), Some(id(3)));
    }

    #[test]
    fn test_collision_first_inserted_wins() {
        let mut aliases = AliasIndex::new(KeyPolicy::case_insensitive());
        aliases.upsert(id(4), "Hero");
        aliases.upsert(id(9), "HERO");
        assert_eq!(aliases.resolve("hero"), Some(id(4)));

        // Renaming the winner hands the name to the next record in order.
        aliases.upsert(id(4), "retired");
        assert_eq!(aliases.resolve("hero"), Some(id(9)));
    }

    #[test]
    fn test_reupsert_moves_to_back() {
        let mut aliases = AliasIndex::new(KeyPolicy::default());
        aliases.upsert(id(1), "twin");
        aliases.upsert(id(2), "twin");
        aliases.upsert(id(1), "twin");
        assert_eq!(aliases.resolve("twin"), Some(id(2)));
    }

    #[test]
    fn test_remove() {
        let mut aliases = AliasIndex::new(KeyPolicy::default());
        aliases.upsert(id(1), "a");
        assert_eq!(aliases.remove(id(1)), Some("a".to_owned()));
        assert_eq!(aliases.remove(id(1)), None);
        assert!(aliases.is_empty());
        assert_eq!(aliases.resolve("a"), None);
    }

    #[test]
    fn test_records_keep_insertion_order() {
        let mut aliases = AliasIndex::new(KeyPolicy::case_insensitive());
        aliases.upsert(id(9), "Zed");
        aliases.upsert(id(1), "Amy");
        aliases.upsert(id(9), "Zed");

        let records = aliases.records();
        assert_eq!(
            records,
            vec![AliasRecord::new("amy", id(1)), AliasRecord::new("zed", id(9))]
        );

        let restored = AliasIndex::from_records(KeyPolicy::case_insensitive(), records);
        assert_eq!(restored.resolve("Zed"), Some(id(9)));
        assert_eq!(restored.records(), aliases.records());
    }

    #[test]
    fn test_from_records_does_not_refold() {
        let records = vec![AliasRecord::new("Mark", id(2))];
        let index = AliasIndex::from_records(KeyPolicy::case_sensitive(), records);
        assert_eq!(index.resolve("Mark"), Some(id(2)));
        assert_eq!(index.resolve("mark"), None);
    }

    #[test]
    fn test_variable_names_skip_blank() {
        let mut names = VariableNames::new();
        names.set(id(1), "Gold");
        names.set(id(2), "  ");
        assert_eq!(names.name(id(1)), Some("Gold"));
        assert_eq!(names.name(id(2)), None);
        assert_eq!(names.name(id(3)), None);
    }
}
