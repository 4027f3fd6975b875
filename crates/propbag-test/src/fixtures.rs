//! Test fixtures for common types.

use propbag_core::{EntryId, ItemId};
use propbag_runtime::{Session, SessionOptions};
use propbag_stock::ItemNotes;
use propbag_store::VariableNames;

/// Literal stock of 3.
pub const GEM: ItemId = ItemId::new(1);
/// Stock read from variable [`BREAD_VAR`].
pub const BREAD: ItemId = ItemId::new(2);
/// Stock computed from the hero's level.
pub const ELIXIR: ItemId = ItemId::new(3);
/// No stock marker.
pub const POTION: ItemId = ItemId::new(4);
/// A formula that does not parse.
pub const BROKEN: ItemId = ItemId::new(5);

/// Variable holding the bread stock.
pub const BREAD_VAR: u32 = 31;
/// Reserved alias name slot used by [`tracking_session`].
pub const NAME_SLOT: u32 = 50;

/// Create a test entry id.
///
/// # Panics
///
/// Panics if `raw` is outside the entry range.
#[must_use]
pub fn test_entry(raw: i64) -> EntryId {
    EntryId::new(raw).expect("test entry id out of range")
}

/// Item notes covering every kind of stock marker.
#[must_use]
pub fn stock_catalog() -> ItemNotes {
    ItemNotes::new()
        .with(GEM.get(), "A rare gem.\n<GStocks: 3>")
        .with(BREAD.get(), "<GStocks Var: 31>")
        .with(ELIXIR.get(), "<GStocks Eval: prop(hero, level) >= 10 ? 5 : 1>")
        .with(POTION.get(), "Just a potion.")
        .with(BROKEN.get(), "<GStocks Eval: v[1] +>")
}

/// Host variable labels for a small cast.
#[must_use]
pub fn test_names() -> VariableNames {
    let mut names = VariableNames::new();
    names.set(test_entry(1), "Hero");
    names.set(test_entry(2), "Shopkeeper");
    names.set(test_entry(3), "Chest");
    names
}

/// A session with default options and [`stock_catalog`] loaded.
#[must_use]
pub fn test_session() -> Session {
    Session::new().with_notes(stock_catalog())
}

/// A session that tracks aliases through [`NAME_SLOT`], with
/// [`test_names`] and [`stock_catalog`] loaded.
#[must_use]
pub fn tracking_session() -> Session {
    Session::with_options(SessionOptions {
        name_slot: Some(test_entry(i64::from(NAME_SLOT))),
        ..SessionOptions::default()
    })
    .with_names(test_names())
    .with_notes(stock_catalog())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_every_marker() {
        assert_eq!(stock_catalog().len(), 5);
    }

    #[test]
    fn test_tracking_session() {
        let session = tracking_session();
        assert!(session.alias_tracking());
        assert_eq!(session.names().name(test_entry(1)), Some("Hero"));
    }
}
