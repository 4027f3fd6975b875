//! Properties, aliases, macros and host commands working together.

use propbag_core::{KeyPolicy, Value};
use propbag_runtime::{RuntimeError, Session};
use propbag_store::{ArithOp, PropertyStore, StoreError};
use propbag_test::prelude::*;

// ---------------------------------------------------------------------------
// Entries named by the host editor
// ---------------------------------------------------------------------------

#[test]
fn test_labels_become_aliases_on_first_write() {
    setup_test_logging_default();
    let mut session = tracking_session();

    // Labelled but never written: not an alias yet.
    assert_eq!(session.resolve("hero"), None);

    session.set_property(1, "level", 7).unwrap();
    session.set_property(2, "mood", "grumpy").unwrap();

    assert_eq!(session.resolve("HERO"), Some(test_entry(1)));
    assert_eq!(session.resolve("shopkeeper"), Some(test_entry(2)));
    assert_eq!(
        session.render("\\VOBJ[Hero:level] meets a \\VOBJ[shopkeeper:mood] shopkeeper"),
        "7 meets a grumpy shopkeeper"
    );
}

#[test]
fn test_commands_address_entries_by_name() {
    let mut session = tracking_session();
    session.setup_var(3).unwrap();
    session.set_property(3, "opened", false).unwrap();

    session
        .run_command("Set Property", &["chest", "opened", "true"])
        .unwrap();
    session
        .run_command("Set Property", &["chest", "loot", "createNewArray"])
        .unwrap();
    session.push_to_property(3, "loot", "Gem").unwrap();
    session.push_to_property(3, "loot", "Bread").unwrap();

    assert_eq!(session.lookup("chest", "opened"), Value::Bool(true));
    assert_eq!(session.sequence_length(3, "loot").unwrap(), 2);

    session
        .run_command("Store Property", &["chest", "opened", "20"])
        .unwrap();
    assert_eq!(session.variable(20).unwrap(), Value::Bool(true));
}

#[test]
fn test_gold_counter() {
    let mut session = Session::new();
    session.name_entry(9, "Bank").unwrap();
    session.run_command("setProperty", &["bank", "gold", "100"]).unwrap();

    session.change_property(ArithOp::Sub, 30, 9, "gold").unwrap();
    session.change_property(ArithOp::Mul, 2, 9, "gold").unwrap();
    assert_eq!(session.render("\\VOBJ[bank:GOLD]g"), "140g");
}

#[test]
fn test_macro_references_are_listed_in_order() {
    let session = Session::new();
    let refs = session.macro_references("\\VOBJ[hero:a] and \\VOBJ[2:b]");
    assert_eq!(refs.len(), 2);
}

// ---------------------------------------------------------------------------
// Rejections leave the host store untouched
// ---------------------------------------------------------------------------

#[test]
fn test_rejected_writes_never_reach_the_host() {
    let mut store = PropertyStore::new(RecordingStore::new(), KeyPolicy::default())
        .with_reserved(Some(test_entry(i64::from(NAME_SLOT))));

    assert!(matches!(
        store.set_property(0, "a", 1),
        Err(StoreError::InvalidId { id: 0 })
    ));
    assert!(matches!(
        store.set_property(10_000, "a", 1),
        Err(StoreError::InvalidId { .. })
    ));
    assert!(matches!(
        store.set_property(i64::from(NAME_SLOT), "a", 1),
        Err(StoreError::ReservedSlot { .. })
    ));
    assert_eq!(store.store().writes(), 0);

    store.set_property(1, "a", 1).unwrap();
    assert!(store.store().writes() > 0);
    assert_eq!(store.store().inner().len(), 1);
}

#[test]
fn test_unknown_command_target() {
    let mut session = tracking_session();
    let err = session
        .run_command("set property", &["nobody", "a", "1"])
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::StoreError(StoreError::UnknownEntry(_))
    ));
}
