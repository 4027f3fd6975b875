use propbag_core::{EntryId, ItemId, KeyPolicy, Value};
use propbag_stock::{ItemNotes, ShopConfig, ShopGood, StockError};
use propbag_store::{ArithOp, StoreError};
use propbag_text::MacroResolver;

use super::*;

fn id(raw: i64) -> EntryId {
    EntryId::new(raw).unwrap()
}

/// Alias tracking on, with name slot 50.
fn tracking() -> Session {
    Session::with_options(SessionOptions {
        name_slot: Some(id(50)),
        ..SessionOptions::default()
    })
}

fn notes() -> ItemNotes {
    ItemNotes::new()
        .with(1, "<GStocks: 3>")
        .with(2, "<GStocks Var: 31>")
        .with(3, "<GStocks Eval: prop(hero, level) >= 10 ? 5 : 1>")
        .with(4, "A plain potion.")
        .with(5, "<GStocks Eval: v[1] +>")
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_set_and_get() {
    let mut session = Session::new();
    session.set_property(1, "A", 4).unwrap();
    assert_eq!(session.get_property(1, "a").unwrap(), Value::Int(4));
    assert_eq!(session.get_property(1, "b").unwrap(), Value::Undefined);
}

#[test]
fn test_invalid_id_rejected_without_mutation() {
    let mut session = Session::new();
    for bad in [0, 10_000, -1] {
        let err = session.set_property(bad, "a", 1).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::StoreError(StoreError::InvalidId { id }) if id == bad
        ));
    }
    assert!(session.variables().is_empty());
    assert!(session.get_property(0, "a").is_err());
}

#[test]
fn test_setup_keeps_existing_bag() {
    let mut session = Session::new();
    session.set_property(3, "x", 1).unwrap();
    session.setup_var(3).unwrap();
    assert_eq!(session.get_property(3, "x").unwrap(), Value::Int(1));
    assert_eq!(session.property_keys(3).unwrap(), vec!["x".to_owned()]);
}

#[test]
fn test_host_write_discards_properties() {
    let mut session = Session::new();
    session.set_property(3, "x", 1).unwrap();
    session.set_variable(3, 9).unwrap();
    assert_eq!(session.get_property(3, "x").unwrap(), Value::Undefined);
    assert_eq!(session.variable(3).unwrap(), Value::Int(9));
}

#[test]
fn test_sequences() {
    let mut session = Session::new();
    session.set_property(2, "bag", "createNewArray").unwrap();
    session.push_to_property(2, "bag", "Potion").unwrap();
    session.push_to_property(2, "bag", 3).unwrap();
    assert_eq!(session.sequence_length(2, "bag").unwrap(), 2);

    let err = session.push_to_property(2, "missing", 1).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::StoreError(StoreError::NotASequence { .. })
    ));
}

#[test]
fn test_change_property() {
    let mut session = Session::new();
    session.set_property(1, "gold", 5).unwrap();
    assert_eq!(
        session.change_property(ArithOp::Add, 1, 1, "gold").unwrap(),
        Value::Int(6)
    );
    assert_eq!(
        session.change_property(ArithOp::Div, 4, 1, "gold").unwrap(),
        Value::Int(2)
    );

    session.set_property(1, "name", "Mark").unwrap();
    let err = session
        .change_property(ArithOp::Add, 1, 1, "name")
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::StoreError(StoreError::NotANumber { .. })
    ));
    assert_eq!(session.get_property(1, "name").unwrap(), Value::from("Mark"));
}

#[test]
fn test_remove_and_has_property() {
    let mut session = Session::new();
    session.set_property(1, "a", 1).unwrap();
    assert!(session.has_property(1, "A").unwrap());
    assert_eq!(session.remove_property(1, "a").unwrap(), Value::Int(1));
    assert!(!session.has_property(1, "a").unwrap());
}

#[test]
fn test_case_sensitive_session() {
    let mut session = Session::with_options(SessionOptions {
        policy: KeyPolicy::case_sensitive(),
        ..SessionOptions::default()
    });
    session.set_property(1, "Key", 1).unwrap();
    assert_eq!(session.get_property(1, "key").unwrap(), Value::Undefined);
    assert_eq!(session.get_property(1, "Key").unwrap(), Value::Int(1));
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

#[test]
fn test_name_entry_round_trip() {
    let mut session = Session::new();
    session.name_entry(7, "Mark").unwrap();
    assert_eq!(session.resolve("mark"), Some(id(7)));

    session.name_entry(7, "NewName").unwrap();
    assert_eq!(session.resolve("mark"), None);
    assert_eq!(session.resolve("newname"), Some(id(7)));
}

#[test]
fn test_numeric_tokens_bypass_aliases() {
    let mut session = Session::new();
    session.name_entry(7, "12").unwrap();
    assert_eq!(session.aliases().lookup("12"), Some(id(7)));
    assert_eq!(session.resolve("12"), Some(id(12)));
    assert_eq!(session.resolve("0"), None);
}

#[test]
fn test_tracking_names_entries_on_write() {
    let mut session = tracking();
    session.set_variable_name(4, "Shopkeeper").unwrap();
    assert_eq!(session.resolve("shopkeeper"), None);

    session.set_property(4, "mood", "happy").unwrap();
    assert_eq!(session.resolve("shopkeeper"), Some(id(4)));

    // A relabel is picked up on the next write.
    session.set_variable_name(4, "Merchant").unwrap();
    session.set_property(4, "mood", "sad").unwrap();
    assert_eq!(session.resolve("merchant"), Some(id(4)));
    assert_eq!(session.resolve("shopkeeper"), None);
}

#[test]
fn test_no_tracking_without_name_slot() {
    let mut session = Session::new();
    assert!(!session.alias_tracking());
    session.set_variable_name(4, "Shopkeeper").unwrap();
    session.set_property(4, "mood", "happy").unwrap();
    assert_eq!(session.resolve("shopkeeper"), None);
}

#[test]
fn test_name_slot_is_reserved() {
    let mut session = tracking();
    let err = session.set_property(50, "a", 1).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::StoreError(StoreError::ReservedSlot { .. })
    ));
    assert!(session.setup_var(50).is_err());
    assert_eq!(session.get_property(50, "a").unwrap(), Value::Undefined);
}

// ---------------------------------------------------------------------------
// Text and commands
// ---------------------------------------------------------------------------

#[test]
fn test_render() {
    let mut session = Session::new();
    session.set_property(1, "a", 4).unwrap();
    session.set_property(1, "b", true).unwrap();
    session.set_property(1, "d", "Mark").unwrap();
    session.name_entry(1, "Hero").unwrap();

    assert_eq!(
        session.render("\\VOBJ[1:a] \\vobj[hero:B] \x1bVOBJ[HERO:d]"),
        "4 true Mark"
    );
    assert_eq!(session.render("\\VOBJ[1:c]"), "undefined");
    assert_eq!(session.render("\\VOBJ[ghost:a]"), "undefined");
    assert_eq!(session.render("\\VOBJ[10000:a]"), "undefined");
}

#[test]
fn test_render_custom_code() {
    let mut session = Session::with_options(SessionOptions {
        macros: MacroResolver::with_code("PROP").unwrap(),
        ..SessionOptions::default()
    });
    session.set_property(1, "a", 1).unwrap();
    assert_eq!(session.render("\\PROP[1:a] \\VOBJ[1:a]"), "1 \\VOBJ[1:a]");
    assert_eq!(session.macro_references("\\PROP[1:a]").len(), 1);
}

#[test]
fn test_set_property_command() {
    let mut session = Session::new();
    session.name_entry(3, "Hero").unwrap();

    let written = session
        .run_command("Set Property", &["hero", "Title", "Dragon", "Slayer"])
        .unwrap();
    assert_eq!(written, Value::from("Dragon Slayer"));
    assert_eq!(session.get_property(3, "title").unwrap(), written);

    session.run_command("setProperty", &["3", "hp", "40"]).unwrap();
    assert_eq!(session.get_property(3, "hp").unwrap(), Value::Int(40));

    session
        .run_command("set_property", &["3", "bag", "createNewArray"])
        .unwrap();
    assert_eq!(session.sequence_length(3, "bag").unwrap(), 0);
}

#[test]
fn test_store_property_command() {
    let mut session = tracking();
    session.set_property(3, "hp", 40).unwrap();

    let stored = session
        .run_command("store property into variable", &["3", "hp", "31"])
        .unwrap();
    assert_eq!(stored, Value::Int(40));
    assert_eq!(session.variable(31).unwrap(), Value::Int(40));

    let err = session
        .run_command("store property", &["3", "hp", "50"])
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::StoreError(StoreError::ReservedSlot { .. })
    ));
}

#[test]
fn test_command_errors() {
    let mut session = Session::new();
    assert!(matches!(
        session.run_command("set property", &["ghost", "a", "1"]),
        Err(RuntimeError::StoreError(StoreError::UnknownEntry(name))) if name == "ghost"
    ));
    assert!(matches!(
        session.run_command("dance", &[]),
        Err(RuntimeError::StoreError(StoreError::Command { .. }))
    ));
    assert!(matches!(
        session.run_command("set property", &["1", "a"]),
        Err(RuntimeError::StoreError(StoreError::Command { .. }))
    ));
    // Numeric targets outside the id range are invalid ids, not unknown names.
    for target in ["0", "10000", "-3"] {
        assert!(matches!(
            session.run_command("set property", &[target, "a", "1"]),
            Err(RuntimeError::StoreError(StoreError::InvalidId { .. }))
        ));
    }
    assert!(matches!(
        session.run_command("store property", &["0", "a", "2"]),
        Err(RuntimeError::StoreError(StoreError::InvalidId { .. }))
    ));
}

// ---------------------------------------------------------------------------
// Stock
// ---------------------------------------------------------------------------

#[test]
fn test_stock_lifecycle() {
    let mut session = Session::new().with_notes(notes());
    let gem = ItemId::new(1);

    assert!(session.is_stock_item(gem));
    assert!(!session.is_stock_item(ItemId::new(4)));
    assert_eq!(session.get_item_stock(gem).unwrap(), 3);

    for _ in 0..3 {
        assert!(!session.has_bought_max(gem).unwrap());
        session.add_bought_item(gem);
    }
    assert!(session.has_bought_max(gem).unwrap());
    assert_eq!(session.remaining(gem).unwrap(), 0);

    assert!(session.reset_bought(gem));
    assert_eq!(session.has_bought_count(gem), 0);
}

#[test]
fn test_variable_and_formula_stock() {
    let mut session = Session::new().with_notes(notes());
    session.set_variable(31, 2).unwrap();
    assert_eq!(session.get_item_stock(ItemId::new(2)).unwrap(), 2);

    // The formula reads a property through an alias.
    session.name_entry(1, "Hero").unwrap();
    session.set_property(1, "level", 3).unwrap();
    assert_eq!(session.get_item_stock(ItemId::new(3)).unwrap(), 1);
    session.set_property(1, "level", 12).unwrap();
    assert_eq!(session.get_item_stock(ItemId::new(3)).unwrap(), 5);
}

#[test]
fn test_formula_errors_reach_the_caller() {
    let mut session = Session::new().with_notes(notes());
    let err = session.get_item_stock(ItemId::new(5)).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::StockError(StockError::Formula { .. })
    ));
    assert!(session.filter_sold_out(vec![ItemId::new(5)]).is_err());
}

#[test]
fn test_filter_and_reset_all() {
    let mut session = Session::new().with_notes(notes());
    session.record_purchase(ItemId::new(1), 3);

    let goods = vec![ShopGood::item(1), ShopGood::weapon(1), ShopGood::item(4)];
    let visible = session.visible_goods(goods.clone()).unwrap();
    assert_eq!(visible, vec![ShopGood::weapon(1), ShopGood::item(4)]);

    session.reset_all();
    assert_eq!(session.visible_goods(goods.clone()).unwrap(), goods);
}

#[test]
fn test_shop_helpers() {
    let mut session = Session::new().with_notes(notes());
    let gem = ItemId::new(1);

    assert_eq!(session.max_buy(gem, 99, 10, 1000).unwrap(), 3);
    assert_eq!(session.quantity_label(gem, 1).unwrap(), "1/3");
    assert_eq!(session.sold_out_badge(gem).unwrap(), None);

    assert!(session.record_purchase(gem, 3));
    assert_eq!(session.max_buy(gem, 99, 10, 1000).unwrap(), 0);
    let badge = session.sold_out_badge(gem).unwrap().unwrap();
    assert_eq!(badge.message, ShopConfig::default().sold_out_message);

    assert!(!session.record_purchase(ItemId::new(4), 1));
}

#[test]
fn test_reset_keeps_notes_and_names() {
    let mut session = tracking().with_notes(notes());
    session.set_variable_name(1, "Hero").unwrap();
    session.set_property(1, "a", 1).unwrap();
    session.add_bought_item(ItemId::new(1));

    session.reset();

    assert!(session.variables().is_empty());
    assert!(session.aliases().is_empty());
    assert!(session.ledger().is_empty());
    assert_eq!(session.notes().len(), 5);
    assert_eq!(session.names().name(id(1)), Some("Hero"));
}

#[test]
fn test_from_config() {
    let mut cfg = propbag_config::Config::default();
    cfg.aliases.name_slot = 50;
    cfg.keys.case_sensitive = true;
    let session = Session::from_config(&cfg).unwrap();

    assert!(session.alias_tracking());
    let options = session.options();
    assert_eq!(options.name_slot, Some(id(50)));
    assert!(options.policy.case_sensitive);
}
