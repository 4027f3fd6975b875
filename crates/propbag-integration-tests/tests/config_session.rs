//! Configuration files driving a session.

use std::collections::HashMap;

use propbag_config::{ConfigError, ConfigLayer, ShowFormat, loader};
use propbag_core::Value;
use propbag_runtime::{Session, config_bridge};
use propbag_test::prelude::*;

fn no_env() -> HashMap<String, String> {
    HashMap::new()
}

#[test]
fn test_defaults_give_a_plain_session() {
    let home = TestHome::new();
    let resolved = loader::load_with_env(None, Some(home.path()), &no_env()).unwrap();
    let session = Session::from_config(&resolved.config).unwrap();

    assert!(!session.alias_tracking());
    assert!(!session.options().policy.case_sensitive);
    assert!(resolved.loaded_files.is_empty());
}

#[test]
fn test_user_file_configures_session() {
    let home = TestHome::new().with_config(
        r#"
[keys]
case_sensitive = true

[aliases]
name_slot = 50

[macros]
code = "PROP"
"#,
    );
    let resolved = loader::load_with_env(None, Some(home.path()), &no_env()).unwrap();
    let mut session = Session::from_config(&resolved.config).unwrap();

    assert!(session.alias_tracking());
    assert!(session.set_property(50, "a", 1).is_err());

    session.set_property(1, "Key", 3).unwrap();
    assert_eq!(session.get_property(1, "key").unwrap(), Value::Undefined);
    assert_eq!(session.render("\\PROP[1:Key]"), "3");

    assert_eq!(
        resolved.field_sources.get("aliases.name_slot"),
        Some(&ConfigLayer::User)
    );
}

#[test]
fn test_explicit_file_overrides_user() {
    let home = TestHome::new().with_config("[aliases]\nname_slot = 50\n");
    let explicit = home.create_file("other.toml", "[aliases]\nname_slot = 60\n");

    let resolved = loader::load_with_env(Some(&explicit), Some(home.path()), &no_env()).unwrap();
    let options = config_bridge::to_session_options(&resolved.config).unwrap();
    assert_eq!(options.name_slot, Some(test_entry(60)));
    assert_eq!(resolved.loaded_files.len(), 2);
}

#[test]
fn test_env_fills_unset_fields() {
    let home = TestHome::new();
    let env = HashMap::from([("PROPBAG_NAME_SLOT".to_owned(), "42".to_owned())]);
    let resolved = loader::load_with_env(None, Some(home.path()), &env).unwrap();
    assert_eq!(resolved.config.aliases.name_slot, 42);

    let shown = resolved.show(ShowFormat::Toml, Some("aliases")).unwrap();
    assert!(shown.contains("name_slot = 42  # [env]"));
}

#[test]
fn test_invalid_name_slot_rejected() {
    let home = TestHome::new().with_config("[aliases]\nname_slot = 10000\n");
    let err = loader::load_with_env(None, Some(home.path()), &no_env()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "aliases.name_slot", .. }));
}

#[test]
fn test_shop_section_reaches_shop() {
    let home = TestHome::new().with_config(
        "[shop]\nhide_sold_out = false\nsold_out_message = \"GONE\"\n",
    );
    let resolved = loader::load_with_env(None, Some(home.path()), &no_env()).unwrap();
    let mut session = Session::from_config(&resolved.config)
        .unwrap()
        .with_notes(stock_catalog());

    session.record_purchase(GEM, 3);
    let goods = vec![propbag_stock::ShopGood::item(GEM.get())];
    assert_eq!(session.visible_goods(goods.clone()).unwrap(), goods);
    assert_eq!(session.sold_out_badge(GEM).unwrap().unwrap().message, "GONE");
}
