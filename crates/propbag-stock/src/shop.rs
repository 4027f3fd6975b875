//! Shop-side helpers built on the ledger.
//!
//! A host shop asks these questions while listing goods, sizing the
//! quantity picker and recording a sale.

use propbag_core::ItemId;
use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::error::StockResult;
use crate::formula::EvalContext;
use crate::ledger::{StockKeyed, StockLedger};

/// Category of a shop entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoodKind {
    /// A regular item. Only these carry stocks.
    Item,
    /// A weapon.
    Weapon,
    /// An armor.
    Armor,
}

/// One entry of a host shop list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopGood {
    /// What kind of database entry `id` refers to.
    pub kind: GoodKind,
    /// Database id within that kind.
    pub id: u32,
    /// Price override; `None` uses the database price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u32>,
}

impl ShopGood {
    /// An item entry at its database price.
    #[must_use]
    pub fn item(id: u32) -> Self {
        Self {
            kind: GoodKind::Item,
            id,
            price: None,
        }
    }

    /// A weapon entry at its database price.
    #[must_use]
    pub fn weapon(id: u32) -> Self {
        Self {
            kind: GoodKind::Weapon,
            id,
            price: None,
        }
    }

    /// An armor entry at its database price.
    #[must_use]
    pub fn armor(id: u32) -> Self {
        Self {
            kind: GoodKind::Armor,
            id,
            price: None,
        }
    }
}

impl StockKeyed for ShopGood {
    fn stock_item(&self) -> Option<ItemId> {
        (self.kind == GoodKind::Item).then(|| ItemId::new(self.id))
    }
}

/// How shops present stock items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Show `number/remaining` in the quantity picker.
    pub display_remaining: bool,
    /// Remove sold-out items from shop lists.
    pub hide_sold_out: bool,
    /// Text drawn over sold-out items that are still listed. Empty for none.
    pub sold_out_message: String,
    /// Host text colour index for the message.
    pub sold_out_color: u8,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            display_remaining: true,
            hide_sold_out: true,
            sold_out_message: "OUT OF STOCK".to_owned(),
            sold_out_color: 18,
        }
    }
}

/// Overlay for a sold-out entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoldOutBadge {
    /// Text to draw.
    pub message: String,
    /// Host text colour index.
    pub color: u8,
}

/// A shop's view of the ledger for the duration of one interaction.
pub struct Shop<'a, C, E> {
    ledger: &'a mut StockLedger,
    catalog: &'a C,
    ctx: &'a E,
    config: &'a ShopConfig,
}

impl<'a, C: ItemCatalog, E: EvalContext> Shop<'a, C, E> {
    /// Bundle what the helpers need.
    pub fn new(
        ledger: &'a mut StockLedger,
        catalog: &'a C,
        ctx: &'a E,
        config: &'a ShopConfig,
    ) -> Self {
        Self {
            ledger,
            catalog,
            ctx,
            config,
        }
    }

    /// Record a completed sale of `quantity` units.
    ///
    /// Only stock items are counted; returns whether the item is one.
    pub fn record_purchase(&mut self, item: ItemId, quantity: u32) -> bool {
        if !self.ledger.is_stock_item(self.catalog, item) {
            return false;
        }
        self.ledger.add_bought(item, quantity);
        true
    }

    /// Clamp the host's per-item holding limit to the item's stock.
    ///
    /// # Errors
    ///
    /// Capacity errors from the item's note.
    pub fn party_limit(&mut self, item: ItemId, base_max: i64) -> StockResult<i64> {
        if !self.ledger.is_stock_item(self.catalog, item) {
            return Ok(base_max);
        }
        let stock = self.ledger.get_item_stock(self.catalog, self.ctx, item)?;
        Ok(base_max.min(stock))
    }

    /// Most units the buy window may offer.
    ///
    /// For stock items that is the party limit minus what was already
    /// bought, never below zero. A positive `price` further caps it by what
    /// `gold` can pay for.
    ///
    /// # Errors
    ///
    /// Capacity errors from the item's note.
    pub fn max_buy(&mut self, item: ItemId, base_max: i64, price: u64, gold: u64) -> StockResult<i64> {
        let limit = if self.ledger.is_stock_item(self.catalog, item) {
            let bought = i64::from(self.ledger.has_bought_count(item));
            self.party_limit(item, base_max)?.saturating_sub(bought)
        } else {
            base_max
        };
        let mut max = limit.max(0);
        if let Some(affordable) = gold.checked_div(price) {
            max = max.min(i64::try_from(affordable).unwrap_or(i64::MAX));
        }
        Ok(max)
    }

    /// Text for the quantity picker: `number`, or `number/remaining` for
    /// stock items when enabled.
    ///
    /// # Errors
    ///
    /// Capacity errors from the item's note.
    pub fn quantity_label(&mut self, item: ItemId, number: u32) -> StockResult<String> {
        if !self.config.display_remaining || !self.ledger.is_stock_item(self.catalog, item) {
            return Ok(number.to_string());
        }
        let remaining = self.ledger.remaining(self.catalog, self.ctx, item)?;
        Ok(format!("{number}/{remaining}"))
    }

    /// The overlay for a listed item that is sold out.
    ///
    /// `None` when the item is available or no message is configured.
    ///
    /// # Errors
    ///
    /// Capacity errors from the item's note.
    pub fn sold_out_badge(&mut self, item: ItemId) -> StockResult<Option<SoldOutBadge>> {
        if self.config.sold_out_message.is_empty()
            || !self.ledger.is_stock_item(self.catalog, item)
            || !self.ledger.has_bought_max(self.catalog, self.ctx, item)?
        {
            return Ok(None);
        }
        Ok(Some(SoldOutBadge {
            message: self.config.sold_out_message.clone(),
            color: self.config.sold_out_color,
        }))
    }

    /// The shop list as it should be shown, with sold-out items removed
    /// when configured.
    ///
    /// # Errors
    ///
    /// Capacity errors from any listed item's note.
    pub fn visible_goods(&mut self, goods: Vec<ShopGood>) -> StockResult<Vec<ShopGood>> {
        if !self.config.hide_sold_out {
            return Ok(goods);
        }
        self.ledger.filter_sold_out(self.catalog, self.ctx, goods)
    }
}

#[cfg(test)]
mod tests {
    use propbag_core::{EntryId, KeyPolicy};
    use propbag_store::{AliasIndex, PropertyStore, StoreView, Variables};

    use super::*;
    use crate::catalog::ItemNotes;

    const GEM: u32 = 1;
    const BREAD: u32 = 2;
    const POTION: u32 = 3;

    fn notes() -> ItemNotes {
        ItemNotes::new()
            .with(GEM, "<GStocks: 3>")
            .with(BREAD, "<GStocks Var: 10>")
            .with(POTION, "Heals 50 HP.")
    }

    fn with_shop<T>(
        ledger: &mut StockLedger,
        config: &ShopConfig,
        vars: &[(i64, i64)],
        f: impl FnOnce(&mut Shop<'_, ItemNotes, StoreView<'_, Variables>>) -> T,
    ) -> T {
        let catalog = notes();
        let mut store = PropertyStore::new(Variables::new(), KeyPolicy::default());
        for (id, value) in vars {
            store.store_mut().set(EntryId::new(*id).unwrap(), *value);
        }
        let aliases = AliasIndex::default();
        let ctx = StoreView::new(&aliases, &store);
        let mut shop = Shop::new(ledger, &catalog, &ctx, config);
        f(&mut shop)
    }

    #[test]
    fn test_only_item_goods_are_keyed() {
        assert_eq!(ShopGood::item(4).stock_item(), Some(ItemId::new(4)));
        assert_eq!(ShopGood::weapon(4).stock_item(), None);
        assert_eq!(ShopGood::armor(4).stock_item(), None);
    }

    #[test]
    fn test_record_purchase_reaches_max() {
        let mut ledger = StockLedger::new();
        let config = ShopConfig::default();
        with_shop(&mut ledger, &config, &[], |shop| {
            assert!(shop.record_purchase(ItemId::new(GEM), 3));
            assert!(!shop.record_purchase(ItemId::new(POTION), 3));
            assert_eq!(
                shop.sold_out_badge(ItemId::new(GEM)).unwrap(),
                Some(SoldOutBadge {
                    message: "OUT OF STOCK".to_owned(),
                    color: 18,
                })
            );
        });
        assert_eq!(ledger.has_bought_count(ItemId::new(GEM)), 3);
        assert!(!ledger.is_tracked(ItemId::new(POTION)));
    }

    #[test]
    fn test_party_limit_clamps_to_stock() {
        let mut ledger = StockLedger::new();
        let config = ShopConfig::default();
        with_shop(&mut ledger, &config, &[(10, 250)], |shop| {
            assert_eq!(shop.party_limit(ItemId::new(GEM), 99).unwrap(), 3);
            assert_eq!(shop.party_limit(ItemId::new(BREAD), 99).unwrap(), 99);
            assert_eq!(shop.party_limit(ItemId::new(POTION), 99).unwrap(), 99);
        });
    }

    #[test]
    fn test_max_buy() {
        let mut ledger = StockLedger::new();
        ledger.add_bought(ItemId::new(GEM), 1);
        let config = ShopConfig::default();
        with_shop(&mut ledger, &config, &[], |shop| {
            let gem = ItemId::new(GEM);
            // 3 stock, 1 bought.
            assert_eq!(shop.max_buy(gem, 99, 10, 1000).unwrap(), 2);
            // Gold is the tighter cap.
            assert_eq!(shop.max_buy(gem, 99, 10, 15).unwrap(), 1);
            // Free goods are limited by stock alone.
            assert_eq!(shop.max_buy(gem, 99, 0, 0).unwrap(), 2);
            // Plain items only see the gold cap.
            assert_eq!(shop.max_buy(ItemId::new(POTION), 99, 50, 120).unwrap(), 2);
        });
    }

    #[test]
    fn test_max_buy_never_negative() {
        let mut ledger = StockLedger::new();
        ledger.add_bought(ItemId::new(GEM), 7);
        let config = ShopConfig::default();
        with_shop(&mut ledger, &config, &[], |shop| {
            assert_eq!(shop.max_buy(ItemId::new(GEM), 99, 1, 1000).unwrap(), 0);
        });
    }

    #[test]
    fn test_quantity_label() {
        let mut ledger = StockLedger::new();
        ledger.add_bought(ItemId::new(GEM), 1);
        let config = ShopConfig::default();
        with_shop(&mut ledger, &config, &[], |shop| {
            assert_eq!(shop.quantity_label(ItemId::new(GEM), 1).unwrap(), "1/2");
            assert_eq!(shop.quantity_label(ItemId::new(POTION), 4).unwrap(), "4");
        });

        let quiet = ShopConfig {
            display_remaining: false,
            ..ShopConfig::default()
        };
        with_shop(&mut ledger, &quiet, &[], |shop| {
            assert_eq!(shop.quantity_label(ItemId::new(GEM), 1).unwrap(), "1");
        });
    }

    #[test]
    fn test_badge_needs_message() {
        let mut ledger = StockLedger::new();
        ledger.add_bought(ItemId::new(GEM), 3);
        let config = ShopConfig {
            sold_out_message: String::new(),
            ..ShopConfig::default()
        };
        with_shop(&mut ledger, &config, &[], |shop| {
            assert_eq!(shop.sold_out_badge(ItemId::new(GEM)).unwrap(), None);
        });
    }

    #[test]
    fn test_visible_goods() {
        let mut ledger = StockLedger::new();
        ledger.add_bought(ItemId::new(GEM), 3);
        let goods = vec![
            ShopGood::item(GEM),
            ShopGood::weapon(GEM),
            ShopGood::item(POTION),
            ShopGood::item(BREAD),
        ];

        let config = ShopConfig::default();
        let shown = with_shop(&mut ledger, &config, &[(10, 5)], |shop| {
            shop.visible_goods(goods.clone()).unwrap()
        });
        assert_eq!(
            shown,
            vec![ShopGood::weapon(GEM), ShopGood::item(POTION), ShopGood::item(BREAD)]
        );

        let config = ShopConfig {
            hide_sold_out: false,
            ..ShopConfig::default()
        };
        let shown = with_shop(&mut ledger, &config, &[], |shop| {
            shop.visible_goods(goods.clone()).unwrap()
        });
        assert_eq!(shown, goods);
    }
}
