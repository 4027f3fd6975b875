//! The bought-item ledger.
//!
//! The [`StockLedger`] counts purchases per item. Capacity is never stored:
//! every query re-reads the item note and recomputes it, so a variable or
//! formula driven stock follows the session as it changes.

use std::collections::BTreeMap;

use propbag_core::ItemId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::annotation::{MarkerKind, StockRule};
use crate::catalog::ItemCatalog;
use crate::error::{StockError, StockResult};
use crate::formula::{EvalContext, Formula};

/// Anything a shop list can hold that may map to a stock-tracked item.
pub trait StockKeyed {
    /// The item id whose stock governs this entry, if any.
    fn stock_item(&self) -> Option<ItemId>;
}

impl StockKeyed for ItemId {
    fn stock_item(&self) -> Option<ItemId> {
        Some(*self)
    }
}

/// Purchase counts for stock-tracked items.
///
/// # Example
///
/// ```
/// use propbag_core::{ItemId, KeyPolicy};
/// use propbag_stock::{ItemNotes, StockLedger};
/// use propbag_store::{AliasIndex, PropertyStore, StoreView, Variables};
///
/// let notes = ItemNotes::new().with(7, "<GStocks: 2>");
/// let store = PropertyStore::new(Variables::new(), KeyPolicy::default());
/// let aliases = AliasIndex::default();
/// let ctx = StoreView::new(&aliases, &store);
///
/// let mut ledger = StockLedger::new();
/// let potion = ItemId::new(7);
/// assert!(ledger.is_stock_item(&notes, potion));
/// ledger.add_bought_item(potion);
/// ledger.add_bought_item(potion);
/// assert!(ledger.has_bought_max(&notes, &ctx, potion).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StockLedger {
    bought: BTreeMap<ItemId, u32>,
}

impl StockLedger {
    /// An empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the item's note carries a stock marker.
    ///
    /// The first positive answer starts a zero counter for the item.
    pub fn is_stock_item(&mut self, catalog: &impl ItemCatalog, item: ItemId) -> bool {
        if !has_marker(catalog, item) {
            return false;
        }
        self.bought.entry(item).or_insert_with(|| {
            debug!(%item, "tracking stock item");
            0
        });
        true
    }

    /// Whether a counter exists for the item.
    #[must_use]
    pub fn is_tracked(&self, item: ItemId) -> bool {
        self.bought.contains_key(&item)
    }

    /// Current capacity of the item.
    ///
    /// A literal marker gives its floored number, or `i64::MAX` when it is
    /// not a number. A variable marker gives the variable's integer value
    /// (non-numeric values count as `0`), and a formula marker its floored
    /// result. Items without a marker have no stock: `0`.
    ///
    /// # Errors
    ///
    /// [`StockError::InvalidAnnotation`] for malformed markers and
    /// [`StockError::Formula`] for failing formulas.
    pub fn get_item_stock(
        &self,
        catalog: &impl ItemCatalog,
        ctx: &impl EvalContext,
        item: ItemId,
    ) -> StockResult<i64> {
        let Some(note) = catalog.note(item) else {
            return Ok(0);
        };
        let stock = match StockRule::parse(item, note)? {
            None => 0,
            Some(StockRule::Literal(n)) => n,
            Some(StockRule::Unbounded) => i64::MAX,
            Some(StockRule::Variable(id)) => ctx.variable(id).to_integer().unwrap_or(0),
            Some(StockRule::Formula(source)) => Formula::parse(&source)
                .and_then(|formula| formula.capacity(ctx))
                .map_err(|source| StockError::Formula { item, source })?,
        };
        Ok(stock)
    }

    /// How many of the item have been bought.
    #[must_use]
    pub fn has_bought_count(&self, item: ItemId) -> u32 {
        self.bought.get(&item).copied().unwrap_or(0)
    }

    /// Capacity minus purchases; negative once a dynamic stock drops below
    /// what was already bought.
    ///
    /// # Errors
    ///
    /// As [`StockLedger::get_item_stock`].
    pub fn remaining(
        &self,
        catalog: &impl ItemCatalog,
        ctx: &impl EvalContext,
        item: ItemId,
    ) -> StockResult<i64> {
        let stock = self.get_item_stock(catalog, ctx, item)?;
        Ok(stock.saturating_sub(i64::from(self.has_bought_count(item))))
    }

    /// Whether a stock item has been bought as often as its capacity allows.
    ///
    /// Items without a marker are never sold out.
    ///
    /// # Errors
    ///
    /// As [`StockLedger::get_item_stock`].
    pub fn has_bought_max(
        &self,
        catalog: &impl ItemCatalog,
        ctx: &impl EvalContext,
        item: ItemId,
    ) -> StockResult<bool> {
        if !has_marker(catalog, item) {
            return Ok(false);
        }
        let stock = self.get_item_stock(catalog, ctx, item)?;
        Ok(i64::from(self.has_bought_count(item)) >= stock)
    }

    /// Record one purchase, returning the new count.
    ///
    /// Not clamped at capacity: hosts may hand out stock items directly.
    pub fn add_bought_item(&mut self, item: ItemId) -> u32 {
        self.add_bought(item, 1)
    }

    /// Record `quantity` purchases at once, returning the new count.
    pub fn add_bought(&mut self, item: ItemId, quantity: u32) -> u32 {
        let count = self.bought.entry(item).or_insert(0);
        *count = count.saturating_add(quantity);
        debug!(%item, quantity, count = *count, "recorded purchase");
        *count
    }

    /// Zero the count of one item. Returns whether it was tracked.
    pub fn reset_bought(&mut self, item: ItemId) -> bool {
        match self.bought.get_mut(&item) {
            Some(count) => {
                *count = 0;
                info!(%item, "stock reset");
                true
            },
            None => false,
        }
    }

    /// Forget every counter. Items are tracked again on their next
    /// [`StockLedger::is_stock_item`] check.
    pub fn reset_all(&mut self) {
        let items = self.bought.len();
        self.bought.clear();
        info!(items, "all stocks reset");
    }

    /// Drop entries whose item is tracked and sold out, keeping order.
    ///
    /// # Errors
    ///
    /// The first capacity error hit while checking the list.
    pub fn filter_sold_out<G: StockKeyed>(
        &mut self,
        catalog: &impl ItemCatalog,
        ctx: &impl EvalContext,
        goods: impl IntoIterator<Item = G>,
    ) -> StockResult<Vec<G>> {
        let mut kept = Vec::new();
        for good in goods {
            if let Some(item) = good.stock_item()
                && self.is_stock_item(catalog, item)
                && self.has_bought_max(catalog, ctx, item)?
            {
                debug!(%item, "hiding sold-out item");
                continue;
            }
            kept.push(good);
        }
        Ok(kept)
    }

    /// Tracked items and their counts, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.bought.iter().map(|(item, count)| (*item, *count))
    }

    /// Number of tracked items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bought.len()
    }

    /// Whether no item is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bought.is_empty()
    }
}

/// Snapshot of ledger state for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Purchase counts by item.
    pub bought: BTreeMap<ItemId, u32>,
    /// When the snapshot was taken.
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

impl StockLedger {
    /// Take a snapshot of the counts for persistence.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            bought: self.bought.clone(),
            last_updated: chrono::Utc::now(),
        }
    }

    /// Rebuild a ledger from a snapshot.
    #[must_use]
    pub fn restore(snapshot: LedgerSnapshot) -> Self {
        Self {
            bought: snapshot.bought,
        }
    }
}

fn has_marker(catalog: &impl ItemCatalog, item: ItemId) -> bool {
    catalog
        .note(item)
        .and_then(MarkerKind::detect)
        .is_some()
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
