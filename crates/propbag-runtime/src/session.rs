//! The host-owned session.
//!
//! A [`Session`] owns every piece of state the core keeps: the variable
//! store with its property bags, the alias index, the host's variable
//! labels, and the stock ledger. Hosts construct one, pass it by `&mut`
//! into their event handlers, and persist it through
//! [`Session::snapshot`].

use propbag_core::{EntryId, IntoEntryId, ItemId, KeyPolicy, Value, parse_integer_token};
use propbag_stock::{
    ItemNotes, Shop, ShopConfig, ShopGood, SoldOutBadge, StockKeyed, StockLedger,
};
use propbag_store::{
    AliasIndex, ArithOp, Command, PropertyStore, StoreError, StoreView, VariableNames,
    VariableStore, Variables,
};
use propbag_text::{MacroRef, MacroResolver};
use tracing::{debug, info, warn};

use crate::error::{RuntimeError, RuntimeResult};

/// How a session folds keys, tracks aliases, renders macros and presents
/// shops.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Key folding for properties and alias names.
    pub policy: KeyPolicy,
    /// Reserved alias name slot; `None` turns alias tracking off.
    pub name_slot: Option<EntryId>,
    /// Macro token resolver.
    pub macros: MacroResolver,
    /// Shop presentation.
    pub shop: ShopConfig,
}

/// All core state for one game session.
///
/// # Example
///
/// ```
/// use propbag_core::Value;
/// use propbag_runtime::Session;
///
/// let mut session = Session::new();
/// session.set_property(1, "Level", 12).unwrap();
/// session.name_entry(1, "Hero").unwrap();
///
/// assert_eq!(session.lookup("hero", "level"), Value::Int(12));
/// assert_eq!(session.render("Lv \\VOBJ[Hero:level]"), "Lv 12");
/// ```
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) store: PropertyStore<Variables>,
    pub(crate) aliases: AliasIndex,
    pub(crate) names: VariableNames,
    pub(crate) ledger: StockLedger,
    pub(crate) notes: ItemNotes,
    macros: MacroResolver,
    shop: ShopConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    /// A session with the given options.
    #[must_use]
    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            store: PropertyStore::new(Variables::new(), options.policy)
                .with_reserved(options.name_slot),
            aliases: AliasIndex::new(options.policy),
            names: VariableNames::new(),
            ledger: StockLedger::new(),
            notes: ItemNotes::new(),
            macros: options.macros,
            shop: options.shop,
        }
    }

    /// A session configured from loaded configuration.
    ///
    /// # Errors
    ///
    /// When the configuration cannot be converted; see
    /// [`crate::config_bridge::to_session_options`].
    pub fn from_config(cfg: &propbag_config::Config) -> RuntimeResult<Self> {
        Ok(Self::with_options(crate::config_bridge::to_session_options(
            cfg,
        )?))
    }

    /// Use `notes` as the item database.
    #[must_use]
    pub fn with_notes(mut self, notes: ItemNotes) -> Self {
        self.notes = notes;
        self
    }

    /// Use `names` as the host's variable labels.
    #[must_use]
    pub fn with_names(mut self, names: VariableNames) -> Self {
        self.names = names;
        self
    }

    /// The options this session was built with.
    #[must_use]
    pub fn options(&self) -> SessionOptions {
        SessionOptions {
            policy: self.store.policy(),
            name_slot: self.store.reserved(),
            macros: self.macros.clone(),
            shop: self.shop.clone(),
        }
    }

    /// Whether property writes name their entry after the host's label.
    #[must_use]
    pub fn alias_tracking(&self) -> bool {
        self.store.reserved().is_some()
    }

    /// Read-only view used by macros and formulas.
    #[must_use]
    pub fn view(&self) -> StoreView<'_, Variables> {
        StoreView::new(&self.aliases, &self.store)
    }

    /// Forget all variables, aliases and purchase counts.
    ///
    /// Item notes and variable labels are host data and stay.
    pub fn reset(&mut self) {
        self.store.store_mut().clear();
        self.aliases.clear();
        self.ledger = StockLedger::new();
        info!("session reset");
    }

    // -----------------------------------------------------------------------
    // Host variables
    // -----------------------------------------------------------------------

    /// The host's scalar value of a variable.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] outside the entry range.
    pub fn variable(&self, id: impl IntoEntryId) -> RuntimeResult<Value> {
        let id = entry(id)?;
        Ok(self.store.store().scalar(id))
    }

    /// Write a scalar into a variable as the host would, discarding any
    /// properties the slot held.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] outside the entry range.
    pub fn set_variable(&mut self, id: impl IntoEntryId, value: impl Into<Value>) -> RuntimeResult<()> {
        let id = entry(id)?;
        let value = value.into();
        debug!(%id, %value, "set variable");
        self.store.store_mut().set(id, value);
        Ok(())
    }

    /// The host's variable store.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        self.store.store()
    }

    /// Label a variable as the host's editor would.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] outside the entry range.
    pub fn set_variable_name(&mut self, id: impl IntoEntryId, name: &str) -> RuntimeResult<()> {
        let id = entry(id)?;
        self.names.set(id, name);
        Ok(())
    }

    /// The host's variable labels.
    #[must_use]
    pub fn names(&self) -> &VariableNames {
        &self.names
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    /// Turn a variable into an empty bag, keeping an existing one.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] or [`StoreError::ReservedSlot`].
    pub fn setup_var(&mut self, id: impl IntoEntryId) -> RuntimeResult<()> {
        let id = entry(id)?;
        Ok(self.store.setup(id)?)
    }

    /// Write a property, then name the entry after its label when alias
    /// tracking is on.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] or [`StoreError::ReservedSlot`]; nothing is
    /// written on error.
    pub fn set_property(
        &mut self,
        id: impl IntoEntryId,
        key: &str,
        value: impl Into<Value>,
    ) -> RuntimeResult<()> {
        let id = entry(id)?;
        self.store.set_property(id, key, value)?;
        self.track_alias(id);
        Ok(())
    }

    /// Read a property; [`Value::Undefined`] when absent.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] outside the entry range.
    pub fn get_property(&self, id: impl IntoEntryId, key: &str) -> RuntimeResult<Value> {
        let id = entry(id)?;
        Ok(self.store.get_property(id, key)?)
    }

    /// Resolve an id-or-alias token and read a property. Anything that does
    /// not resolve reads as [`Value::Undefined`].
    #[must_use]
    pub fn lookup(&self, token: &str, key: &str) -> Value {
        self.view().lookup(token, key)
    }

    /// Whether a property is present.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] outside the entry range.
    pub fn has_property(&self, id: impl IntoEntryId, key: &str) -> RuntimeResult<bool> {
        let id = entry(id)?;
        Ok(self.store.has_property(id, key)?)
    }

    /// Property keys of an entry in order; empty for non-bags.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] outside the entry range.
    pub fn property_keys(&self, id: impl IntoEntryId) -> RuntimeResult<Vec<String>> {
        let id = entry(id)?;
        Ok(self.store.property_keys(id)?)
    }

    /// Remove a property, returning what it held.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] or [`StoreError::ReservedSlot`].
    pub fn remove_property(&mut self, id: impl IntoEntryId, key: &str) -> RuntimeResult<Value> {
        let id = entry(id)?;
        Ok(self.store.remove_property(id, key)?)
    }

    /// Append to a sequence property.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotASequence`] when the property is not a sequence.
    pub fn push_to_property(
        &mut self,
        id: impl IntoEntryId,
        key: &str,
        value: impl Into<Value>,
    ) -> RuntimeResult<()> {
        let id = entry(id)?;
        Ok(self.store.push_to_property(id, key, value)?)
    }

    /// Length of a sequence property.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotASequence`] when the property is not a sequence.
    pub fn sequence_length(&self, id: impl IntoEntryId, key: &str) -> RuntimeResult<usize> {
        let id = entry(id)?;
        Ok(self.store.sequence_length(id, key)?)
    }

    /// Apply arithmetic to a numeric property and return the new value.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotANumber`] and the errors of
    /// [`Session::set_property`].
    pub fn change_property(
        &mut self,
        op: ArithOp,
        delta: impl Into<Value>,
        id: impl IntoEntryId,
        key: &str,
    ) -> RuntimeResult<Value> {
        let id = entry(id)?;
        let result = self.store.change_property(op, delta, id, key)?;
        self.track_alias(id);
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Aliases
    // -----------------------------------------------------------------------

    /// Name an entry explicitly, replacing its previous alias.
    ///
    /// The name also becomes the entry's label.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidId`] outside the entry range.
    pub fn name_entry(&mut self, id: impl IntoEntryId, name: &str) -> RuntimeResult<()> {
        let id = entry(id)?;
        self.names.set(id, name);
        self.aliases.upsert(id, name);
        debug!(%id, name, "named entry");
        Ok(())
    }

    /// Resolve an id-or-alias token.
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<EntryId> {
        self.aliases.resolve(token)
    }

    /// The alias index.
    #[must_use]
    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    fn track_alias(&mut self, id: EntryId) {
        if !self.alias_tracking() {
            return;
        }
        if let Some(name) = self.names.name(id) {
            self.aliases.upsert(id, name);
            debug!(%id, name, "tracked alias");
        }
    }

    // -----------------------------------------------------------------------
    // Text and commands
    // -----------------------------------------------------------------------

    /// Substitute every macro token in `text`.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        self.macros.render(text, &self.view())
    }

    /// The macro tokens in `text`, unresolved.
    #[must_use]
    pub fn macro_references<'t>(&self, text: &'t str) -> Vec<MacroRef<'t>> {
        self.macros.references(text)
    }

    /// Run a positional host command and return the value it wrote.
    ///
    /// The target may be an id or an alias.
    ///
    /// # Errors
    ///
    /// [`StoreError::Command`] for malformed commands,
    /// [`StoreError::InvalidId`] for a numeric target outside `1..=9999`,
    /// [`StoreError::UnknownEntry`] when a named target does not resolve, and
    /// the errors of the property operation itself.
    pub fn run_command(&mut self, name: &str, args: &[&str]) -> RuntimeResult<Value> {
        let command = Command::parse(name, args)?;
        if let Some(raw) = parse_integer_token(command.target()) {
            EntryId::new(raw).map_err(StoreError::from)?;
        }
        let Some(id) = self.resolve(command.target()) else {
            warn!(
                command = command.name(),
                target = command.target(),
                "command target did not resolve"
            );
            return Err(StoreError::UnknownEntry(command.target().to_owned()).into());
        };

        match command {
            Command::SetProperty { key, value, .. } => {
                self.set_property(id, &key, value)?;
                self.get_property(id, &key)
            },
            Command::StoreProperty {
                key, destination, ..
            } => {
                if self.store.reserved() == Some(destination) {
                    warn!(%destination, "store into the alias name slot");
                    return Err(StoreError::ReservedSlot { id: destination }.into());
                }
                let value = self.store.get_property(id, &key)?;
                debug!(%id, key, %destination, %value, "stored property into variable");
                self.store.store_mut().set(destination, value.clone());
                Ok(value)
            },
        }
    }

    // -----------------------------------------------------------------------
    // Stock
    // -----------------------------------------------------------------------

    /// The item database.
    #[must_use]
    pub fn notes(&self) -> &ItemNotes {
        &self.notes
    }

    /// Set one item's note.
    pub fn set_note(&mut self, item: ItemId, note: impl Into<String>) {
        self.notes.insert(item, note);
    }

    /// The purchase ledger.
    #[must_use]
    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    /// Whether the item is stock-limited; starts its counter if so.
    pub fn is_stock_item(&mut self, item: ItemId) -> bool {
        self.ledger.is_stock_item(&self.notes, item)
    }

    /// Current capacity of an item.
    ///
    /// # Errors
    ///
    /// Malformed markers and failing formulas.
    pub fn get_item_stock(&self, item: ItemId) -> RuntimeResult<i64> {
        let view = StoreView::new(&self.aliases, &self.store);
        Ok(self.ledger.get_item_stock(&self.notes, &view, item)?)
    }

    /// How many of the item have been bought.
    #[must_use]
    pub fn has_bought_count(&self, item: ItemId) -> u32 {
        self.ledger.has_bought_count(item)
    }

    /// Capacity minus purchases.
    ///
    /// # Errors
    ///
    /// As [`Session::get_item_stock`].
    pub fn remaining(&self, item: ItemId) -> RuntimeResult<i64> {
        let view = StoreView::new(&self.aliases, &self.store);
        Ok(self.ledger.remaining(&self.notes, &view, item)?)
    }

    /// Whether the item is sold out.
    ///
    /// # Errors
    ///
    /// As [`Session::get_item_stock`].
    pub fn has_bought_max(&self, item: ItemId) -> RuntimeResult<bool> {
        let view = StoreView::new(&self.aliases, &self.store);
        Ok(self.ledger.has_bought_max(&self.notes, &view, item)?)
    }

    /// Record one purchase, returning the new count.
    pub fn add_bought_item(&mut self, item: ItemId) -> u32 {
        self.ledger.add_bought_item(item)
    }

    /// Zero one item's count. Returns whether it was tracked.
    pub fn reset_bought(&mut self, item: ItemId) -> bool {
        self.ledger.reset_bought(item)
    }

    /// Zero every count.
    pub fn reset_all(&mut self) {
        self.ledger.reset_all();
    }

    /// Drop sold-out entries from a list, keeping order.
    ///
    /// # Errors
    ///
    /// The first capacity error hit while checking the list.
    pub fn filter_sold_out<G: StockKeyed>(
        &mut self,
        goods: impl IntoIterator<Item = G>,
    ) -> RuntimeResult<Vec<G>> {
        let view = StoreView::new(&self.aliases, &self.store);
        Ok(self
            .ledger
            .filter_sold_out(&self.notes, &view, goods)?)
    }

    /// Run `f` with a shop over this session's ledger.
    pub fn with_shop<R>(
        &mut self,
        f: impl FnOnce(&mut Shop<'_, ItemNotes, StoreView<'_, Variables>>) -> R,
    ) -> R {
        let view = StoreView::new(&self.aliases, &self.store);
        let mut shop = Shop::new(&mut self.ledger, &self.notes, &view, &self.shop);
        f(&mut shop)
    }

    /// Record a completed sale; returns whether the item is stock-limited.
    pub fn record_purchase(&mut self, item: ItemId, quantity: u32) -> bool {
        self.with_shop(|shop| shop.record_purchase(item, quantity))
    }

    /// Most units of `item` the buy window may offer.
    ///
    /// # Errors
    ///
    /// As [`Session::get_item_stock`].
    pub fn max_buy(&mut self, item: ItemId, base_max: i64, price: u64, gold: u64) -> RuntimeResult<i64> {
        Ok(self.with_shop(|shop| shop.max_buy(item, base_max, price, gold))?)
    }

    /// Quantity picker label.
    ///
    /// # Errors
    ///
    /// As [`Session::get_item_stock`].
    pub fn quantity_label(&mut self, item: ItemId, number: u32) -> RuntimeResult<String> {
        Ok(self.with_shop(|shop| shop.quantity_label(item, number))?)
    }

    /// Sold-out overlay for a listed item.
    ///
    /// # Errors
    ///
    /// As [`Session::get_item_stock`].
    pub fn sold_out_badge(&mut self, item: ItemId) -> RuntimeResult<Option<SoldOutBadge>> {
        Ok(self.with_shop(|shop| shop.sold_out_badge(item))?)
    }

    /// The shop list as it should be shown.
    ///
    /// # Errors
    ///
    /// As [`Session::filter_sold_out`].
    pub fn visible_goods(&mut self, goods: Vec<ShopGood>) -> RuntimeResult<Vec<ShopGood>> {
        Ok(self.with_shop(|shop| shop.visible_goods(goods))?)
    }
}

fn entry(id: impl IntoEntryId) -> RuntimeResult<EntryId> {
    id.into_entry_id().map_err(|err| {
        warn!(error = %err, "rejected entry id");
        RuntimeError::from(StoreError::from(err))
    })
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
