//! CLI handlers for the `propbag stock` subcommand.

use anyhow::Result;
use colored::Colorize;
use propbag_core::ItemId;
use propbag_runtime::Session;
use propbag_stock::ShopGood;

use crate::theme::Theme;

/// Show capacity and purchases of stock items.
pub(crate) fn status(session: &mut Session, item: Option<u32>) -> Result<()> {
    let items: Vec<ItemId> = match item {
        Some(id) => vec![ItemId::new(id)],
        None => session.notes().items().collect(),
    };

    println!("\n{}", Theme::header("Limited Stocks"));
    println!(
        "{:>6} {:>6} {:>7} {:>6}",
        "ITEM".dimmed(),
        "STOCK".dimmed(),
        "BOUGHT".dimmed(),
        "LEFT".dimmed()
    );
    println!("{}", Theme::separator());

    let mut shown = 0_usize;
    for item in items {
        if !session.is_stock_item(item) {
            continue;
        }
        let stock = session.get_item_stock(item)?;
        let bought = session.has_bought_count(item);
        let left = session.remaining(item)?;
        let marker = if session.has_bought_max(item)? {
            Theme::sold_out("SOLD OUT")
        } else {
            String::new()
        };
        println!("{:>6} {stock:>6} {bought:>7} {left:>6} {marker}", item.to_string());
        shown = shown.saturating_add(1);
    }

    if shown == 0 {
        println!("{}", Theme::info("No stock items"));
    }
    println!();
    Ok(())
}

/// Record a purchase.
pub(crate) fn buy(session: &mut Session, item: u32, quantity: u32) -> Result<()> {
    let item = ItemId::new(item);
    if !session.record_purchase(item, quantity) {
        println!(
            "{}",
            Theme::warning(&format!("Item {item} has no stock marker; nothing recorded"))
        );
        return Ok(());
    }
    let stock = session.get_item_stock(item)?;
    println!(
        "{}",
        Theme::success(&format!(
            "Bought {quantity} of item {item} ({}/{stock})",
            session.has_bought_count(item)
        ))
    );
    Ok(())
}

/// Zero one item's purchases.
pub(crate) fn reset(session: &mut Session, item: u32) {
    let item = ItemId::new(item);
    if session.reset_bought(item) {
        println!("{}", Theme::success(&format!("Restocked item {item}")));
    } else {
        println!("{}", Theme::warning(&format!("Item {item} is not tracked")));
    }
}

/// Zero every item's purchases.
pub(crate) fn reset_all(session: &mut Session) {
    session.reset_all();
    println!("{}", Theme::success("Restocked every item"));
}

/// Print the items a shop would still list, with sold-out badges.
pub(crate) fn filter(session: &mut Session, items: &[u32]) -> Result<()> {
    let goods = items.iter().map(|&id| ShopGood::item(id)).collect();
    for good in session.visible_goods(goods)? {
        let item = ItemId::new(good.id);
        match session.sold_out_badge(item)? {
            Some(badge) => println!("{item}  {}", Theme::sold_out(&badge.message)),
            None => println!("{item}"),
        }
    }
    Ok(())
}
