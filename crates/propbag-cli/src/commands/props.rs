//! Property, alias and variable commands.

use anyhow::{Result, anyhow};
use propbag_core::{EntryId, Value};
use propbag_runtime::Session;
use propbag_store::ArithOp;

use crate::theme::Theme;

/// Resolve an id-or-alias argument.
fn entry(session: &Session, token: &str) -> Result<EntryId> {
    session
        .resolve(token)
        .ok_or_else(|| anyhow!("no entry named '{token}'"))
}

fn joined(words: &[String]) -> Value {
    Value::from_command_arg(&words.join(" "))
}

/// Turn a variable into an empty bag.
pub(crate) fn setup(session: &mut Session, id: i64) -> Result<()> {
    session.setup_var(id)?;
    println!("{}", Theme::success(&format!("Variable {id} holds a property bag")));
    Ok(())
}

/// Set a property through the host command, so targets may be aliases.
pub(crate) fn set(session: &mut Session, target: &str, key: &str, value: &[String]) -> Result<()> {
    let mut args = vec![target, key];
    args.extend(value.iter().map(String::as_str));
    let written = session.run_command("set property", &args)?;
    println!("{}", Theme::success(&format!("{target}.{key} = {written}")));
    Ok(())
}

/// Print a property; unresolved targets print `undefined`.
pub(crate) fn get(session: &Session, target: &str, key: &str) {
    println!("{}", session.lookup(target, key));
}

/// Print the keys of an entry.
pub(crate) fn keys(session: &Session, target: &str) -> Result<()> {
    let id = entry(session, target)?;
    let keys = session.property_keys(id)?;
    if keys.is_empty() {
        println!("{}", Theme::info(&format!("{target} has no properties")));
    }
    for key in keys {
        println!("{key}");
    }
    Ok(())
}

/// Remove a property.
pub(crate) fn remove(session: &mut Session, target: &str, key: &str) -> Result<()> {
    let id = entry(session, target)?;
    let old = session.remove_property(id, key)?;
    println!("{}", Theme::success(&format!("Removed {target}.{key} (was {old})")));
    Ok(())
}

/// Append to a sequence property.
pub(crate) fn push(session: &mut Session, target: &str, key: &str, value: &[String]) -> Result<()> {
    let id = entry(session, target)?;
    session.push_to_property(id, key, joined(value))?;
    let len = session.sequence_length(id, key)?;
    println!("{}", Theme::success(&format!("{target}.{key} now holds {len}")));
    Ok(())
}

/// Print the length of a sequence property.
pub(crate) fn len(session: &Session, target: &str, key: &str) -> Result<()> {
    let id = entry(session, target)?;
    println!("{}", session.sequence_length(id, key)?);
    Ok(())
}

/// Apply `op` with `delta` to a numeric property.
pub(crate) fn change(
    session: &mut Session,
    op: &str,
    target: &str,
    key: &str,
    delta: &str,
) -> Result<()> {
    let op: ArithOp = op.parse()?;
    let id = entry(session, target)?;
    let result = session.change_property(op, Value::from_command_arg(delta), id, key)?;
    println!("{}", Theme::success(&format!("{target}.{key} = {result}")));
    Ok(())
}

/// Name an entry explicitly.
pub(crate) fn name(session: &mut Session, id: i64, name: &str) -> Result<()> {
    session.name_entry(id, name)?;
    println!("{}", Theme::success(&format!("Variable {id} is now '{name}'")));
    Ok(())
}

/// Label a variable; with alias tracking on, the label becomes its alias
/// on the next property write.
pub(crate) fn label(session: &mut Session, id: i64, name: &str) -> Result<()> {
    session.set_variable_name(id, name)?;
    if !session.alias_tracking() {
        println!(
            "{}",
            Theme::warning("Alias tracking is off; set aliases.name_slot to use labels")
        );
    }
    println!("{}", Theme::success(&format!("Labelled variable {id} '{name}'")));
    Ok(())
}

/// Copy a property into a plain variable.
pub(crate) fn store(
    session: &mut Session,
    target: &str,
    key: &str,
    destination: &str,
) -> Result<()> {
    let value = session.run_command("store property", &[target, key, destination])?;
    println!("{}", Theme::success(&format!("Variable {destination} = {value}")));
    Ok(())
}

/// Substitute macros in `text`.
pub(crate) fn render(session: &Session, text: &str) {
    println!("{}", session.render(text));
}

/// Read a variable, or write it when `value` is given.
pub(crate) fn var(session: &mut Session, id: i64, value: &[String]) -> Result<()> {
    if value.is_empty() {
        println!("{}", session.variable(id)?);
        return Ok(());
    }
    let value = joined(value);
    session.set_variable(id, value.clone())?;
    println!("{}", Theme::success(&format!("Variable {id} = {value}")));
    Ok(())
}

/// Forget all session state.
pub(crate) fn reset(session: &mut Session) {
    session.reset();
    println!("{}", Theme::success("Session reset"));
}
