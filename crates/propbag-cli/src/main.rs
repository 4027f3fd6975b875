//! Propbag CLI - property bags and limited stocks from the command line.
//!
//! Each invocation loads the session file, applies one command and writes
//! the session back when the command changed it.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use propbag_config::{Config, ConfigResult, ResolvedConfig};
use propbag_runtime::{Session, config_bridge};
use tracing::debug;

mod commands;
mod session_file;
mod theme;

use commands::{config, props, stock};
use session_file::SessionFile;

/// Propbag - property bags over host variables
#[derive(Parser)]
#[command(name = "propbag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session file [default: <home>/session.json]
    #[arg(short, long, global = true)]
    session: Option<PathBuf>,

    /// Extra configuration file, applied over the user config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Propbag home directory [default: ~/.propbag]
    #[arg(long, global = true, env = "PROPBAG_HOME")]
    home: Option<PathBuf>,

    /// Item notes as a JSON object of id to note [default: <home>/items.json]
    #[arg(long, global = true)]
    notes: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a variable into an empty property bag
    Setup {
        /// Variable id
        id: i64,
    },

    /// Set a property; `createNewArray` stores an empty list
    Set {
        /// Entry id or alias
        target: String,
        /// Property key
        key: String,
        /// Value; several words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,
    },

    /// Print a property
    Get {
        /// Entry id or alias
        target: String,
        /// Property key
        key: String,
    },

    /// List the property keys of an entry
    Keys {
        /// Entry id or alias
        target: String,
    },

    /// Remove a property
    Remove {
        /// Entry id or alias
        target: String,
        /// Property key
        key: String,
    },

    /// Append to a list property
    Push {
        /// Entry id or alias
        target: String,
        /// Property key
        key: String,
        /// Value to append
        #[arg(required = true, num_args = 1..)]
        value: Vec<String>,
    },

    /// Print the length of a list property
    Len {
        /// Entry id or alias
        target: String,
        /// Property key
        key: String,
    },

    /// Apply arithmetic to a numeric property
    Change {
        /// add, sub, mul, div or mod
        op: String,
        /// Entry id or alias
        target: String,
        /// Property key
        key: String,
        /// Right-hand operand
        delta: String,
    },

    /// Name an entry so it can be addressed by alias
    Name {
        /// Variable id
        id: i64,
        /// New name
        name: String,
    },

    /// Label a variable as the host editor would
    Label {
        /// Variable id
        id: i64,
        /// Label text
        name: String,
    },

    /// Copy a property into a plain variable
    Store {
        /// Entry id or alias
        target: String,
        /// Property key
        key: String,
        /// Destination variable id
        destination: String,
    },

    /// Substitute property macros in text
    Render {
        /// Text containing macros such as `\VOBJ[hero:level]`
        text: String,
    },

    /// Print a variable, or write it when a value is given
    Var {
        /// Variable id
        id: i64,
        /// New value
        value: Vec<String>,
    },

    /// Forget all variables, aliases and purchase counts
    Reset,

    /// Manage limited shop stocks
    Stock {
        #[command(subcommand)]
        command: StockCommands,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum StockCommands {
    /// Show capacity and purchases of stock items
    Status {
        /// Only this item
        item: Option<u32>,
    },
    /// Record a purchase
    Buy {
        /// Item id
        item: u32,
        /// Units bought
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Restock one item
    Reset {
        /// Item id
        item: u32,
    },
    /// Restock every item
    ResetAll,
    /// Print which of the given items a shop would still list
    Filter {
        /// Item ids in shop order
        #[arg(required = true, num_args = 1..)]
        items: Vec<u32>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the resolved configuration with source annotations
    Show {
        /// Output format: toml (default) or json
        #[arg(long, default_value = "toml")]
        format: String,
        /// Only this section
        #[arg(long)]
        section: Option<String>,
    },
    /// Check that the configuration loads
    Validate,
}

impl Commands {
    /// Whether the command leaves the session file untouched.
    fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::Get { .. }
                | Self::Keys { .. }
                | Self::Len { .. }
                | Self::Render { .. }
                | Self::Config { .. }
                | Self::Stock {
                    command: StockCommands::Status { .. } | StockCommands::Filter { .. },
                }
        ) || matches!(self, Self::Var { value, .. } if value.is_empty())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = Config::load(cli.config.as_deref(), cli.home.as_deref());

    // Set up logging from config, with --verbose override.
    let log_config = if let Ok(resolved) = &resolved {
        let mut lc = config_bridge::to_log_config(&resolved.config);
        if cli.verbose {
            "debug".clone_into(&mut lc.level);
        }
        lc
    } else {
        // Fallback if config loading fails.
        let level = if cli.verbose { "debug" } else { "info" };
        propbag_telemetry::LogConfig::new(level).with_format(propbag_telemetry::LogFormat::Compact)
    };
    if let Err(e) = propbag_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Commands::Config { command } = &cli.command {
        return handle_config(command, &resolved);
    }

    let resolved = resolved.context("failed to load configuration")?;
    let mut file = SessionFile::open(
        cli.session.as_deref(),
        cli.home.as_deref(),
        cli.notes.as_deref(),
        &resolved.config,
    )?;

    let read_only = cli.command.is_read_only();
    run(cli.command, &mut file.session)?;
    if read_only {
        debug!("read-only command, session not saved");
    } else {
        file.save()?;
    }
    Ok(())
}

fn handle_config(command: &ConfigCommands, resolved: &ConfigResult<ResolvedConfig>) -> Result<()> {
    match command {
        ConfigCommands::Show { format, section } => {
            let resolved = resolved
                .as_ref()
                .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;
            config::show_config(resolved, format, section.as_deref())
        },
        ConfigCommands::Validate => config::validate_config(resolved),
    }
}

fn run(command: Commands, session: &mut Session) -> Result<()> {
    match command {
        Commands::Setup { id } => props::setup(session, id),
        Commands::Set { target, key, value } => props::set(session, &target, &key, &value),
        Commands::Get { target, key } => {
            props::get(session, &target, &key);
            Ok(())
        },
        Commands::Keys { target } => props::keys(session, &target),
        Commands::Remove { target, key } => props::remove(session, &target, &key),
        Commands::Push { target, key, value } => props::push(session, &target, &key, &value),
        Commands::Len { target, key } => props::len(session, &target, &key),
        Commands::Change {
            op,
            target,
            key,
            delta,
        } => props::change(session, &op, &target, &key, &delta),
        Commands::Name { id, name } => props::name(session, id, &name),
        Commands::Label { id, name } => props::label(session, id, &name),
        Commands::Store {
            target,
            key,
            destination,
        } => props::store(session, &target, &key, &destination),
        Commands::Render { text } => {
            props::render(session, &text);
            Ok(())
        },
        Commands::Var { id, value } => props::var(session, id, &value),
        Commands::Reset => {
            props::reset(session);
            Ok(())
        },
        Commands::Stock { command } => handle_stock(command, session),
        Commands::Config { .. } => Ok(()),
    }
}

fn handle_stock(command: StockCommands, session: &mut Session) -> Result<()> {
    match command {
        StockCommands::Status { item } => stock::status(session, item),
        StockCommands::Buy { item, quantity } => stock::buy(session, item, quantity),
        StockCommands::Reset { item } => {
            stock::reset(session, item);
            Ok(())
        },
        StockCommands::ResetAll => {
            stock::reset_all(session);
            Ok(())
        },
        StockCommands::Filter { items } => stock::filter(session, &items),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_read_only_commands() {
        let cli = Cli::parse_from(["propbag", "get", "hero", "level"]);
        assert!(cli.command.is_read_only());

        let cli = Cli::parse_from(["propbag", "var", "3"]);
        assert!(cli.command.is_read_only());

        let cli = Cli::parse_from(["propbag", "var", "3", "12"]);
        assert!(!cli.command.is_read_only());

        let cli = Cli::parse_from(["propbag", "stock", "buy", "1", "--quantity", "2"]);
        assert!(!cli.command.is_read_only());
    }

    #[test]
    fn test_set_takes_several_words() {
        let cli = Cli::parse_from(["propbag", "set", "hero", "title", "Dragon", "Slayer"]);
        match cli.command {
            Commands::Set { value, .. } => assert_eq!(value, ["Dragon", "Slayer"]),
            _ => panic!("expected set"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["propbag", "reset", "--session", "/tmp/s.json", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.session, Some(PathBuf::from("/tmp/s.json")));
    }
}
