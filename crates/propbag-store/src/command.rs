//! Positional command parsing.
//!
//! Hosts that drive the store from event scripts hand over a command name
//! and a list of string arguments. Parsing turns those into a typed
//! [`Command`]; executing one is up to whoever owns the alias index.

use propbag_core::{EntryId, Value};
use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// A parsed host command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Write `value` into property `key` of `target`.
    SetProperty {
        /// Entry id or alias, resolved when the command runs.
        target: String,
        /// Property key as written.
        key: String,
        /// Parsed value.
        value: Value,
    },
    /// Copy property `key` of `target` into the scalar slot `destination`.
    StoreProperty {
        /// Entry id or alias, resolved when the command runs.
        target: String,
        /// Property key as written.
        key: String,
        /// Slot receiving the value.
        destination: EntryId,
    },
}

impl Command {
    /// Parse a command name and its positional arguments.
    ///
    /// Names compare loosely: case, spaces, `_` and `-` are ignored, so
    /// `"Set Property"`, `"set_property"` and `"setProperty"` are the same
    /// command. A set value spanning several arguments is joined with
    /// single spaces.
    ///
    /// # Errors
    ///
    /// [`StoreError::Command`] for unknown names or missing arguments,
    /// [`StoreError::NotAnInteger`] / [`StoreError::InvalidId`] for a bad
    /// destination.
    ///
    /// # Example
    ///
    /// ```
    /// use propbag_core::Value;
    /// use propbag_store::Command;
    ///
    /// let cmd = Command::parse("set property", &["hero", "hp", "30"]).unwrap();
    /// assert_eq!(
    ///     cmd,
    ///     Command::SetProperty {
    ///         target: "hero".into(),
    ///         key: "hp".into(),
    ///         value: Value::Int(30),
    ///     }
    /// );
    /// ```
    pub fn parse(name: &str, args: &[&str]) -> StoreResult<Self> {
        let folded: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "setproperty" | "setprop" => {
                let [target, key, rest @ ..] = args else {
                    return Err(usage(name, "expected <id> <key> <value>"));
                };
                if rest.is_empty() {
                    return Err(usage(name, "expected <id> <key> <value>"));
                }
                Ok(Self::SetProperty {
                    target: (*target).to_owned(),
                    key: (*key).to_owned(),
                    value: Value::from_command_arg(&rest.join(" ")),
                })
            },
            "storeproperty" | "storeprop" | "storepropertyintovariable" => {
                let [target, key, destination] = args else {
                    return Err(usage(name, "expected <id> <key> <destination>"));
                };
                let destination = destination.parse::<EntryId>().map_err(|err| {
                    warn!(command = name, error = %err, "bad destination id");
                    StoreError::from(err)
                })?;
                Ok(Self::StoreProperty {
                    target: (*target).to_owned(),
                    key: (*key).to_owned(),
                    destination,
                })
            },
            _ => Err(usage(name, "unknown command")),
        }
    }

    /// Canonical command name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetProperty { .. } => "set property",
            Self::StoreProperty { .. } => "store property",
        }
    }

    /// The id-or-alias token the command addresses.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::SetProperty { target, .. } | Self::StoreProperty { target, .. } => target,
        }
    }
}

fn usage(command: &str, message: &str) -> StoreError {
    warn!(command, message, "rejected command");
    StoreError::Command {
        command: command.to_owned(),
        message: message.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_property_values() {
        let cmd = Command::parse("setProperty", &["1", "a", "true"]).unwrap();
        assert!(matches!(
            cmd,
            Command::SetProperty {
                value: Value::Bool(true),
                ..
            }
        ));

        let cmd = Command::parse("SET_PROPERTY", &["1", "b", "2.5"]).unwrap();
        assert!(matches!(cmd, Command::SetProperty { value: Value::Float(x), .. } if (x - 2.5).abs() < f64::EPSILON));

        let cmd = Command::parse("set-property", &["1", "bag", "createNewArray"]).unwrap();
        assert!(matches!(cmd, Command::SetProperty { value, .. } if value.is_create_sequence()));
    }

    #[test]
    fn test_set_value_joins_rest() {
        let cmd = Command::parse("set property", &["mark", "title", "The", "Brave"]).unwrap();
        assert_eq!(
            cmd,
            Command::SetProperty {
                target: "mark".to_owned(),
                key: "title".to_owned(),
                value: Value::Str("The Brave".to_owned()),
            }
        );
        assert_eq!(cmd.target(), "mark");
    }

    #[test]
    fn test_parse_store_property() {
        let cmd = Command::parse("Store Property", &["hero", "hp", "12"]).unwrap();
        assert_eq!(
            cmd,
            Command::StoreProperty {
                target: "hero".to_owned(),
                key: "hp".to_owned(),
                destination: EntryId::new(12).unwrap(),
            }
        );
        assert_eq!(cmd.name(), "store property");
    }

    #[test]
    fn test_bad_destination() {
        assert!(matches!(
            Command::parse("storeProperty", &["1", "a", "x"]),
            Err(StoreError::NotAnInteger { .. })
        ));
        assert_eq!(
            Command::parse("storeProperty", &["1", "a", "0"]),
            Err(StoreError::InvalidId { id: 0 })
        );
    }

    #[test]
    fn test_missing_arguments() {
        assert!(matches!(
            Command::parse("setProperty", &["1", "a"]),
            Err(StoreError::Command { .. })
        ));
        assert!(matches!(
            Command::parse("storeProperty", &["1"]),
            Err(StoreError::Command { .. })
        ));
    }

    #[test]
    fn test_unknown_command() {
        let err = Command::parse("deleteEverything", &[]).unwrap_err();
        assert_eq!(
            err,
            StoreError::Command {
                command: "deleteEverything".to_owned(),
                message: "unknown command".to_owned(),
            }
        );
    }
}
