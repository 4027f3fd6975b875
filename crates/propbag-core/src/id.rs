//! Entry and item identifiers.
//!
//! Entry ids address slots of the host variable store and are range-checked
//! at construction, so any `EntryId` in hand is known to be valid. Item ids
//! address the host's item catalog and carry no range policy of their own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Lowest addressable entry id.
pub const MIN_ENTRY_ID: u32 = 1;

/// Highest addressable entry id.
pub const MAX_ENTRY_ID: u32 = 9999;

/// A validated id of one slot in the host variable store.
///
/// # Example
///
/// ```
/// use propbag_core::EntryId;
///
/// assert!(EntryId::new(1).is_ok());
/// assert!(EntryId::new(9999).is_ok());
/// assert!(EntryId::new(0).is_err());
/// assert!(EntryId::new(-3).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct EntryId(u32);

impl EntryId {
    /// Validate a raw id against `[MIN_ENTRY_ID, MAX_ENTRY_ID]`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidId`] when the id is out of range. The id is
    /// never clamped.
    pub fn new(raw: i64) -> CoreResult<Self> {
        match u32::try_from(raw) {
            Ok(id) if (MIN_ENTRY_ID..=MAX_ENTRY_ID).contains(&id) => Ok(Self(id)),
            _ => Err(CoreError::InvalidId { id: raw }),
        }
    }

    /// The raw numeric id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for EntryId {
    type Error = CoreError;

    fn try_from(raw: i64) -> CoreResult<Self> {
        Self::new(raw)
    }
}

impl From<EntryId> for u32 {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl FromStr for EntryId {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let raw = parse_integer_token(s).ok_or_else(|| CoreError::NotAnInteger {
            token: s.to_owned(),
        })?;
        Self::new(raw)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversion into a validated [`EntryId`] at an API boundary.
///
/// Lets entry points accept either an already validated id or a raw host
/// integer, with the range check happening exactly once.
pub trait IntoEntryId {
    /// Validate and convert.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidId`] for out-of-range raw ids.
    fn into_entry_id(self) -> CoreResult<EntryId>;
}

impl IntoEntryId for EntryId {
    fn into_entry_id(self) -> CoreResult<EntryId> {
        Ok(self)
    }
}

impl IntoEntryId for i64 {
    fn into_entry_id(self) -> CoreResult<EntryId> {
        EntryId::new(self)
    }
}

impl IntoEntryId for i32 {
    fn into_entry_id(self) -> CoreResult<EntryId> {
        EntryId::new(i64::from(self))
    }
}

impl IntoEntryId for u32 {
    fn into_entry_id(self) -> CoreResult<EntryId> {
        EntryId::new(i64::from(self))
    }
}

/// Id of an item in the host's item catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u32);

impl ItemId {
    /// Wrap a raw catalog id.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw numeric id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ItemId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl FromStr for ItemId {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| CoreError::NotAnInteger {
                token: s.to_owned(),
            })
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a token as a plain integer (surrounding whitespace allowed).
///
/// Returns `None` for anything else, including floats and names.
#[must_use]
pub fn parse_integer_token(token: &str) -> Option<i64> {
    token.trim().parse::<i64>().ok()
}
