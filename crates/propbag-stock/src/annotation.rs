//! Stock markers in item notes.
//!
//! An item joins the stock system when its note carries one of:
//!
//! ```text
//! <GStocks: 3>            literal capacity
//! <GStocks Var: 31>       capacity held by host variable 31
//! <GStocks Eval: v[31]*2> capacity computed by a formula
//! ```
//!
//! Literal and variable arguments run from the marker to the next `>`. A
//! formula argument runs to the last `>` that closes a complete formula, so
//! `<GStocks Eval: v[1] >= 3 ? 5 : 1>` keeps its comparison. Arguments may
//! span lines. When a note holds several kinds, the literal marker wins over
//! the variable marker, which wins over the formula marker.

use propbag_core::{EntryId, ItemId, parse_integer_token};
use tracing::warn;

use crate::error::{StockError, StockResult};
use crate::formula::{Formula, floor_to_capacity};

const LITERAL_MARKER: &str = "<GStocks:";
const VARIABLE_MARKER: &str = "<GStocks Var:";
const FORMULA_MARKER: &str = "<GStocks Eval:";

/// Which marker a note carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `<GStocks: N>`
    Literal,
    /// `<GStocks Var: V>`
    Variable,
    /// `<GStocks Eval: CODE>`
    Formula,
}

impl MarkerKind {
    /// Find the winning marker in a note.
    #[must_use]
    pub fn detect(note: &str) -> Option<Self> {
        [Self::Literal, Self::Variable, Self::Formula]
            .into_iter()
            .find(|kind| note.contains(kind.marker()))
    }

    const fn marker(self) -> &'static str {
        match self {
            Self::Literal => LITERAL_MARKER,
            Self::Variable => VARIABLE_MARKER,
            Self::Formula => FORMULA_MARKER,
        }
    }
}

/// A parsed stock rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockRule {
    /// Fixed capacity, floored when written as a decimal.
    Literal(i64),
    /// A literal marker without a usable number. Never sells out.
    Unbounded,
    /// Capacity read from a host variable on every query.
    Variable(EntryId),
    /// Capacity computed from formula source on every query.
    Formula(String),
}

impl StockRule {
    /// Parse the stock rule of `item` from its note.
    ///
    /// Returns `Ok(None)` for notes without a marker. A literal that is not
    /// a number parses as [`StockRule::Unbounded`]; an empty one reads `0`.
    ///
    /// # Errors
    ///
    /// [`StockError::InvalidAnnotation`] when the marker is unterminated or
    /// a variable id is not an in-range integer.
    pub fn parse(item: ItemId, note: &str) -> StockResult<Option<Self>> {
        let Some(kind) = MarkerKind::detect(note) else {
            return Ok(None);
        };
        let invalid = |message: String| StockError::InvalidAnnotation { item, message };

        let marker = kind.marker();
        let start = note
            .find(marker)
            .map_or(0, |at| at.saturating_add(marker.len()));
        let rest = note.get(start..).unwrap_or_default();
        let end = match kind {
            MarkerKind::Formula => formula_end(rest),
            MarkerKind::Literal | MarkerKind::Variable => rest.find('>'),
        };
        let Some(end) = end else {
            return Err(invalid(format!("'{marker}' is missing its closing '>'")));
        };
        let argument = rest.get(..end).unwrap_or_default().trim();

        let rule = match kind {
            MarkerKind::Literal => parse_literal(item, argument),
            MarkerKind::Variable => {
                let raw = parse_integer_token(argument)
                    .ok_or_else(|| invalid(format!("variable '{argument}' is not an id")))?;
                let id = EntryId::new(raw)
                    .map_err(|_| invalid(format!("variable {raw} is out of range")))?;
                Self::Variable(id)
            },
            MarkerKind::Formula => Self::Formula(argument.to_owned()),
        };
        Ok(Some(rule))
    }
}

fn parse_literal(item: ItemId, argument: &str) -> StockRule {
    if argument.is_empty() {
        return StockRule::Literal(0);
    }
    match argument.parse::<f64>().ok().and_then(floor_to_capacity) {
        Some(stock) => StockRule::Literal(stock),
        None => {
            warn!(%item, argument, "stock literal is not a number, item never sells out");
            StockRule::Unbounded
        },
    }
}

/// Byte offset of the `>` closing a formula argument.
///
/// The last `>` whose preceding text parses as a formula; failing that, the
/// first `>` so the syntax error surfaces on evaluation.
fn formula_end(rest: &str) -> Option<usize> {
    let closers: Vec<usize> = rest.match_indices('>').map(|(at, _)| at).collect();
    closers
        .iter()
        .rev()
        .copied()
        .find(|&at| {
            rest.get(..at)
                .is_some_and(|source| Formula::parse(source.trim()).is_ok())
        })
        .or_else(|| closers.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ItemId {
        ItemId::new(7)
    }

    #[test]
    fn test_no_marker() {
        assert_eq!(StockRule::parse(item(), "A plain potion.").unwrap(), None);
        assert_eq!(MarkerKind::detect(""), None);
        // Markers are case sensitive.
        assert_eq!(MarkerKind::detect("<gstocks: 3>"), None);
    }

    #[test]
    fn test_literal() {
        assert_eq!(
            StockRule::parse(item(), "<GStocks: 3>").unwrap(),
            Some(StockRule::Literal(3))
        );
        assert_eq!(
            StockRule::parse(item(), "Rare!\n<GStocks:12>\nMore text").unwrap(),
            Some(StockRule::Literal(12))
        );
    }

    #[test]
    fn test_variable() {
        assert_eq!(
            StockRule::parse(item(), "<GStocks Var: 31>").unwrap(),
            Some(StockRule::Variable(EntryId::new(31).unwrap()))
        );
    }

    #[test]
    fn test_formula_spans_lines() {
        let note = "<GStocks Eval:\nv[1] > 3\n? 2\n: 5>";
        assert_eq!(
            StockRule::parse(item(), note).unwrap(),
            Some(StockRule::Formula("v[1] > 3\n? 2\n: 5".to_owned()))
        );

        let note = "<GStocks Eval:\n min(v[1],\n 4) >";
        assert_eq!(
            StockRule::parse(item(), note).unwrap(),
            Some(StockRule::Formula("min(v[1],\n 4)".to_owned()))
        );
    }

    #[test]
    fn test_formula_keeps_comparisons() {
        let note = "<GStocks Eval: prop(hero, level) >= 10 ? 5 : 1>";
        assert_eq!(
            StockRule::parse(item(), note).unwrap(),
            Some(StockRule::Formula("prop(hero, level) >= 10 ? 5 : 1".to_owned()))
        );

        // Text after the marker, including other tags, is not swallowed.
        let note = "<GStocks Eval: v[2] > 1 ? 3 : 0> sold at <Shop: north> only";
        assert_eq!(
            StockRule::parse(item(), note).unwrap(),
            Some(StockRule::Formula("v[2] > 1 ? 3 : 0".to_owned()))
        );
    }

    #[test]
    fn test_broken_formula_ends_at_first_close() {
        let note = "<GStocks Eval: v[1] + > trailing >";
        assert_eq!(
            StockRule::parse(item(), note).unwrap(),
            Some(StockRule::Formula("v[1] +".to_owned()))
        );
    }

    #[test]
    fn test_decimal_and_unusable_literals() {
        assert_eq!(
            StockRule::parse(item(), "<GStocks: 2.5>").unwrap(),
            Some(StockRule::Literal(2))
        );
        assert_eq!(
            StockRule::parse(item(), "<GStocks: >").unwrap(),
            Some(StockRule::Literal(0))
        );
        assert_eq!(
            StockRule::parse(item(), "<GStocks: lots>").unwrap(),
            Some(StockRule::Unbounded)
        );
    }

    #[test]
    fn test_precedence() {
        let note = "<GStocks Eval: 9> <GStocks Var: 2> <GStocks: 1>";
        assert_eq!(MarkerKind::detect(note), Some(MarkerKind::Literal));
        assert_eq!(
            StockRule::parse(item(), note).unwrap(),
            Some(StockRule::Literal(1))
        );

        let note = "<GStocks Eval: 9> <GStocks Var: 2>";
        assert_eq!(MarkerKind::detect(note), Some(MarkerKind::Variable));
    }

    #[test]
    fn test_malformed() {
        assert!(matches!(
            StockRule::parse(item(), "<GStocks Var: 0>"),
            Err(StockError::InvalidAnnotation { .. })
        ));
        assert!(matches!(
            StockRule::parse(item(), "<GStocks: 3"),
            Err(StockError::InvalidAnnotation { .. })
        ));
    }
}
