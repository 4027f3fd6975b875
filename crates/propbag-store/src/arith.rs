//! In-place arithmetic on numeric properties.

use std::fmt;
use std::str::FromStr;

use propbag_core::{IntoEntryId, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bag::PropertyStore;
use crate::error::{StoreError, StoreResult};
use crate::variables::VariableStore;

/// A binary operation applied by [`PropertyStore::change_property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithOp {
    /// `current + delta`
    Add,
    /// `current - delta`
    Sub,
    /// `current * delta`
    Mul,
    /// `current / delta`, rounded to the nearest integer
    Div,
    /// `current % delta`, with the sign of `current`
    Mod,
}

impl ArithOp {
    /// Lower-case operation name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
        }
    }

    /// Apply the operation to two numbers.
    ///
    /// Integers stay integral unless the result overflows, in which case
    /// the float result is returned. Division rounds halves toward positive
    /// infinity; dividing by zero gives an infinite or `NaN` float, as does
    /// modulo by zero.
    ///
    /// # Errors
    ///
    /// [`StoreError::InvalidOperand`] when either side is not a number.
    pub fn apply(self, current: &Value, delta: &Value) -> StoreResult<Value> {
        let (Some(a), Some(b)) = (current.as_f64(), delta.as_f64()) else {
            let found = if current.as_f64().is_none() {
                current.type_name()
            } else {
                delta.type_name()
            };
            return Err(StoreError::InvalidOperand { found });
        };

        if let (Value::Int(x), Value::Int(y)) = (current, delta)
            && let Some(n) = self.apply_int(*x, *y)
        {
            return Ok(Value::Int(n));
        }

        Ok(match self {
            Self::Add => Value::Float(a + b),
            Self::Sub => Value::Float(a - b),
            Self::Mul => Value::Float(a * b),
            Self::Div => round_quotient(a / b),
            Self::Mod => Value::Float(a % b),
        })
    }

    /// Exact integer arithmetic; `None` falls back to floats.
    fn apply_int(self, x: i64, y: i64) -> Option<i64> {
        match self {
            Self::Add => x.checked_add(y),
            Self::Sub => x.checked_sub(y),
            Self::Mul => x.checked_mul(y),
            // Rounding needs the fractional part.
            Self::Div => None,
            Self::Mod => x.checked_rem(y),
        }
    }
}

/// Host rounding: nearest integer, halves toward positive infinity.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn round_quotient(q: f64) -> Value {
    let rounded = (q + 0.5).floor();
    if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Value::Int(rounded as i64)
    } else {
        Value::Float(rounded)
    }
}

impl FromStr for ArithOp {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" | "+" => Ok(Self::Add),
            "sub" | "-" => Ok(Self::Sub),
            "mul" | "*" => Ok(Self::Mul),
            "div" | "/" => Ok(Self::Div),
            "mod" | "%" => Ok(Self::Mod),
            _ => Err(StoreError::UnknownOperation(s.to_owned())),
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<S: VariableStore> PropertyStore<S> {
    /// Read a numeric property, combine it with `delta` and write it back.
    ///
    /// Returns the stored result.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidId`] / [`StoreError::ReservedSlot`] for bad ids
    /// - [`StoreError::NotANumber`] when the property is absent or not numeric
    /// - [`StoreError::InvalidOperand`] when `delta` is not numeric
    ///
    /// Nothing is written on error.
    pub fn change_property(
        &mut self,
        op: ArithOp,
        delta: impl Into<Value>,
        id: impl IntoEntryId,
        key: &str,
    ) -> StoreResult<Value> {
        let id = id.into_entry_id()?;
        if self.reserved() == Some(id) {
            return Err(StoreError::ReservedSlot { id });
        }
        let current = self.get_property(id, key)?;
        if current.as_f64().is_none() {
            warn!(%id, key, found = current.type_name(), "arithmetic on a non-numeric property");
            return Err(StoreError::NotANumber {
                id,
                key: self.policy().normalize(key).into_owned(),
                found: current.type_name(),
            });
        }

        let delta = delta.into();
        let result = op.apply(&current, &delta)?;
        debug!(%id, key, %op, %current, %delta, %result, "change property");
        self.set_property(id, key, result.clone())?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use propbag_core::{EntryId, KeyPolicy};

    use super::*;
    use crate::variables::Variables;

    fn store_with(key: &str, value: impl Into<Value>) -> PropertyStore<Variables> {
        let mut store = PropertyStore::new(Variables::new(), KeyPolicy::case_insensitive());
        store.set_property(1, key, value).unwrap();
        store
    }

    #[test]
    fn test_parse_names_and_symbols() {
        assert_eq!("add".parse::<ArithOp>().unwrap(), ArithOp::Add);
        assert_eq!("DIV".parse::<ArithOp>().unwrap(), ArithOp::Div);
        assert_eq!("%".parse::<ArithOp>().unwrap(), ArithOp::Mod);
        assert_eq!(
            "pow".parse::<ArithOp>(),
            Err(StoreError::UnknownOperation("pow".to_owned()))
        );
    }

    #[test]
    fn test_add_increments() {
        let mut store = store_with("a", 5);
        let result = store.change_property(ArithOp::Add, 1, 1, "A").unwrap();
        assert_eq!(result, Value::Int(6));
        assert_eq!(store.get_property(1, "a").unwrap(), Value::Int(6));
    }

    #[test]
    fn test_div_rounds_half_up() {
        let mut store = store_with("a", 5);
        store.change_property(ArithOp::Div, 2, 1, "a").unwrap();
        assert_eq!(store.get_property(1, "a").unwrap(), Value::Int(3));

        assert_eq!(
            ArithOp::Div.apply(&Value::Int(-5), &Value::Int(2)).unwrap(),
            Value::Int(-2)
        );
        assert_eq!(
            ArithOp::Div.apply(&Value::Int(7), &Value::Int(3)).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        let result = ArithOp::Div.apply(&Value::Int(5), &Value::Int(0)).unwrap();
        assert_eq!(result, Value::Float(f64::INFINITY));
        assert_eq!(result.to_string(), "Infinity");
    }

    #[test]
    fn test_mod_by_zero_is_nan() {
        let result = ArithOp::Mod.apply(&Value::Int(5), &Value::Int(0)).unwrap();
        assert!(matches!(result, Value::Float(x) if x.is_nan()));
    }

    #[test]
    fn test_mod_keeps_dividend_sign() {
        assert_eq!(
            ArithOp::Mod.apply(&Value::Int(-7), &Value::Int(3)).unwrap(),
            Value::Int(-1)
        );
    }

    #[test]
    fn test_overflow_falls_back_to_float() {
        let result = ArithOp::Add
            .apply(&Value::Int(i64::MAX), &Value::Int(1))
            .unwrap();
        assert!(matches!(result, Value::Float(_)));
    }

    #[test]
    fn test_mixed_operands_use_float() {
        assert_eq!(
            ArithOp::Mul.apply(&Value::Float(1.5), &Value::Int(3)).unwrap(),
            Value::Float(4.5)
        );
    }

    #[test]
    fn test_non_numeric_current_is_rejected() {
        let mut store = store_with("name", "Mark");
        let err = store.change_property(ArithOp::Add, 1, 1, "name").unwrap_err();
        assert!(matches!(err, StoreError::NotANumber { found: "string", .. }));
        assert_eq!(
            store.get_property(1, "name").unwrap(),
            Value::Str("Mark".to_owned())
        );

        let err = store.change_property(ArithOp::Add, 1, 1, "missing").unwrap_err();
        assert!(matches!(err, StoreError::NotANumber { found: "undefined", .. }));
        assert!(!store.has_property(1, "missing").unwrap());
    }

    #[test]
    fn test_non_numeric_delta_is_rejected() {
        let mut store = store_with("a", 5);
        let err = store.change_property(ArithOp::Sub, "x", 1, "a").unwrap_err();
        assert_eq!(err, StoreError::InvalidOperand { found: "string" });
        assert_eq!(store.get_property(1, "a").unwrap(), Value::Int(5));
    }

    #[test]
    fn test_reserved_and_invalid_ids() {
        let mut store = store_with("a", 5).with_reserved(Some(EntryId::new(2).unwrap()));
        assert!(matches!(
            store.change_property(ArithOp::Add, 1, 2, "a"),
            Err(StoreError::ReservedSlot { .. })
        ));
        assert_eq!(
            store.change_property(ArithOp::Add, 1, 0, "a"),
            Err(StoreError::InvalidId { id: 0 })
        );
    }
}
