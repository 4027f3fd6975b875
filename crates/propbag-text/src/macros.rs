//! The `\VOBJ[LEFT:RIGHT]` macro resolver.

use std::ops::Range;
use std::sync::LazyLock;

use propbag_core::{EntryId, Value};
use propbag_store::{StoreView, VariableStore};
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::{TextError, TextResult};

/// Macro code recognised when none is configured.
pub const DEFAULT_MACRO_CODE: &str = "VOBJ";

static DEFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&pattern_for(DEFAULT_MACRO_CODE)).expect("invalid regex")
});

/// Escape char (`\` as typed, or the host's converted `\x1b`), the code in
/// any case, then a bracketed `LEFT:RIGHT` with both sides non-greedy.
fn pattern_for(code: &str) -> String {
    format!(r"(?i)[\\\x1b]{}\[(.+?):(.+?)\]", regex::escape(code))
}

/// What a macro may read.
pub trait PropertySource {
    /// Resolve an id-or-alias token.
    fn resolve(&self, token: &str) -> Option<EntryId>;

    /// Read a property; [`Value::Undefined`] when absent.
    fn property(&self, id: EntryId, key: &str) -> Value;
}

impl<S: VariableStore> PropertySource for StoreView<'_, S> {
    fn resolve(&self, token: &str) -> Option<EntryId> {
        StoreView::resolve(self, token)
    }

    fn property(&self, id: EntryId, key: &str) -> Value {
        StoreView::property(self, id, key)
    }
}

/// One macro token found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroRef<'t> {
    /// Id or alias part.
    pub left: &'t str,
    /// Property key part.
    pub right: &'t str,
    /// Byte range of the whole token.
    pub span: Range<usize>,
}

/// Substitutes macro tokens in display text.
#[derive(Debug, Clone)]
pub struct MacroResolver {
    code: String,
    pattern: Regex,
}

impl MacroResolver {
    /// Build a resolver for a custom macro code such as `PROP`.
    ///
    /// # Errors
    ///
    /// [`TextError::InvalidCode`] unless the code is non-empty ASCII
    /// alphanumeric.
    pub fn with_code(code: &str) -> TextResult<Self> {
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TextError::InvalidCode(code.to_owned()));
        }
        let pattern =
            Regex::new(&pattern_for(code)).map_err(|e| TextError::Pattern(e.to_string()))?;
        Ok(Self {
            code: code.to_owned(),
            pattern,
        })
    }

    /// The macro code this resolver matches.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Replace every token in `text`, left to right, in a single pass.
    ///
    /// Substituted values are never scanned again, so a property holding
    /// macro syntax is shown literally.
    pub fn render(&self, text: &str, source: &impl PropertySource) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let (left, right) = (&caps[1], &caps[2]);
                let value = source
                    .resolve(left)
                    .map_or(Value::Undefined, |id| source.property(id, right));
                if value.is_undefined() {
                    debug!(left, right, "macro resolved to undefined");
                }
                value.to_string()
            })
            .into_owned()
    }

    /// List the tokens in `text` without resolving them.
    #[must_use]
    pub fn references<'t>(&self, text: &'t str) -> Vec<MacroRef<'t>> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(MacroRef {
                    left: caps.get(1)?.as_str(),
                    right: caps.get(2)?.as_str(),
                    span: whole.range(),
                })
            })
            .collect()
    }
}

impl Default for MacroResolver {
    fn default() -> Self {
        Self {
            code: DEFAULT_MACRO_CODE.to_owned(),
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}
