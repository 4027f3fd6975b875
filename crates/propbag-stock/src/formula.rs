//! The restricted capacity formula language.
//!
//! Formulas are small expressions over numbers and booleans:
//!
//! ```text
//! 3 + v[31] * 2
//! prop(hero, level) >= 10 ? 5 : 1
//! max(0, min(v[4], 12))
//! ```
//!
//! - literals: decimal numbers, `true`, `false`
//! - operators, loosest first: `?:`, `||`, `&&`, `== !=`, `< <= > >=`,
//!   `+ -`, `* / %`, unary `- !`
//! - `v[N]` reads host variable `N` (unset variables read as `0`)
//! - `prop(OWNER, KEY)` reads a property, `OWNER` being an id or alias
//! - functions: `min`, `max`, `abs`, `floor`, `ceil`, `round`
//!
//! Booleans count as `1`/`0` in arithmetic. Evaluation is pure: a formula
//! can read the session but never change it.
//!
//! Inside an item note the formula ends at the last `>` that closes a
//! complete formula, so comparisons may use `>` and `>=`.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use propbag_core::{EntryId, Value};
use propbag_store::{StoreView, VariableStore};

use crate::error::{FormulaError, FormulaResult};

/// Longest accepted formula source, in bytes.
pub const MAX_FORMULA_LEN: usize = 4096;

/// Deepest accepted nesting of parentheses, calls and unary operators.
pub const MAX_FORMULA_DEPTH: usize = 64;

/// What a formula may read.
pub trait EvalContext {
    /// The host's value of variable `id`.
    fn variable(&self, id: EntryId) -> Value;

    /// Property `key` of the entry named by `owner` (id or alias).
    fn property(&self, owner: &str, key: &str) -> Value;
}

impl<S: VariableStore> EvalContext for StoreView<'_, S> {
    fn variable(&self, id: EntryId) -> Value {
        StoreView::variable(self, id)
    }

    fn property(&self, owner: &str, key: &str) -> Value {
        self.lookup(owner, key)
    }
}

/// A parsed formula.
///
/// # Example
///
/// ```
/// use propbag_core::{EntryId, Value};
/// use propbag_stock::{EvalContext, Formula};
///
/// struct Vars;
///
/// impl EvalContext for Vars {
///     fn variable(&self, id: EntryId) -> Value {
///         Value::Int(i64::from(id.get()) * 10)
///     }
///
///     fn property(&self, _owner: &str, _key: &str) -> Value {
///         Value::Undefined
///     }
/// }
///
/// let formula = Formula::parse("v[3] > 20 ? v[3] / 4 : 1").unwrap();
/// assert_eq!(formula.evaluate(&Vars).unwrap(), 7.5);
/// assert_eq!(formula.capacity(&Vars).unwrap(), 7);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    root: Expr,
}

impl Formula {
    /// Parse formula source.
    ///
    /// # Errors
    ///
    /// [`FormulaError::Syntax`], [`FormulaError::TooLong`],
    /// [`FormulaError::TooDeep`], [`FormulaError::UnknownFunction`] or
    /// [`FormulaError::Arity`].
    pub fn parse(source: &str) -> FormulaResult<Self> {
        if source.len() > MAX_FORMULA_LEN {
            return Err(FormulaError::TooLong {
                len: source.len(),
                max: MAX_FORMULA_LEN,
            });
        }
        let tokens = lex(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            end: source.len(),
        };
        let root = parser.ternary(0)?;
        if let Some((tok, at)) = parser.peek() {
            return Err(syntax(*at, format!("unexpected {tok}")));
        }
        Ok(Self {
            source: source.to_owned(),
            root,
        })
    }

    /// The source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate to a number.
    ///
    /// # Errors
    ///
    /// [`FormulaError::InvalidVariable`] and [`FormulaError::NotNumeric`] for
    /// unusable reads.
    pub fn evaluate(&self, ctx: &impl EvalContext) -> FormulaResult<f64> {
        Ok(eval(&self.root, ctx)?.number())
    }

    /// Evaluate and floor to an integer capacity.
    ///
    /// # Errors
    ///
    /// As [`Formula::evaluate`], plus [`FormulaError::NotFinite`] when the
    /// result has no integer value.
    pub fn capacity(&self, ctx: &impl EvalContext) -> FormulaResult<i64> {
        floor_to_capacity(self.evaluate(ctx)?).ok_or(FormulaError::NotFinite)
    }
}

/// Floor a number to an integer capacity; `None` for `NaN`, infinities and
/// values outside `i64`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn floor_to_capacity(value: f64) -> Option<i64> {
    let floored = value.floor();
    (floored.is_finite() && floored >= i64::MIN as f64 && floored < i64::MAX as f64)
        .then_some(floored as i64)
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Ident(String),
    Str(String),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Question,
    Colon,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Num(n) => return write!(f, "number {n}"),
            Self::Ident(name) => return write!(f, "'{name}'"),
            Self::Str(s) => return write!(f, "string {s:?}"),
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Comma => ",",
            Self::Question => "?",
            Self::Colon => ":",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Bang => "!",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        write!(f, "'{symbol}'")
    }
}

fn syntax(position: usize, message: impl Into<String>) -> FormulaError {
    FormulaError::Syntax {
        position,
        message: message.into(),
    }
}

type Chars<'s> = Peekable<CharIndices<'s>>;

/// Consume the next char if it is `want`.
fn next_is(chars: &mut Chars<'_>, want: char) -> bool {
    chars.next_if(|&(_, c)| c == want).is_some()
}

fn lex(source: &str) -> FormulaResult<Vec<(Tok, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((at, c)) = chars.next() {
        let tok = match c {
            c if c.is_whitespace() => continue,
            '(' => Tok::LParen,
            ')' => Tok::RParen,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            ',' => Tok::Comma,
            '?' => Tok::Question,
            ':' => Tok::Colon,
            '+' => Tok::Plus,
            '-' => Tok::Minus,
            '*' => Tok::Star,
            '/' => Tok::Slash,
            '%' => Tok::Percent,
            '&' if next_is(&mut chars, '&') => Tok::AndAnd,
            '|' if next_is(&mut chars, '|') => Tok::OrOr,
            '=' if next_is(&mut chars, '=') => {
                // `===` is accepted as `==`.
                next_is(&mut chars, '=');
                Tok::EqEq
            },
            '!' if next_is(&mut chars, '=') => {
                next_is(&mut chars, '=');
                Tok::NotEq
            },
            '!' => Tok::Bang,
            '<' if next_is(&mut chars, '=') => Tok::Le,
            '<' => Tok::Lt,
            '>' if next_is(&mut chars, '=') => Tok::Ge,
            '>' => Tok::Gt,
            '\'' | '"' => {
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some((_, end)) if end == c => break,
                        Some((_, ch)) => text.push(ch),
                        None => return Err(syntax(at, "unterminated string")),
                    }
                }
                Tok::Str(text)
            },
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = at.saturating_add(c.len_utf8());
                while let Some((i, ch)) = chars.next_if(|&(_, ch)| ch.is_ascii_digit() || ch == '.') {
                    end = i.saturating_add(ch.len_utf8());
                }
                let text = source.get(at..end).unwrap_or_default();
                let n = text
                    .parse::<f64>()
                    .map_err(|_| syntax(at, format!("bad number '{text}'")))?;
                Tok::Num(n)
            },
            c if c.is_alphabetic() || c == '_' || c == '$' => {
                let mut end = at.saturating_add(c.len_utf8());
                while let Some((i, ch)) =
                    chars.next_if(|&(_, ch)| ch.is_alphanumeric() || ch == '_' || ch == '$')
                {
                    end = i.saturating_add(ch.len_utf8());
                }
                Tok::Ident(source.get(at..end).unwrap_or_default().to_owned())
            },
            other => return Err(syntax(at, format!("unexpected character '{other}'"))),
        };
        tokens.push((tok, at));
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinOp {
    fn from_tok(tok: &Tok) -> Option<(u8, Self)> {
        Some(match tok {
            Tok::OrOr => (1, Self::Or),
            Tok::AndAnd => (2, Self::And),
            Tok::EqEq => (3, Self::Eq),
            Tok::NotEq => (3, Self::Ne),
            Tok::Lt => (4, Self::Lt),
            Tok::Le => (4, Self::Le),
            Tok::Gt => (4, Self::Gt),
            Tok::Ge => (4, Self::Ge),
            Tok::Plus => (5, Self::Add),
            Tok::Minus => (5, Self::Sub),
            Tok::Star => (6, Self::Mul),
            Tok::Slash => (6, Self::Div),
            Tok::Percent => (6, Self::Rem),
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Func {
    Min,
    Max,
    Abs,
    Floor,
    Ceil,
    Round,
}

impl Func {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "min" => Self::Min,
            "max" => Self::Max,
            "abs" => Self::Abs,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            _ => return None,
        })
    }

    const fn is_variadic(self) -> bool {
        matches!(self, Self::Min | Self::Max)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Num(f64),
    Bool(bool),
    Var(Box<Expr>),
    Prop { owner: String, key: String },
    Neg(Box<Expr>),
    Not(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Cond(Box<Expr>, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

struct Parser {
    tokens: Vec<(Tok, usize)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(Tok, usize)> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> FormulaResult<(Tok, usize)> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| syntax(self.end, "unexpected end of formula"))?;
        self.pos = self.pos.saturating_add(1);
        Ok(tok)
    }

    fn eat(&mut self, want: &Tok) -> bool {
        if self.peek().is_some_and(|(tok, _)| tok == want) {
            self.pos = self.pos.saturating_add(1);
            true
        } else {
            false
        }
    }

    fn expect(&mut self, want: &Tok) -> FormulaResult<()> {
        let (tok, at) = self.next()?;
        if &tok == want {
            Ok(())
        } else {
            Err(syntax(at, format!("expected {want}, found {tok}")))
        }
    }

    fn ternary(&mut self, depth: usize) -> FormulaResult<Expr> {
        if depth > MAX_FORMULA_DEPTH {
            return Err(FormulaError::TooDeep(MAX_FORMULA_DEPTH));
        }
        let cond = self.binary(1, depth)?;
        if !self.eat(&Tok::Question) {
            return Ok(cond);
        }
        let then = self.ternary(depth.saturating_add(1))?;
        self.expect(&Tok::Colon)?;
        let otherwise = self.ternary(depth.saturating_add(1))?;
        Ok(Expr::Cond(Box::new(cond), Box::new(then), Box::new(otherwise)))
    }

    fn binary(&mut self, min_bp: u8, depth: usize) -> FormulaResult<Expr> {
        let mut lhs = self.unary(depth)?;
        while let Some((bp, op)) = self.peek().and_then(|(tok, _)| BinOp::from_tok(tok)) {
            if bp < min_bp {
                break;
            }
            self.pos = self.pos.saturating_add(1);
            let rhs = self.binary(bp.saturating_add(1), depth)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self, depth: usize) -> FormulaResult<Expr> {
        if depth > MAX_FORMULA_DEPTH {
            return Err(FormulaError::TooDeep(MAX_FORMULA_DEPTH));
        }
        let deeper = depth.saturating_add(1);
        if self.eat(&Tok::Minus) {
            return Ok(Expr::Neg(Box::new(self.unary(deeper)?)));
        }
        if self.eat(&Tok::Bang) {
            return Ok(Expr::Not(Box::new(self.unary(deeper)?)));
        }
        if self.eat(&Tok::Plus) {
            return self.unary(deeper);
        }
        self.primary(deeper)
    }

    fn primary(&mut self, depth: usize) -> FormulaResult<Expr> {
        let (tok, at) = self.next()?;
        match tok {
            Tok::Num(n) => Ok(Expr::Num(n)),
            Tok::LParen => {
                let inner = self.ternary(depth)?;
                self.expect(&Tok::RParen)?;
                Ok(inner)
            },
            Tok::Ident(name) => match name.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "v" if self.eat(&Tok::LBracket) => {
                    let index = self.ternary(depth)?;
                    self.expect(&Tok::RBracket)?;
                    Ok(Expr::Var(Box::new(index)))
                },
                "prop" => self.prop_call(),
                _ => self.call(&name, at, depth),
            },
            other => Err(syntax(at, format!("unexpected {other}"))),
        }
    }

    /// `prop(OWNER, KEY)`; both arguments are bare words, numbers or strings.
    fn prop_call(&mut self) -> FormulaResult<Expr> {
        self.expect(&Tok::LParen)?;
        let owner = self.word()?;
        self.expect(&Tok::Comma)?;
        let key = self.word()?;
        self.expect(&Tok::RParen)?;
        Ok(Expr::Prop { owner, key })
    }

    fn word(&mut self) -> FormulaResult<String> {
        let (tok, at) = self.next()?;
        match tok {
            Tok::Ident(word) | Tok::Str(word) => Ok(word),
            Tok::Num(n) => Ok(n.to_string()),
            other => Err(syntax(at, format!("expected a name, found {other}"))),
        }
    }

    fn call(&mut self, name: &str, at: usize, depth: usize) -> FormulaResult<Expr> {
        if !self.eat(&Tok::LParen) {
            return Err(syntax(at, format!("unknown name '{name}'")));
        }
        let func = Func::lookup(name).ok_or_else(|| FormulaError::UnknownFunction(name.to_owned()))?;
        let mut args = Vec::new();
        if !self.eat(&Tok::RParen) {
            loop {
                args.push(self.ternary(depth)?);
                if self.eat(&Tok::RParen) {
                    break;
                }
                self.expect(&Tok::Comma)?;
            }
        }
        let arity_ok = if func.is_variadic() {
            !args.is_empty()
        } else {
            args.len() == 1
        };
        if !arity_ok {
            return Err(FormulaError::Arity {
                function: name.to_owned(),
                expected: if func.is_variadic() { "at least 1" } else { "1" },
                found: args.len(),
            });
        }
        Ok(Expr::Call(func, args))
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scalar {
    Num(f64),
    Bool(bool),
}

impl Scalar {
    fn number(self) -> f64 {
        match self {
            Self::Num(n) => n,
            Self::Bool(b) => f64::from(u8::from(b)),
        }
    }

    #[allow(clippy::float_cmp)]
    fn truthy(self) -> bool {
        match self {
            Self::Num(n) => n != 0.0 && !n.is_nan(),
            Self::Bool(b) => b,
        }
    }

    fn from_value(value: &Value, source_ref: impl FnOnce() -> String) -> FormulaResult<Self> {
        match value {
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::Str(s) => s.trim().parse::<f64>().map(Self::Num).map_err(|_| {
                FormulaError::NotNumeric {
                    source_ref: source_ref(),
                    found: value.type_name(),
                }
            }),
            other => other.as_f64().map(Self::Num).ok_or_else(|| FormulaError::NotNumeric {
                source_ref: source_ref(),
                found: other.type_name(),
            }),
        }
    }
}

#[allow(clippy::float_cmp, clippy::cast_possible_truncation)]
fn eval(expr: &Expr, ctx: &impl EvalContext) -> FormulaResult<Scalar> {
    Ok(match expr {
        Expr::Num(n) => Scalar::Num(*n),
        Expr::Bool(b) => Scalar::Bool(*b),
        Expr::Var(index) => {
            let raw = eval(index, ctx)?.number();
            let id = if raw.is_finite() && raw.fract() == 0.0 {
                EntryId::new(raw as i64).ok()
            } else {
                None
            };
            let id = id.ok_or(FormulaError::InvalidVariable(raw as i64))?;
            Scalar::from_value(&ctx.variable(id), || format!("v[{id}]"))?
        },
        Expr::Prop { owner, key } => {
            Scalar::from_value(&ctx.property(owner, key), || format!("prop({owner}, {key})"))?
        },
        Expr::Neg(inner) => Scalar::Num(-eval(inner, ctx)?.number()),
        Expr::Not(inner) => Scalar::Bool(!eval(inner, ctx)?.truthy()),
        Expr::Binary(op, lhs, rhs) => {
            let left = eval(lhs, ctx)?;
            let a = left.number();
            let right = || eval(rhs, ctx).map(Scalar::number);
            match op {
                BinOp::Or => {
                    if left.truthy() { left } else { eval(rhs, ctx)? }
                },
                BinOp::And => {
                    if left.truthy() { eval(rhs, ctx)? } else { left }
                },
                BinOp::Eq => Scalar::Bool(a == right()?),
                BinOp::Ne => Scalar::Bool(a != right()?),
                BinOp::Lt => Scalar::Bool(a < right()?),
                BinOp::Le => Scalar::Bool(a <= right()?),
                BinOp::Gt => Scalar::Bool(a > right()?),
                BinOp::Ge => Scalar::Bool(a >= right()?),
                BinOp::Add => Scalar::Num(a + right()?),
                BinOp::Sub => Scalar::Num(a - right()?),
                BinOp::Mul => Scalar::Num(a * right()?),
                BinOp::Div => Scalar::Num(a / right()?),
                BinOp::Rem => Scalar::Num(a % right()?),
            }
        },
        Expr::Cond(cond, then, otherwise) => {
            if eval(cond, ctx)?.truthy() {
                eval(then, ctx)?
            } else {
                eval(otherwise, ctx)?
            }
        },
        Expr::Call(func, args) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, ctx)?.number());
            }
            let first = values.first().copied().unwrap_or(f64::NAN);
            Scalar::Num(match func {
                Func::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
                Func::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                Func::Abs => first.abs(),
                Func::Floor => first.floor(),
                Func::Ceil => first.ceil(),
                Func::Round => (first + 0.5).floor(),
            })
        },
    })
}

#[cfg(test)]
#[path = "formula_tests.rs"]
mod tests;
