//! `#if` / `#elif` condition expressions.
//!
//! Evaluation has two phases:
//!
//! 1. **Expansion**: `defined NAME` / `defined(NAME)` become `1`/`0`, then
//!    macros are replaced by their bodies and rescanned. A macro is hidden
//!    while its own expansion is rescanned, so self-reference terminates.
//!    Function-like macros take parenthesized arguments, each fully
//!    expanded before substitution. Macros using `#`/`##` are left alone.
//! 2. **Evaluation**: the expanded tokens are parsed into an [`Expr`] by
//!    precedence climbing and folded over `i64`. `&&`, `||` and `?:` only
//!    evaluate the operand they select, so `0 && 1 / 0` is fine.
//!
//! Identifiers that survive expansion evaluate to 0 (`true` is 1).

use porta_lexer::{DirectiveKeyword, Punct, TokenKind};
use rustc_hash::FxHashSet;

use crate::{ensure_sufficient_stack, MacroDef, MacroEnv, MacroToken};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("empty condition")]
    Empty,
    #[error("unexpected `{0}` in condition")]
    Unexpected(String),
    #[error("condition ends unexpectedly")]
    UnexpectedEnd,
    #[error("`defined` needs a macro name")]
    DefinedWithoutName,
    #[error("invalid integer literal `{0}`")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("macro `{name}` takes {expected} argument(s) but {found} were given")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("unterminated argument list for macro `{0}`")]
    UnterminatedArguments(String),
}

/// Evaluate a condition's tokens under `env`. Non-zero is true.
pub fn evaluate_condition(tokens: &[MacroToken], env: &MacroEnv) -> Result<bool, ConditionError> {
    let mut expanded = Vec::with_capacity(tokens.len());
    Expander {
        env,
        hidden: FxHashSet::default(),
    }
    .expand(tokens, &mut expanded)?;

    if expanded.is_empty() {
        return Err(ConditionError::Empty);
    }

    let mut parser = ExprParser {
        tokens: &expanded,
        pos: 0,
    };
    let expr = parser.conditional()?;
    if let Some(extra) = parser.peek() {
        return Err(ConditionError::Unexpected(extra.text.clone()));
    }
    Ok(expr.eval()? != 0)
}

// Expansion

struct Expander<'e> {
    env: &'e MacroEnv,
    hidden: FxHashSet<String>,
}

fn is_defined_operator(token: &MacroToken) -> bool {
    token.kind == TokenKind::Directive(DirectiveKeyword::Defined)
        || (token.is_identifier() && token.text == "defined")
}

/// Identifiers and directive-keyword spellings can both name a macro.
fn is_name(token: &MacroToken) -> bool {
    matches!(token.kind, TokenKind::Identifier | TokenKind::Directive(_))
}

impl Expander<'_> {
    fn expand(
        &mut self,
        tokens: &[MacroToken],
        out: &mut Vec<MacroToken>,
    ) -> Result<(), ConditionError> {
        ensure_sufficient_stack(|| self.expand_tokens(tokens, out))
    }

    fn expand_tokens(
        &mut self,
        tokens: &[MacroToken],
        out: &mut Vec<MacroToken>,
    ) -> Result<(), ConditionError> {
        let env = self.env;
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];

            if is_defined_operator(token) {
                let (defined, next) = defined_operand(tokens, i, env)?;
                out.push(MacroToken::new(
                    TokenKind::Number,
                    if defined { "1" } else { "0" },
                ));
                i = next;
                continue;
            }

            let def = if token.is_identifier() && !self.hidden.contains(&token.text) {
                env.get(&token.text)
                    .filter(|def| !def.uses_unsupported_operators())
            } else {
                None
            };

            match def {
                Some(MacroDef::Object { body }) => {
                    self.expand_hidden(&token.text, body, out)?;
                    i += 1;
                }
                Some(MacroDef::Function {
                    params,
                    variadic,
                    body,
                }) if tokens.get(i + 1).is_some_and(|t| t.is_punct(Punct::LParen)) => {
                    let (args, next) = collect_arguments(tokens, i + 2, &token.text)?;
                    let args = normalize_arguments(&token.text, args, params.len(), *variadic)?;

                    let mut expanded_args = Vec::with_capacity(args.len());
                    for arg in &args {
                        let mut expanded = Vec::new();
                        self.expand(arg, &mut expanded)?;
                        expanded_args.push(expanded);
                    }

                    let substituted = substitute(body, params, *variadic, &expanded_args);
                    self.expand_hidden(&token.text, &substituted, out)?;
                    i = next;
                }
                _ => {
                    out.push(token.clone());
                    i += 1;
                }
            }
        }
        Ok(())
    }

    fn expand_hidden(
        &mut self,
        name: &str,
        body: &[MacroToken],
        out: &mut Vec<MacroToken>,
    ) -> Result<(), ConditionError> {
        self.hidden.insert(name.to_owned());
        let result = self.expand(body, out);
        self.hidden.remove(name);
        result
    }
}

/// Operand of `defined` at `index`: `defined NAME` or `defined ( NAME )`.
/// Returns whether NAME is defined and the index after the operand.
fn defined_operand(
    tokens: &[MacroToken],
    index: usize,
    env: &MacroEnv,
) -> Result<(bool, usize), ConditionError> {
    match tokens.get(index + 1) {
        Some(name) if is_name(name) => Ok((env.is_defined(&name.text), index + 2)),
        Some(open) if open.is_punct(Punct::LParen) => {
            let name = tokens
                .get(index + 2)
                .filter(|t| is_name(t))
                .ok_or(ConditionError::DefinedWithoutName)?;
            match tokens.get(index + 3) {
                Some(close) if close.is_punct(Punct::RParen) => {
                    Ok((env.is_defined(&name.text), index + 4))
                }
                Some(other) => Err(ConditionError::Unexpected(other.text.clone())),
                None => Err(ConditionError::UnexpectedEnd),
            }
        }
        _ => Err(ConditionError::DefinedWithoutName),
    }
}

/// Split the arguments starting after `(` at `start` on top-level commas.
/// Returns the arguments and the index after the closing `)`.
fn collect_arguments(
    tokens: &[MacroToken],
    start: usize,
    name: &str,
) -> Result<(Vec<Vec<MacroToken>>, usize), ConditionError> {
    let mut args = vec![Vec::new()];
    let mut depth = 0u32;
    for (offset, token) in tokens[start.min(tokens.len())..].iter().enumerate() {
        if token.is_punct(Punct::LParen) {
            depth += 1;
        } else if token.is_punct(Punct::RParen) {
            if depth == 0 {
                return Ok((args, start + offset + 1));
            }
            depth -= 1;
        } else if token.is_punct(Punct::Comma) && depth == 0 {
            args.push(Vec::new());
            continue;
        }
        if let Some(current) = args.last_mut() {
            current.push(token.clone());
        }
    }
    Err(ConditionError::UnterminatedArguments(name.to_owned()))
}

fn normalize_arguments(
    name: &str,
    mut args: Vec<Vec<MacroToken>>,
    expected: usize,
    variadic: bool,
) -> Result<Vec<Vec<MacroToken>>, ConditionError> {
    // `F()` passes one empty argument; for a zero-parameter macro that is none.
    if expected == 0 && args.len() == 1 && args[0].is_empty() {
        args.clear();
    }
    let count_ok = if variadic {
        args.len() >= expected
    } else {
        args.len() == expected
    };
    if count_ok {
        Ok(args)
    } else {
        Err(ConditionError::ArgumentCount {
            name: name.to_owned(),
            expected,
            found: args.len(),
        })
    }
}

/// Replace parameters in `body`. `__VA_ARGS__` receives the extra
/// arguments re-joined with commas.
fn substitute(
    body: &[MacroToken],
    params: &[String],
    variadic: bool,
    args: &[Vec<MacroToken>],
) -> Vec<MacroToken> {
    let mut out = Vec::with_capacity(body.len());
    for token in body {
        if token.is_identifier() {
            if let Some(position) = params.iter().position(|p| *p == token.text) {
                out.extend(args[position].iter().cloned());
                continue;
            }
            if variadic && token.text == "__VA_ARGS__" {
                for (n, arg) in args[params.len()..].iter().enumerate() {
                    if n > 0 {
                        out.push(MacroToken::new(TokenKind::Punct(Punct::Comma), ","));
                    }
                    out.extend(arg.iter().cloned());
                }
                continue;
            }
        }
        out.push(token.clone());
    }
    out
}

// Parsing

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum UnaryOp {
    Not,
    Neg,
    Plus,
    BitNot,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum BinaryOp {
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    fn from_punct(punct: Punct) -> Option<BinaryOp> {
        Some(match punct {
            Punct::PipePipe => BinaryOp::Or,
            Punct::AmpAmp => BinaryOp::And,
            Punct::Pipe => BinaryOp::BitOr,
            Punct::Caret => BinaryOp::BitXor,
            Punct::Amp => BinaryOp::BitAnd,
            Punct::EqEq => BinaryOp::Eq,
            Punct::NotEq => BinaryOp::NotEq,
            Punct::Lt => BinaryOp::Lt,
            Punct::LtEq => BinaryOp::LtEq,
            Punct::Gt => BinaryOp::Gt,
            Punct::GtEq => BinaryOp::GtEq,
            Punct::Shl => BinaryOp::Shl,
            Punct::Shr => BinaryOp::Shr,
            Punct::Plus => BinaryOp::Add,
            Punct::Minus => BinaryOp::Sub,
            Punct::Star => BinaryOp::Mul,
            Punct::Slash => BinaryOp::Div,
            Punct::Percent => BinaryOp::Rem,
            _ => return None,
        })
    }

    /// Binding power; higher binds tighter.
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::BitOr => 3,
            BinaryOp::BitXor => 4,
            BinaryOp::BitAnd => 5,
            BinaryOp::Eq | BinaryOp::NotEq => 6,
            BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => 7,
            BinaryOp::Shl | BinaryOp::Shr => 8,
            BinaryOp::Add | BinaryOp::Sub => 9,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
enum Expr {
    Num(i64),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
}

struct ExprParser<'t> {
    tokens: &'t [MacroToken],
    pos: usize,
}

impl ExprParser<'_> {
    fn peek(&self) -> Option<&MacroToken> {
        self.tokens.get(self.pos)
    }

    fn peek_punct(&self) -> Option<Punct> {
        match self.peek()?.kind {
            TokenKind::Punct(punct) => Some(punct),
            _ => None,
        }
    }

    fn expect(&mut self, punct: Punct) -> Result<(), ConditionError> {
        match self.peek() {
            Some(token) if token.is_punct(punct) => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => Err(ConditionError::Unexpected(token.text.clone())),
            None => Err(ConditionError::UnexpectedEnd),
        }
    }

    /// `cond ? a : b`, right-associative, lowest precedence.
    fn conditional(&mut self) -> Result<Expr, ConditionError> {
        ensure_sufficient_stack(|| {
            let condition = self.binary(1)?;
            if self.peek_punct() != Some(Punct::Question) {
                return Ok(condition);
            }
            self.pos += 1;
            let then = self.conditional()?;
            self.expect(Punct::Colon)?;
            let otherwise = self.conditional()?;
            Ok(Expr::Conditional(
                Box::new(condition),
                Box::new(then),
                Box::new(otherwise),
            ))
        })
    }

    fn binary(&mut self, min_precedence: u8) -> Result<Expr, ConditionError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek_punct().and_then(BinaryOp::from_punct) {
            if op.precedence() < min_precedence {
                break;
            }
            self.pos += 1;
            let rhs = ensure_sufficient_stack(|| self.binary(op.precedence() + 1))?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ConditionError> {
        let op = match self.peek_punct() {
            Some(Punct::Bang) => UnaryOp::Not,
            Some(Punct::Minus) => UnaryOp::Neg,
            Some(Punct::Plus) => UnaryOp::Plus,
            Some(Punct::Tilde) => UnaryOp::BitNot,
            _ => return self.primary(),
        };
        self.pos += 1;
        let operand = ensure_sufficient_stack(|| self.unary())?;
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    fn primary(&mut self) -> Result<Expr, ConditionError> {
        let token = self.peek().ok_or(ConditionError::UnexpectedEnd)?;
        let value = match token.kind {
            TokenKind::Number => parse_number(&token.text)?,
            TokenKind::CharLiteral => parse_char(&token.text)?,
            TokenKind::Identifier | TokenKind::Directive(_) => i64::from(token.text == "true"),
            TokenKind::Punct(Punct::LParen) => {
                self.pos += 1;
                let inner = self.conditional()?;
                self.expect(Punct::RParen)?;
                return Ok(inner);
            }
            _ => return Err(ConditionError::Unexpected(token.text.clone())),
        };
        self.pos += 1;
        Ok(Expr::Num(value))
    }
}

// Evaluation

impl Expr {
    fn eval(&self) -> Result<i64, ConditionError> {
        ensure_sufficient_stack(|| match self {
            Expr::Num(value) => Ok(*value),
            Expr::Unary(op, operand) => {
                let value = operand.eval()?;
                Ok(match op {
                    UnaryOp::Not => i64::from(value == 0),
                    UnaryOp::Neg => value.wrapping_neg(),
                    UnaryOp::Plus => value,
                    UnaryOp::BitNot => !value,
                })
            }
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                Ok(i64::from(lhs.eval()? != 0 && rhs.eval()? != 0))
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                Ok(i64::from(lhs.eval()? != 0 || rhs.eval()? != 0))
            }
            Expr::Binary(op, lhs, rhs) => apply_binary(*op, lhs.eval()?, rhs.eval()?),
            Expr::Conditional(condition, then, otherwise) => {
                if condition.eval()? != 0 {
                    then.eval()
                } else {
                    otherwise.eval()
                }
            }
        })
    }
}

fn apply_binary(op: BinaryOp, lhs: i64, rhs: i64) -> Result<i64, ConditionError> {
    let shift = |rhs: i64| u32::try_from(rhs).ok();
    Ok(match op {
        BinaryOp::BitOr => lhs | rhs,
        BinaryOp::BitXor => lhs ^ rhs,
        BinaryOp::BitAnd => lhs & rhs,
        BinaryOp::Eq => i64::from(lhs == rhs),
        BinaryOp::NotEq => i64::from(lhs != rhs),
        BinaryOp::Lt => i64::from(lhs < rhs),
        BinaryOp::LtEq => i64::from(lhs <= rhs),
        BinaryOp::Gt => i64::from(lhs > rhs),
        BinaryOp::GtEq => i64::from(lhs >= rhs),
        BinaryOp::Shl => shift(rhs).and_then(|s| lhs.checked_shl(s)).unwrap_or(0),
        BinaryOp::Shr => shift(rhs)
            .and_then(|s| lhs.checked_shr(s))
            .unwrap_or(if lhs < 0 { -1 } else { 0 }),
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Sub => lhs.wrapping_sub(rhs),
        BinaryOp::Mul => lhs.wrapping_mul(rhs),
        BinaryOp::Div | BinaryOp::Rem if rhs == 0 => return Err(ConditionError::DivisionByZero),
        BinaryOp::Div => lhs.wrapping_div(rhs),
        BinaryOp::Rem => lhs.wrapping_rem(rhs),
        BinaryOp::And => i64::from(lhs != 0 && rhs != 0),
        BinaryOp::Or => i64::from(lhs != 0 || rhs != 0),
    })
}

// Literals

/// Integer literal: decimal, `0x` hex, `0b` binary, leading-zero octal,
/// optional `u`/`l` suffixes. Values above
/// `i64::MAX` wrap, as an unsigned literal would.
#[allow(clippy::cast_possible_wrap)]
fn parse_number(text: &str) -> Result<i64, ConditionError> {
    let invalid = || ConditionError::InvalidNumber(text.to_owned());
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']);

    let (body, radix) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (bin, 2)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (&digits[1..], 8)
    } else {
        (digits, 10)
    };

    u64::from_str_radix(body, radix)
        .map(|value| value as i64)
        .map_err(|_| invalid())
}

/// Character literal value, with the usual escapes.
fn parse_char(text: &str) -> Result<i64, ConditionError> {
    let invalid = || ConditionError::InvalidNumber(text.to_owned());
    let start = text.find('\'').ok_or_else(invalid)?;
    let inner = text[start + 1..].strip_suffix('\'').ok_or_else(invalid)?;

    let mut chars = inner.chars();
    let value = match chars.next().ok_or_else(invalid)? {
        '\\' => match chars.next().ok_or_else(invalid)? {
            'n' => 10,
            't' => 9,
            'r' => 13,
            'a' => 7,
            'b' => 8,
            'f' => 12,
            'v' => 11,
            'x' => {
                let hex: String = chars.take_while(char::is_ascii_hexdigit).collect();
                u32::from_str_radix(&hex, 16).map_err(|_| invalid())?
            }
            d @ '0'..='7' => {
                let octal: String = std::iter::once(d)
                    .chain(chars.take_while(|c| ('0'..='7').contains(c)).take(2))
                    .collect();
                u32::from_str_radix(&octal, 8).map_err(|_| invalid())?
            }
            other => u32::from(other),
        },
        c => u32::from(c),
    };
    Ok(i64::from(value))
}
