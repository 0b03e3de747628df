//! Directive keyword lookup.
//!
//! Length-bucketed: every directive keyword is 2-7 bytes long and starts
//! with a lowercase ASCII letter, so most identifiers are rejected before
//! any string comparison.

use crate::DirectiveKeyword;

/// Map the identifier following a line-start `#` to its directive keyword.
///
/// `defined` is deliberately absent: it is an operator inside `#if`
/// expressions, never a directive name.
#[inline]
pub fn lookup_directive(text: &str) -> Option<DirectiveKeyword> {
    let bytes = text.as_bytes();
    if !(2..=7).contains(&bytes.len()) || !bytes[0].is_ascii_lowercase() {
        return None;
    }

    match bytes.len() {
        2 => match text {
            "if" => Some(DirectiveKeyword::If),
            _ => None,
        },
        4 => match text {
            "elif" => Some(DirectiveKeyword::Elif),
            "else" => Some(DirectiveKeyword::Else),
            "line" => Some(DirectiveKeyword::Line),
            _ => None,
        },
        5 => match text {
            "ifdef" => Some(DirectiveKeyword::Ifdef),
            "endif" => Some(DirectiveKeyword::Endif),
            "undef" => Some(DirectiveKeyword::Undef),
            "error" => Some(DirectiveKeyword::Error),
            _ => None,
        },
        6 => match text {
            "ifndef" => Some(DirectiveKeyword::Ifndef),
            "define" => Some(DirectiveKeyword::Define),
            "pragma" => Some(DirectiveKeyword::Pragma),
            _ => None,
        },
        7 => match text {
            "include" => Some(DirectiveKeyword::Include),
            "warning" => Some(DirectiveKeyword::Warning),
            _ => None,
        },
        _ => None,
    }
}
