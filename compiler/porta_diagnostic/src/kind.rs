use std::fmt;

use crate::Severity;

/// Closed set of diagnostic kinds, each with a stable code.
///
/// Format: P#### where the first two digits group the layer:
/// - P00xx: preprocessing (includes, conditions, macros)
/// - P01xx: porting (reads, rewriting)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum DiagnosticKind {
    /// Include target not found in any search location
    UnresolvedInclude,
    /// File transitively includes itself
    IncludeCycle,
    /// `#if`/`#elif` expression does not parse or cannot be evaluated
    InvalidCondition,
    /// Macro body uses `#` or `##`
    UnsupportedMacroOperator,
    /// `#include`, `#define` or `#undef` with a missing or malformed operand
    MalformedDirective,
    /// `#error` reached in an active branch
    ErrorDirective,
    /// Unbalanced or stray conditional directive
    UnbalancedConditional,
    /// Source file could not be read
    ReadFailure,
    /// Rewritten file could not be written back
    WriteFailure,
}

impl DiagnosticKind {
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvedInclude => "P0001",
            DiagnosticKind::IncludeCycle => "P0002",
            DiagnosticKind::InvalidCondition => "P0003",
            DiagnosticKind::UnsupportedMacroOperator => "P0004",
            DiagnosticKind::MalformedDirective => "P0005",
            DiagnosticKind::ErrorDirective => "P0006",
            DiagnosticKind::UnbalancedConditional => "P0007",
            DiagnosticKind::ReadFailure => "P0101",
            DiagnosticKind::WriteFailure => "P0102",
        }
    }

    /// Severity a diagnostic of this kind gets unless overridden.
    pub fn default_severity(self) -> Severity {
        match self {
            DiagnosticKind::UnbalancedConditional
            | DiagnosticKind::IncludeCycle
            | DiagnosticKind::ReadFailure
            | DiagnosticKind::WriteFailure => Severity::Error,
            DiagnosticKind::UnresolvedInclude
            | DiagnosticKind::InvalidCondition
            | DiagnosticKind::UnsupportedMacroOperator
            | DiagnosticKind::MalformedDirective
            | DiagnosticKind::ErrorDirective => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
