use pretty_assertions::assert_eq;

use super::*;

#[test]
fn default_severity_from_kind() {
    let diag = Diagnostic::new(DiagnosticKind::UnresolvedInclude, "missing");
    assert_eq!(diag.severity, Severity::Warning);
    assert!(!diag.is_error());

    let diag = Diagnostic::new(DiagnosticKind::IncludeCycle, "cycle");
    assert!(diag.is_error());
}

#[test]
fn severity_override() {
    let diag = Diagnostic::new(DiagnosticKind::ErrorDirective, "x").with_severity(Severity::Note);
    assert_eq!(diag.severity, Severity::Note);
}

#[test]
fn display_with_location() {
    let diag = Diagnostic::new(DiagnosticKind::UnresolvedInclude, "cannot find `a.h`")
        .at("src/main.cpp", 3);
    assert_eq!(
        diag.to_string(),
        "src/main.cpp:3: warning[P0001]: cannot find `a.h`"
    );
}

#[test]
fn display_file_only_and_bare() {
    let diag = Diagnostic::new(DiagnosticKind::ReadFailure, "no such file").in_file("a.cpp");
    assert_eq!(diag.to_string(), "a.cpp: error[P0101]: no such file");

    let diag = Diagnostic::new(DiagnosticKind::InvalidCondition, "bad");
    assert_eq!(diag.to_string(), "warning[P0003]: bad");
}

#[test]
fn codes_are_unique() {
    use rustc_hash::FxHashSet;
    let all = [
        DiagnosticKind::UnresolvedInclude,
        DiagnosticKind::IncludeCycle,
        DiagnosticKind::InvalidCondition,
        DiagnosticKind::UnsupportedMacroOperator,
        DiagnosticKind::MalformedDirective,
        DiagnosticKind::ErrorDirective,
        DiagnosticKind::UnbalancedConditional,
        DiagnosticKind::ReadFailure,
        DiagnosticKind::WriteFailure,
    ];
    let codes: FxHashSet<&str> = all.iter().map(|k| k.code()).collect();
    assert_eq!(codes.len(), all.len());
}
