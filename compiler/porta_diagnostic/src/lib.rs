//! Diagnostics channel.
//!
//! Expected conditions during porting (an include that cannot be found, a
//! condition that does not parse, an inclusion cycle the caller chose to
//! tolerate) are reported as [`Diagnostic`] values through a
//! [`DiagnosticSink`] instead of being returned as errors. Only structurally
//! fatal conditions terminate processing of a file.

mod diagnostic;
mod kind;
pub mod queue;
mod sink;

pub use diagnostic::{Diagnostic, Severity};
pub use kind::DiagnosticKind;
pub use queue::DiagnosticQueue;
pub use sink::DiagnosticSink;
