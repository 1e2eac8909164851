//! Diagnostic system for the Casey compiler.
//!
//! Design:
//! - Error codes for searchability (`C0xxx` load, `C1xxx` graph, `C2xxx`
//!   type, `C3xxx` reference, `C4xxx` emit, `C5xxx` native compile)
//! - Clear messages (what went wrong)
//! - Origin labels (where it went wrong: item path, block id, operand)
//! - Notes (why it's wrong / how to fix)
//!
//! Unlike a text compiler there are no source spans to point at; the input
//! is a block graph. An origin is therefore a dotted item path, optionally
//! narrowed to a block uid or an operand position.
//!
//! Stages that can make progress past an error (the loader, the graph
//! validator) collect into a [`DiagnosticList`] and report everything at
//! once; type checking and emission stop per function on the first error.

mod diagnostic;
mod error_code;
mod list;

pub use diagnostic::{Diagnostic, Label, Origin, Severity};
pub use error_code::ErrorCode;
pub use list::DiagnosticList;
