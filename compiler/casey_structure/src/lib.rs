//! Control-flow structuring for the Casey compiler.
//!
//! A function body arrives as an arbitrary directed graph of blocks. Target
//! languages want nested sequence/if/loop constructs, so this crate
//! reconstructs structured control flow:
//!
//! ```text
//! BlockGraph → validate → **structure** → Stmt (casey_java)
//! ```
//!
//! # Algorithm
//!
//! The graph is treated as a CFG with the Start block as entry and every
//! End block wired to one synthetic exit. Dominators identify back-edges
//! (an edge whose target dominates its source); a back-edge head that is a
//! Decision with exactly one successor inside its natural loop becomes a
//! `while` condition. Remaining Decisions become `if`/`else` with the join
//! at their immediate postdominator. Whatever the recognizers cannot
//! capture (irreducible regions from crossing jumps) degrades to an
//! explicit label/goto pair, so structuring is **total**: every validated
//! graph produces some structured program, at the cost of readability for
//! pathological graphs. Backends without goto reject those functions
//! individually at emission time.
//!
//! The true branch of a Decision is the edge leaving its Right side, the
//! false branch the Left side, falling back to wiring order when neither
//! compass side is used. This is deterministic and survives round-trips.

mod ir;
mod structure;
mod validate;

pub use ir::{Action, Label, Stmt};
pub use structure::{structure, StructureError};
pub use validate::{graph_diagnostic, validate};
