//! Type system for the Casey compiler.
//!
//! Types are either primitives (boolean, number, text, void) or named
//! object types backed by a class item. The checker computes a static
//! return type for every statement tree bottom-up:
//!
//! - value nodes are fixed by their literal kind,
//! - operator nodes check arity and operand types against a per-operator
//!   signature and yield the operator's declared result type,
//! - call chains resolve segment by segment through the item tree; every
//!   intermediate segment must yield an object type that exposes the next
//!   segment's item.
//!
//! [`eval_const`] additionally folds call-free trees to a constant value.
//! Both entry points are pure: re-running them on the same tree yields the
//! same result and raises no new errors.

mod check;
mod core;
mod error;
mod eval;
mod signature;

pub use check::{check_function, type_of, BlockTypeError};
pub use core::{resolve_type_name, Type};
pub use error::TypeError;
pub use eval::{eval_const, ConstValue};
pub use signature::{signature, OperandRule, Signature};
