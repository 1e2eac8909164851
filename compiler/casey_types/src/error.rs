//! Type errors and their diagnostic conversions.

use std::fmt;

use casey_diagnostic::{Diagnostic, ErrorCode, Origin};
use casey_ir::{Arity, BlockKind, ItemKind, OperatorKind};

use crate::Type;

/// A type error found while checking a statement tree or a block content.
///
/// Operand and argument indices are 1-based, matching how the blocks are
/// drawn in the editor.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    OperandMismatch {
        op: OperatorKind,
        index: usize,
        expected: Type,
        found: Type,
    },
    OperandVoid {
        op: OperatorKind,
        index: usize,
    },
    ArityMismatch {
        op: OperatorKind,
        expected: Arity,
        found: usize,
    },
    UnknownType {
        name: String,
    },
    EmptyCall,
    NotCallable {
        path: String,
        kind: ItemKind,
    },
    NotAnObject {
        path: String,
        found: Type,
    },
    NotAMember {
        class: String,
        path: String,
    },
    ArgCountMismatch {
        function: String,
        expected: usize,
        found: usize,
    },
    ArgMismatch {
        function: String,
        index: usize,
        expected: Type,
        found: Type,
    },
    MissingStatement {
        kind: BlockKind,
    },
    MissingVariable {
        kind: BlockKind,
    },
    ConditionNotBoolean {
        found: Type,
    },
    AssignMismatch {
        variable: String,
        expected: Type,
        found: Type,
    },
    InputTypeNotAllowed {
        variable: String,
        found: Type,
    },
    OutputVoid,
    ReturnMismatch {
        function: String,
        expected: Type,
        found: Type,
    },
}

impl TypeError {
    /// Convert into a diagnostic anchored at `origin`.
    pub fn to_diagnostic(&self, origin: Origin) -> Diagnostic {
        match self {
            TypeError::OperandMismatch {
                op,
                index,
                expected,
                found,
            } => Diagnostic::error(ErrorCode::C2001)
                .with_message(format!(
                    "operand type mismatch for {op}: expected `{expected}`, found `{found}`"
                ))
                .with_label(origin.with_operand(*index), format!("expected `{expected}`")),
            TypeError::OperandVoid { op, index } => Diagnostic::error(ErrorCode::C2006)
                .with_message(format!("{op} cannot take a void operand"))
                .with_label(origin.with_operand(*index), "this produces no value"),
            TypeError::ArityMismatch {
                op,
                expected,
                found,
            } => Diagnostic::error(ErrorCode::C2002)
                .with_message(format!(
                    "{op} takes {expected} operand(s), found {found}"
                ))
                .with_label(origin, ""),
            TypeError::UnknownType { name } => Diagnostic::error(ErrorCode::C2003)
                .with_message(format!("unknown type `{name}`"))
                .with_label(origin, "not a primitive type or a known class")
                .with_note("types are BOOLEAN, NUMBER, TEXT, VOID or the full path of a class"),
            TypeError::EmptyCall => Diagnostic::error(ErrorCode::C0008)
                .with_message("call statement has no segments")
                .with_label(origin, ""),
            TypeError::NotCallable { path, kind } => Diagnostic::error(ErrorCode::C3001)
                .with_message(format!(
                    "`{path}` is a {kind}, not a variable, parameter or function"
                ))
                .with_label(origin, "referenced in a call chain"),
            TypeError::NotAnObject { path, found } => Diagnostic::error(ErrorCode::C3002)
                .with_message(format!(
                    "cannot call through `{path}`: its type `{found}` is not a class"
                ))
                .with_label(origin, ""),
            TypeError::NotAMember { class, path } => Diagnostic::error(ErrorCode::C3003)
                .with_message(format!("`{path}` is not a member of class `{class}`"))
                .with_label(origin, ""),
            TypeError::ArgCountMismatch {
                function,
                expected,
                found,
            } => Diagnostic::error(ErrorCode::C2004)
                .with_message(format!(
                    "`{function}` takes {expected} argument(s), found {found}"
                ))
                .with_label(origin, ""),
            TypeError::ArgMismatch {
                function,
                index,
                expected,
                found,
            } => Diagnostic::error(ErrorCode::C2005)
                .with_message(format!(
                    "argument type mismatch calling `{function}`: expected `{expected}`, found `{found}`"
                ))
                .with_label(origin.with_operand(*index), format!("expected `{expected}`")),
            TypeError::MissingStatement { kind } => Diagnostic::error(ErrorCode::C1007)
                .with_message(format!("{kind} block has no statement"))
                .with_label(origin, ""),
            TypeError::MissingVariable { kind } => Diagnostic::error(ErrorCode::C1007)
                .with_message(format!("{kind} block has no variable"))
                .with_label(origin, ""),
            TypeError::ConditionNotBoolean { found } => Diagnostic::error(ErrorCode::C2001)
                .with_message(format!(
                    "decision condition must be BOOLEAN, found `{found}`"
                ))
                .with_label(origin, ""),
            TypeError::AssignMismatch {
                variable,
                expected,
                found,
            } => Diagnostic::error(ErrorCode::C2001)
                .with_message(format!(
                    "cannot assign `{found}` to `{variable}` of type `{expected}`"
                ))
                .with_label(origin, ""),
            TypeError::InputTypeNotAllowed { variable, found } => {
                Diagnostic::error(ErrorCode::C4003)
                    .with_message(format!(
                        "input into `{variable}` of type `{found}` is not supported"
                    ))
                    .with_label(origin, "only BOOLEAN, NUMBER and TEXT can be read")
            }
            TypeError::OutputVoid => Diagnostic::error(ErrorCode::C2006)
                .with_message("output statement produces no value")
                .with_label(origin, ""),
            TypeError::ReturnMismatch {
                function,
                expected,
                found,
            } => Diagnostic::error(ErrorCode::C2001)
                .with_message(format!(
                    "`{function}` returns `{expected}`, found `{found}`"
                ))
                .with_label(origin, ""),
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_diagnostic(Origin::default()).message)
    }
}

impl std::error::Error for TypeError {}
