//! The statement tree attached to blocks.
//!
//! A statement is a value literal, an operator over sub-statements, or a
//! call chain through variables, parameters and functions. The tree carries
//! no types itself; `casey_types` computes a static return type bottom-up.

use std::fmt;

use crate::item::ItemId;

/// A literal value.
///
/// `Object` names the class to instantiate (a dotted item path); the actual
/// class lookup happens during type checking.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind {
    Number(f64),
    Boolean(bool),
    Text(String),
    Object(String),
}

impl ValueKind {
    /// The document `type` tag for this literal.
    pub fn as_document_str(&self) -> &'static str {
        match self {
            ValueKind::Number(_) => "NUMBER",
            ValueKind::Boolean(_) => "BOOLEAN",
            ValueKind::Text(_) => "TEXT",
            ValueKind::Object(_) => "OBJECT",
        }
    }
}

/// Operand count constraint of an operator.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn allows(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// An operator statement kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OperatorKind {
    Add,
    And,
    Concat,
    Divide,
    Equals,
    GreaterOrEqualThan,
    GreaterThan,
    Length,
    LessOrEqualThan,
    LessThan,
    Modulo,
    Multiply,
    NotEquals,
    Not,
    Or,
    Subtract,
}

impl OperatorKind {
    /// Parse a document statement `type` tag naming an operator.
    pub fn parse(text: &str) -> Option<OperatorKind> {
        Some(match text.trim().to_ascii_uppercase().as_str() {
            "ADD" => OperatorKind::Add,
            "AND" => OperatorKind::And,
            "CONCAT" => OperatorKind::Concat,
            "DIVIDE" => OperatorKind::Divide,
            "EQUALS" => OperatorKind::Equals,
            "GREATER_OR_EQUAL_THAN" => OperatorKind::GreaterOrEqualThan,
            "GREATER_THAN" => OperatorKind::GreaterThan,
            "LENGTH" => OperatorKind::Length,
            "LESS_OR_EQUAL_THAN" => OperatorKind::LessOrEqualThan,
            "LESS_THAN" => OperatorKind::LessThan,
            "MODULO" => OperatorKind::Modulo,
            "MULTIPLY" => OperatorKind::Multiply,
            "NOT_EQUALS" => OperatorKind::NotEquals,
            "NOT" => OperatorKind::Not,
            "OR" => OperatorKind::Or,
            "SUBTRACT" => OperatorKind::Subtract,
            _ => return None,
        })
    }

    pub fn as_document_str(self) -> &'static str {
        match self {
            OperatorKind::Add => "ADD",
            OperatorKind::And => "AND",
            OperatorKind::Concat => "CONCAT",
            OperatorKind::Divide => "DIVIDE",
            OperatorKind::Equals => "EQUALS",
            OperatorKind::GreaterOrEqualThan => "GREATER_OR_EQUAL_THAN",
            OperatorKind::GreaterThan => "GREATER_THAN",
            OperatorKind::Length => "LENGTH",
            OperatorKind::LessOrEqualThan => "LESS_OR_EQUAL_THAN",
            OperatorKind::LessThan => "LESS_THAN",
            OperatorKind::Modulo => "MODULO",
            OperatorKind::Multiply => "MULTIPLY",
            OperatorKind::NotEquals => "NOT_EQUALS",
            OperatorKind::Not => "NOT",
            OperatorKind::Or => "OR",
            OperatorKind::Subtract => "SUBTRACT",
        }
    }

    /// How many operands the operator takes.
    pub fn arity(self) -> Arity {
        match self {
            OperatorKind::Not | OperatorKind::Length => Arity::Exactly(1),
            _ => Arity::AtLeast(2),
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_document_str())
    }
}

/// One segment of a call chain: a variable, parameter or function, with
/// arguments when the referenced item is a function.
#[derive(Clone, Debug, PartialEq)]
pub struct CallSegment {
    pub item: ItemId,
    pub arguments: Vec<Expr>,
}

/// A statement tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Value(ValueKind),
    Operator {
        op: OperatorKind,
        operands: Vec<Expr>,
    },
    Call {
        segments: Vec<CallSegment>,
    },
}

impl Expr {
    /// Whether any node of this tree is a call chain. Trees with calls are
    /// excluded from constant folding, since calls may touch mutable state.
    pub fn contains_call(&self) -> bool {
        match self {
            Expr::Value(_) => false,
            Expr::Operator { operands, .. } => operands.iter().any(Expr::contains_call),
            Expr::Call { .. } => true,
        }
    }
}
