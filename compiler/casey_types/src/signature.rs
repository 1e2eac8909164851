//! Per-operator signatures: arity, operand rule, result type.

use casey_ir::{Arity, OperatorKind};

use crate::Type;

/// What an operator requires of each operand.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperandRule {
    /// Every operand must be a number.
    Numeric,
    /// Every operand must be a boolean.
    Boolean,
    /// Every operand must be text.
    Text,
    /// Any type except void.
    NonVoid,
    /// All operands must share one (non-void) type.
    Uniform,
}

/// The full signature of an operator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub arity: Arity,
    pub operands: OperandRule,
    pub result: Type,
}

/// Look up the signature of an operator kind.
pub fn signature(op: OperatorKind) -> Signature {
    use OperatorKind::*;
    let (operands, result) = match op {
        Add | Subtract | Multiply | Divide | Modulo => (OperandRule::Numeric, Type::Number),
        GreaterThan | GreaterOrEqualThan | LessThan | LessOrEqualThan => {
            (OperandRule::Numeric, Type::Boolean)
        }
        And | Or | Not => (OperandRule::Boolean, Type::Boolean),
        Concat => (OperandRule::NonVoid, Type::Text),
        Length => (OperandRule::Text, Type::Number),
        Equals | NotEquals => (OperandRule::Uniform, Type::Boolean),
    };
    Signature {
        arity: op.arity(),
        operands,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arithmetic_is_numeric_to_number() {
        let sig = signature(OperatorKind::Add);
        assert_eq!(sig.operands, OperandRule::Numeric);
        assert_eq!(sig.result, Type::Number);
        assert_eq!(sig.arity, Arity::AtLeast(2));
    }

    #[test]
    fn comparisons_yield_boolean() {
        for op in [
            OperatorKind::GreaterThan,
            OperatorKind::GreaterOrEqualThan,
            OperatorKind::LessThan,
            OperatorKind::LessOrEqualThan,
        ] {
            assert_eq!(signature(op).result, Type::Boolean);
        }
    }

    #[test]
    fn length_is_unary_text_to_number() {
        let sig = signature(OperatorKind::Length);
        assert_eq!(sig.arity, Arity::Exactly(1));
        assert_eq!(sig.operands, OperandRule::Text);
        assert_eq!(sig.result, Type::Number);
    }

    #[test]
    fn concat_accepts_any_non_void() {
        let sig = signature(OperatorKind::Concat);
        assert_eq!(sig.operands, OperandRule::NonVoid);
        assert_eq!(sig.result, Type::Text);
    }
}
