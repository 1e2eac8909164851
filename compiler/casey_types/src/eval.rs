//! Constant folding for call-free statement trees.

use casey_ir::{Expr, OperatorKind, ValueKind};

/// A compile-time constant.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstValue {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl ConstValue {
    fn as_number(&self) -> Option<f64> {
        match self {
            ConstValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_boolean(&self) -> Option<bool> {
        match self {
            ConstValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            ConstValue::Text(t) => Some(t),
            _ => None,
        }
    }

    fn render(&self) -> String {
        match self {
            ConstValue::Number(n) => n.to_string(),
            ConstValue::Boolean(b) => b.to_string(),
            ConstValue::Text(t) => t.clone(),
        }
    }
}

/// Evaluate a statement tree to a constant, when possible.
///
/// Returns `None` for trees containing calls (they may reference mutable
/// state), object instantiations, or any type mismatch. This is a best
/// effort folder, not a checker; `type_of` reports the errors.
pub fn eval_const(expr: &Expr) -> Option<ConstValue> {
    match expr {
        Expr::Value(ValueKind::Number(n)) => Some(ConstValue::Number(*n)),
        Expr::Value(ValueKind::Boolean(b)) => Some(ConstValue::Boolean(*b)),
        Expr::Value(ValueKind::Text(t)) => Some(ConstValue::Text(t.clone())),
        Expr::Value(ValueKind::Object(_)) | Expr::Call { .. } => None,
        Expr::Operator { op, operands } => {
            let values: Vec<ConstValue> = operands
                .iter()
                .map(eval_const)
                .collect::<Option<Vec<_>>>()?;
            fold(*op, &values)
        }
    }
}

fn fold(op: OperatorKind, values: &[ConstValue]) -> Option<ConstValue> {
    use OperatorKind::*;
    if !op.arity().allows(values.len()) {
        return None;
    }
    match op {
        Add => fold_numeric(values, |a, b| a + b),
        Subtract => fold_numeric(values, |a, b| a - b),
        Multiply => fold_numeric(values, |a, b| a * b),
        Divide => fold_numeric(values, |a, b| a / b),
        Modulo => fold_numeric(values, |a, b| a % b),
        GreaterThan => fold_comparison(values, |a, b| a > b),
        GreaterOrEqualThan => fold_comparison(values, |a, b| a >= b),
        LessThan => fold_comparison(values, |a, b| a < b),
        LessOrEqualThan => fold_comparison(values, |a, b| a <= b),
        And => {
            let all = values
                .iter()
                .map(ConstValue::as_boolean)
                .collect::<Option<Vec<_>>>()?;
            Some(ConstValue::Boolean(all.into_iter().all(|b| b)))
        }
        Or => {
            let all = values
                .iter()
                .map(ConstValue::as_boolean)
                .collect::<Option<Vec<_>>>()?;
            Some(ConstValue::Boolean(all.into_iter().any(|b| b)))
        }
        Not => Some(ConstValue::Boolean(!values[0].as_boolean()?)),
        Concat => Some(ConstValue::Text(
            values.iter().map(ConstValue::render).collect(),
        )),
        Length => Some(ConstValue::Number(values[0].as_text()?.chars().count() as f64)),
        Equals => fold_adjacent(values, |a, b| a == b),
        NotEquals => fold_adjacent(values, |a, b| a != b),
    }
}

fn fold_numeric(values: &[ConstValue], combine: impl Fn(f64, f64) -> f64) -> Option<ConstValue> {
    let numbers = values
        .iter()
        .map(ConstValue::as_number)
        .collect::<Option<Vec<_>>>()?;
    let mut result = numbers[0];
    for &next in &numbers[1..] {
        result = combine(result, next);
    }
    Some(ConstValue::Number(result))
}

/// Chained comparison: `a > b > c` folds as `(a > b) && (b > c)`.
fn fold_comparison(
    values: &[ConstValue],
    compare: impl Fn(f64, f64) -> bool,
) -> Option<ConstValue> {
    let numbers = values
        .iter()
        .map(ConstValue::as_number)
        .collect::<Option<Vec<_>>>()?;
    let holds = numbers.windows(2).all(|pair| compare(pair[0], pair[1]));
    Some(ConstValue::Boolean(holds))
}

/// Adjacent-pair equality: `a == b == c` folds as `(a == b) && (b == c)`.
fn fold_adjacent(
    values: &[ConstValue],
    compare: impl Fn(&ConstValue, &ConstValue) -> bool,
) -> Option<ConstValue> {
    let holds = values.windows(2).all(|pair| compare(&pair[0], &pair[1]));
    Some(ConstValue::Boolean(holds))
}
