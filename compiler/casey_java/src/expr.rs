//! Statement-tree to Java expression rendering.
//!
//! The statement tree has no implicit precedence, so parentheses are
//! inserted around every operator node that is itself an operand of
//! another operator. Multi-operand comparisons expand pairwise:
//! `a > b > c` renders as `(a > b) && (b > c)`.

use casey_ir::{Expr, ItemId, ItemKind, ItemTree, OperatorKind, ValueKind};

/// Render an expression tree as Java source.
pub fn render_expr(tree: &ItemTree, expr: &Expr) -> String {
    render(tree, expr, false)
}

fn render(tree: &ItemTree, expr: &Expr, parenthesize: bool) -> String {
    match expr {
        Expr::Value(value) => render_value(value),
        Expr::Operator { op, operands } => {
            let rendered = render_operator(tree, *op, operands);
            if parenthesize {
                format!("({rendered})")
            } else {
                rendered
            }
        }
        Expr::Call { segments } => render_call(tree, segments),
    }
}

fn render_value(value: &ValueKind) -> String {
    match value {
        // `{:?}` keeps the fractional part (`5.0`, not `5`), so the literal
        // stays a double in Java.
        ValueKind::Number(n) => format!("{n:?}"),
        ValueKind::Boolean(b) => b.to_string(),
        ValueKind::Text(t) => quote(t),
        ValueKind::Object(path) => format!("new {path}()"),
    }
}

fn render_operator(tree: &ItemTree, op: OperatorKind, operands: &[Expr]) -> String {
    use OperatorKind::*;
    let parts: Vec<String> = operands
        .iter()
        .map(|operand| render(tree, operand, true))
        .collect();
    match op {
        Add => parts.join(" + "),
        Subtract => parts.join(" - "),
        Multiply => parts.join(" * "),
        Divide => parts.join(" / "),
        Modulo => parts.join(" % "),
        And => parts.join(" && "),
        Or => parts.join(" || "),
        Not => format!("!{}", parts[0]),
        Concat => parts
            .iter()
            .map(|part| format!("String.valueOf({part})"))
            .collect::<Vec<_>>()
            .join(" + "),
        Length => format!("{}.length()", parts[0]),
        GreaterThan => pairwise(&parts, " > "),
        GreaterOrEqualThan => pairwise(&parts, " >= "),
        LessThan => pairwise(&parts, " < "),
        LessOrEqualThan => pairwise(&parts, " <= "),
        Equals => pairwise_calls(&parts, "java.util.Objects.equals", false),
        NotEquals => pairwise_calls(&parts, "java.util.Objects.equals", true),
    }
}

/// `a OP b` for two operands, `(a OP b) && (b OP c)` for more.
fn pairwise(parts: &[String], separator: &str) -> String {
    if parts.len() == 2 {
        return format!("{}{separator}{}", parts[0], parts[1]);
    }
    parts
        .windows(2)
        .map(|pair| format!("({}{separator}{})", pair[0], pair[1]))
        .collect::<Vec<_>>()
        .join(" && ")
}

/// `f(a, b)` for two operands, `(f(a, b)) && (f(b, c))` for more.
fn pairwise_calls(parts: &[String], function: &str, negate: bool) -> String {
    let bang = if negate { "!" } else { "" };
    if parts.len() == 2 {
        return format!("{bang}{function}({}, {})", parts[0], parts[1]);
    }
    parts
        .windows(2)
        .map(|pair| format!("({bang}{function}({}, {}))", pair[0], pair[1]))
        .collect::<Vec<_>>()
        .join(" && ")
}

fn render_call(tree: &ItemTree, segments: &[casey_ir::CallSegment]) -> String {
    let mut rendered = String::new();
    for (position, segment) in segments.iter().enumerate() {
        if position > 0 {
            rendered.push('.');
        }
        rendered.push_str(&render_segment(tree, segment, position == 0));
    }
    rendered
}

fn render_segment(tree: &ItemTree, segment: &casey_ir::CallSegment, first: bool) -> String {
    let item = &tree[segment.item];
    let reference = if first {
        reference_name(tree, segment.item)
    } else {
        item.name.clone()
    };
    match item.kind {
        ItemKind::Function => {
            let arguments: Vec<String> = segment
                .arguments
                .iter()
                .map(|argument| render(tree, argument, false))
                .collect();
            format!("{reference}({})", arguments.join(", "))
        }
        _ => reference,
    }
}

/// How an item is referenced from generated code: package-level items live
/// in a wrapper class of their own name, so a static variable `Prj.util.x`
/// reads `Prj.util.x.x`; locals and parameters read by bare name.
pub fn reference_name(tree: &ItemTree, id: ItemId) -> String {
    if tree.is_static(id) {
        format!("{}.{}", tree.full_name(id), tree[id].name)
    } else {
        tree[id].name.clone()
    }
}

/// Escape a Casey text literal as a Java string literal.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => {
                quoted.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}
