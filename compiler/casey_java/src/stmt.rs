//! Structured-IR to Java statement rendering.

use casey_ir::{ItemId, ItemTree};
use casey_structure::{Action, Stmt};
use casey_types::{resolve_type_name, Type};

use crate::expr::{reference_name, render_expr};
use crate::writer::SourceWriter;
use crate::EmitError;

/// Render a structured statement into the writer.
///
/// Every IR node maps 1:1 to a Java statement template. `Goto`/`Labeled`
/// have no Java equivalent and fail the function.
pub fn render_stmt(
    tree: &ItemTree,
    function: &str,
    stmt: &Stmt,
    writer: &mut SourceWriter,
) -> Result<(), EmitError> {
    match stmt {
        Stmt::Seq(stmts) => {
            for stmt in stmts {
                render_stmt(tree, function, stmt, writer)?;
            }
            Ok(())
        }
        Stmt::If { cond, then, otherwise } => {
            writer.open(&format!("if ({})", render_expr(tree, cond)));
            render_stmt(tree, function, then, writer)?;
            if otherwise.is_empty_seq() {
                writer.close();
            } else {
                writer.close_with("} else {");
                render_stmt(tree, function, otherwise, writer)?;
                writer.close();
            }
            Ok(())
        }
        Stmt::Loop { cond, body } => {
            writer.open(&format!("while ({})", render_expr(tree, cond)));
            render_stmt(tree, function, body, writer)?;
            writer.close();
            Ok(())
        }
        Stmt::Return(value) => {
            match value {
                Some(value) => writer.line(&format!("return {};", render_expr(tree, value))),
                None => writer.line("return;"),
            }
            Ok(())
        }
        Stmt::Action(action) => render_action(tree, action, writer),
        Stmt::Goto(_) => Err(EmitError::Unsupported {
            function: function.to_owned(),
            construct: "goto",
        }),
        Stmt::Labeled(..) => Err(EmitError::Unsupported {
            function: function.to_owned(),
            construct: "label",
        }),
    }
}

fn render_action(
    tree: &ItemTree,
    action: &Action,
    writer: &mut SourceWriter,
) -> Result<(), EmitError> {
    match action {
        Action::Output(value) => {
            writer.line(&format!(
                "System.out.println({});",
                render_expr(tree, value)
            ));
            Ok(())
        }
        Action::Call(call) => {
            writer.line(&format!("{};", render_expr(tree, call)));
            Ok(())
        }
        Action::Assign { target, value } => {
            writer.line(&format!(
                "{} = {};",
                reference_name(tree, *target),
                render_expr(tree, value)
            ));
            Ok(())
        }
        Action::Input(variable) => render_input(tree, *variable, writer),
    }
}

/// Read a value from stdin into the variable, falling back to the type
/// default when the entered text does not parse.
fn render_input(
    tree: &ItemTree,
    variable: ItemId,
    writer: &mut SourceWriter,
) -> Result<(), EmitError> {
    let declared = tree[variable]
        .declared_type
        .as_ref()
        .and_then(|name| resolve_type_name(tree, name).ok())
        .ok_or_else(|| EmitError::UnresolvedType {
            item: tree.full_name(variable),
        })?;
    let (read_method, default) = match declared {
        Type::Number => ("nextDouble", "0.0"),
        Type::Boolean => ("nextBoolean", "false"),
        Type::Text => ("next", "\"\""),
        other => {
            // Object-typed input is rejected during type checking; reaching
            // this with one means the check was skipped.
            return Err(EmitError::UnresolvedType {
                item: format!("{} (input of type {other})", tree.full_name(variable)),
            });
        }
    };
    let target = reference_name(tree, variable);
    writer.open("try");
    writer.line("java.util.Scanner scanner = new java.util.Scanner(System.in);");
    writer.line(&format!("{target} = scanner.{read_method}();"));
    writer.close_with("} catch (Exception e) {");
    writer.line(&format!("{target} = {default};"));
    writer.line(&format!(
        "System.err.println(\"Entered value not correct, using {} instead\");",
        default.replace('"', "\\\"")
    ));
    writer.close();
    Ok(())
}

#[cfg(test)]
mod tests;
