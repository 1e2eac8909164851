use super::*;
use casey_ir::{Expr, ItemKind, OperatorKind, TypeName, ValueKind};
use pretty_assertions::assert_eq;

fn boolean(b: bool) -> Expr {
    Expr::Value(ValueKind::Boolean(b))
}

fn text(s: &str) -> Expr {
    Expr::Value(ValueKind::Text(s.to_owned()))
}

fn rendered(tree: &ItemTree, stmt: &Stmt) -> String {
    let mut writer = SourceWriter::new();
    render_stmt(tree, "Prj.main", stmt, &mut writer).unwrap_or_else(|e| panic!("{e}"));
    writer.output()
}

#[test]
fn if_without_else_omits_the_else_block() {
    let tree = ItemTree::new();
    let stmt = Stmt::If {
        cond: boolean(true),
        then: Box::new(Stmt::Seq(vec![Stmt::Action(Action::Output(text("hi")))])),
        otherwise: Box::new(Stmt::Seq(vec![])),
    };
    assert_eq!(
        rendered(&tree, &stmt),
        "if (true) {\n    System.out.println(\"hi\");\n}\n"
    );
}

#[test]
fn if_with_else_renders_both_arms() {
    let tree = ItemTree::new();
    let stmt = Stmt::If {
        cond: boolean(false),
        then: Box::new(Stmt::Seq(vec![Stmt::Return(None)])),
        otherwise: Box::new(Stmt::Seq(vec![Stmt::Action(Action::Output(text("no")))])),
    };
    assert_eq!(
        rendered(&tree, &stmt),
        "if (false) {\n    return;\n} else {\n    System.out.println(\"no\");\n}\n"
    );
}

#[test]
fn loop_renders_as_while() {
    let tree = ItemTree::new();
    let stmt = Stmt::Loop {
        cond: Expr::Operator {
            op: OperatorKind::Not,
            operands: vec![boolean(false)],
        },
        body: Box::new(Stmt::Seq(vec![Stmt::Action(Action::Output(text("again")))])),
    };
    assert_eq!(
        rendered(&tree, &stmt),
        "while (!false) {\n    System.out.println(\"again\");\n}\n"
    );
}

#[test]
fn input_reads_through_a_scanner_with_fallback() {
    let mut tree = ItemTree::new();
    let project = tree.add_root("Prj", ItemKind::Project);
    let function = tree
        .add_child(project, "main", ItemKind::Function)
        .unwrap_or_else(|e| panic!("{e}"));
    let variable = tree
        .add_child(function, "n", ItemKind::Variable)
        .unwrap_or_else(|e| panic!("{e}"));
    tree[variable].declared_type = Some(TypeName::Number);

    let stmt = Stmt::Action(Action::Input(variable));
    assert_eq!(
        rendered(&tree, &stmt),
        "try {\n    \
             java.util.Scanner scanner = new java.util.Scanner(System.in);\n    \
             n = scanner.nextDouble();\n\
         } catch (Exception e) {\n    \
             n = 0.0;\n    \
             System.err.println(\"Entered value not correct, using 0.0 instead\");\n\
         }\n"
    );
}

#[test]
fn goto_is_rejected_for_java() {
    let tree = ItemTree::new();
    let mut writer = SourceWriter::new();
    let result = render_stmt(&tree, "Prj.main", &Stmt::Goto("l1".to_owned()), &mut writer);
    assert!(matches!(
        result,
        Err(EmitError::Unsupported { construct: "goto", .. })
    ));
}

#[test]
fn assignment_to_a_static_variable_is_qualified() {
    let mut tree = ItemTree::new();
    let project = tree.add_root("Prj", ItemKind::Project);
    let global = tree
        .add_child(project, "counter", ItemKind::Variable)
        .unwrap_or_else(|e| panic!("{e}"));
    tree[global].declared_type = Some(TypeName::Number);

    let stmt = Stmt::Action(Action::Assign {
        target: global,
        value: Expr::Value(ValueKind::Number(1.0)),
    });
    assert_eq!(rendered(&tree, &stmt), "Prj.counter.counter = 1.0;\n");
}
