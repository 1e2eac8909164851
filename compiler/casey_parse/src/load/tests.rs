use super::*;
use crate::save;
use casey_ir::BlockKind;
use pretty_assertions::assert_eq;
use serde_json::json;

fn load_ok(document: &Value) -> LoadedProject {
    match load(&document.to_string()) {
        Ok(project) => project,
        Err(diagnostics) => panic!("load failed:\n{diagnostics}"),
    }
}

fn minimal_blocks() -> Value {
    json!([
        {
            "blockid": "s1",
            "blocktype": "START",
            "blockconnections": { "BOTTOM": { "e1": "TOP" } }
        },
        {
            "blockid": "e1",
            "blocktype": "END",
            "blockconnections": {}
        }
    ])
}

#[test]
fn loads_the_item_hierarchy() {
    let document = json!({
        "name": "Prj",
        "comments": "the project",
        "item": "PROJECT",
        "id": "8a1f9a3e-0000-0000-0000-000000000001",
        "children": [
            {
                "name": "util",
                "comments": "",
                "item": "PACKAGE",
                "children": [
                    {
                        "name": "Greet",
                        "comments": "",
                        "item": "FUNCTION",
                        "returntype": "VOID",
                        "blocks": minimal_blocks(),
                        "children": [
                            {
                                "name": "who",
                                "comments": "",
                                "item": "PARAMETER",
                                "type": "TEXT",
                                "children": []
                            }
                        ]
                    }
                ]
            }
        ]
    });

    let project = load_ok(&document);
    assert!(!project.diagnostics.has_errors());
    assert!(project.broken_functions.is_empty());

    let tree = &project.tree;
    assert_eq!(tree[project.root].kind, ItemKind::Project);
    assert_eq!(
        tree[project.root].project_id.as_deref(),
        Some("8a1f9a3e-0000-0000-0000-000000000001")
    );
    let function = tree.resolve("Prj.util.Greet").unwrap_or_else(|| panic!("function missing"));
    assert_eq!(tree[function].return_type, Some(TypeName::Void));
    let parameter = tree
        .resolve("Prj.util.Greet.who")
        .unwrap_or_else(|| panic!("parameter missing"));
    assert_eq!(tree[parameter].declared_type, Some(TypeName::Text));

    let graph = tree[function].blocks.as_ref().unwrap_or_else(|| panic!("blocks missing"));
    assert_eq!(graph.len(), 2);
    let start = graph.by_uid("s1").unwrap_or_else(|| panic!("start missing"));
    assert_eq!(graph[start].kind, BlockKind::Start);
    assert_eq!(graph.next_of(start), graph.by_uid("e1"));
}

#[test]
fn variables_are_applied_before_function_blocks() {
    // The function comes FIRST in document order; its assignment block can
    // only keep the literal 42 if the variable's type was applied first.
    let document = json!({
        "name": "Prj",
        "comments": "",
        "item": "PROJECT",
        "children": [
            {
                "name": "main",
                "comments": "",
                "item": "FUNCTION",
                "returntype": "VOID",
                "blocks": [
                    {
                        "blockid": "s1",
                        "blocktype": "START",
                        "blockconnections": { "BOTTOM": { "a1": "TOP" } }
                    },
                    {
                        "blockid": "a1",
                        "blocktype": "ASSIGNMENT",
                        "blockconnections": { "BOTTOM": { "e1": "TOP" } },
                        "blockcontent": {
                            "statement": { "type": "NUMBER", "value": 42.0 },
                            "variable": "Prj.counter"
                        }
                    },
                    { "blockid": "e1", "blocktype": "END", "blockconnections": {} }
                ],
                "children": []
            },
            {
                "name": "counter",
                "comments": "",
                "item": "VARIABLE",
                "type": "NUMBER",
                "children": []
            }
        ]
    });

    let project = load_ok(&document);
    assert!(!project.diagnostics.has_errors(), "{}", project.diagnostics);

    let tree = &project.tree;
    let function = tree.resolve("Prj.main").unwrap_or_else(|| panic!("function missing"));
    let graph = tree[function].blocks.as_ref().unwrap_or_else(|| panic!("blocks missing"));
    let assignment = graph.by_uid("a1").unwrap_or_else(|| panic!("assignment missing"));
    let content = graph[assignment]
        .content
        .as_ref()
        .unwrap_or_else(|| panic!("content missing"));
    // The intended value survived: the variable's NUMBER type was already
    // resolved when the assignment was decoded.
    assert_eq!(
        content.statement,
        Some(Expr::Value(ValueKind::Number(42.0)))
    );
    assert_eq!(content.variable, tree.resolve("Prj.counter"));
}

#[test]
fn mismatched_assignment_value_is_coerced_to_the_type_default() {
    let document = json!({
        "name": "Prj",
        "comments": "",
        "item": "PROJECT",
        "children": [
            {
                "name": "greeting",
                "comments": "",
                "item": "VARIABLE",
                "type": "TEXT",
                "children": []
            },
            {
                "name": "main",
                "comments": "",
                "item": "FUNCTION",
                "returntype": "VOID",
                "blocks": [
                    {
                        "blockid": "s1",
                        "blocktype": "START",
                        "blockconnections": { "BOTTOM": { "a1": "TOP" } }
                    },
                    {
                        "blockid": "a1",
                        "blocktype": "ASSIGNMENT",
                        "blockconnections": { "BOTTOM": { "e1": "TOP" } },
                        "blockcontent": {
                            "statement": { "type": "NUMBER", "value": 7.0 },
                            "variable": "Prj.greeting"
                        }
                    },
                    { "blockid": "e1", "blocktype": "END", "blockconnections": {} }
                ],
                "children": []
            }
        ]
    });

    let project = load_ok(&document);
    assert_eq!(project.diagnostics.warning_count(), 1);
    assert!(!project.diagnostics.has_errors());

    let tree = &project.tree;
    let function = tree.resolve("Prj.main").unwrap_or_else(|| panic!("function missing"));
    let graph = tree[function].blocks.as_ref().unwrap_or_else(|| panic!("blocks missing"));
    let assignment = graph.by_uid("a1").unwrap_or_else(|| panic!("assignment missing"));
    let content = graph[assignment]
        .content
        .as_ref()
        .unwrap_or_else(|| panic!("content missing"));
    assert_eq!(
        content.statement,
        Some(Expr::Value(ValueKind::Text(String::new())))
    );
}

#[test]
fn unknown_item_kind_fails_the_document() {
    let document = json!({
        "name": "Prj",
        "comments": "",
        "item": "GADGET",
        "children": []
    });
    let diagnostics = match load(&document.to_string()) {
        Err(diagnostics) => diagnostics,
        Ok(_) => panic!("expected a document failure"),
    };
    assert!(diagnostics
        .iter()
        .any(|d| d.code == ErrorCode::C0002));
}

#[test]
fn malformed_json_fails_the_document() {
    let diagnostics = match load("{ not json") {
        Err(diagnostics) => diagnostics,
        Ok(_) => panic!("expected a document failure"),
    };
    assert!(diagnostics.iter().any(|d| d.code == ErrorCode::C0001));
}

#[test]
fn unresolved_call_breaks_only_its_own_function() {
    let document = json!({
        "name": "Prj",
        "comments": "",
        "item": "PROJECT",
        "children": [
            {
                "name": "broken",
                "comments": "",
                "item": "FUNCTION",
                "returntype": "VOID",
                "blocks": [
                    {
                        "blockid": "s1",
                        "blocktype": "START",
                        "blockconnections": { "BOTTOM": { "c1": "TOP" } }
                    },
                    {
                        "blockid": "c1",
                        "blocktype": "CALL",
                        "blockconnections": { "BOTTOM": { "e1": "TOP" } },
                        "blockcontent": {
                            "statement": {
                                "type": "CALL",
                                "calls": [ { "type": "Prj.missing", "parameter": [] } ]
                            }
                        }
                    },
                    { "blockid": "e1", "blocktype": "END", "blockconnections": {} }
                ],
                "children": []
            },
            {
                "name": "fine",
                "comments": "",
                "item": "FUNCTION",
                "returntype": "VOID",
                "blocks": minimal_blocks(),
                "children": []
            }
        ]
    });

    let project = load_ok(&document);
    assert!(project.diagnostics.has_errors());
    let tree = &project.tree;
    let broken = tree.resolve("Prj.broken").unwrap_or_else(|| panic!("function missing"));
    let fine = tree.resolve("Prj.fine").unwrap_or_else(|| panic!("function missing"));
    assert!(project.broken_functions.contains(&broken));
    assert!(!project.broken_functions.contains(&fine));
    assert!(project
        .diagnostics
        .iter()
        .any(|d| d.code == ErrorCode::C0006));
}

#[test]
fn document_round_trip_preserves_the_tree() {
    let document = json!({
        "name": "Prj",
        "comments": "top",
        "item": "PROJECT",
        "id": "8a1f9a3e-0000-0000-0000-000000000002",
        "children": [
            {
                "name": "flag",
                "comments": "",
                "item": "VARIABLE",
                "type": "BOOLEAN",
                "children": []
            },
            {
                "name": "main",
                "comments": "entry",
                "item": "FUNCTION",
                "returntype": "NUMBER",
                "blocks": [
                    {
                        "blockid": "s1",
                        "blockX": 10.0,
                        "blockY": 20.5,
                        "blocktype": "START",
                        "blockconnections": { "BOTTOM": { "d1": "TOP" } }
                    },
                    {
                        "blockid": "d1",
                        "blocktype": "DECISION",
                        "blockconnections": {
                            "RIGHT": { "e1": "TOP" },
                            "LEFT": { "e2": "TOP" }
                        },
                        "blockcontent": {
                            "statement": {
                                "type": "CALL",
                                "calls": [ { "type": "Prj.flag", "parameter": [] } ]
                            }
                        }
                    },
                    {
                        "blockid": "e1",
                        "blocktype": "END",
                        "blockconnections": {},
                        "blockcontent": {
                            "statement": {
                                "type": "ADD",
                                "parameter": [
                                    { "type": "NUMBER", "value": 1.0 },
                                    { "type": "NUMBER", "value": 2.0 }
                                ]
                            }
                        }
                    },
                    {
                        "blockid": "e2",
                        "blocktype": "END",
                        "blockconnections": {},
                        "blockcontent": {
                            "statement": { "type": "NUMBER", "value": 0.0 }
                        }
                    }
                ],
                "children": []
            }
        ]
    });

    let first = load_ok(&document);
    let saved = save(&first.tree, first.root);
    let second = load_ok(&saved);
    assert_eq!(first.tree, second.tree);

    // Editor coordinates survived the round trip.
    let tree = &second.tree;
    let function = tree.resolve("Prj.main").unwrap_or_else(|| panic!("function missing"));
    let graph = tree[function].blocks.as_ref().unwrap_or_else(|| panic!("blocks missing"));
    let start = graph.by_uid("s1").unwrap_or_else(|| panic!("start missing"));
    assert_eq!(graph[start].editor_pos, Some((10.0, 20.5)));
}

#[test]
fn duplicate_sibling_names_fail_the_document() {
    let document = json!({
        "name": "Prj",
        "comments": "",
        "item": "PROJECT",
        "children": [
            { "name": "x", "comments": "", "item": "VARIABLE", "type": "NUMBER", "children": [] },
            { "name": "x", "comments": "", "item": "VARIABLE", "type": "NUMBER", "children": [] }
        ]
    });
    let diagnostics = match load(&document.to_string()) {
        Err(diagnostics) => diagnostics,
        Ok(_) => panic!("expected a document failure"),
    };
    assert!(diagnostics.iter().any(|d| d.code == ErrorCode::C0004));
}
