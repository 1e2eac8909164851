use super::*;
use casey_parse::load;
use pretty_assertions::assert_eq;
use serde_json::json;

fn load_tree(document: &serde_json::Value) -> casey_parse::LoadedProject {
    match load(&document.to_string()) {
        Ok(project) => project,
        Err(diagnostics) => panic!("load failed:\n{diagnostics}"),
    }
}

fn options(root: &Path, entry: &str) -> GenerateOptions {
    GenerateOptions {
        entry_function: entry.to_owned(),
        parameters: Vec::new(),
        ignore_comments: false,
        output_root: root.to_path_buf(),
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("missing {}: {e}", path.display()))
}

fn greeter_document() -> serde_json::Value {
    json!({
        "name": "Prj",
        "comments": "demo project",
        "item": "PROJECT",
        "id": "3c2e2c5e-0000-0000-0000-00000000000a",
        "children": [
            {
                "name": "util",
                "comments": "",
                "item": "PACKAGE",
                "children": [
                    {
                        "name": "Greet",
                        "comments": "prints a greeting",
                        "item": "FUNCTION",
                        "returntype": "VOID",
                        "blocks": [
                            {
                                "blockid": "s1",
                                "blocktype": "START",
                                "blockconnections": { "BOTTOM": { "o1": "TOP" } }
                            },
                            {
                                "blockid": "o1",
                                "blocktype": "OUTPUT",
                                "blockconnections": { "BOTTOM": { "e1": "TOP" } },
                                "blockcontent": {
                                    "statement": {
                                        "type": "CONCAT",
                                        "parameter": [
                                            { "type": "TEXT", "value": "hello " },
                                            {
                                                "type": "CALL",
                                                "calls": [
                                                    { "type": "Prj.util.Greet.who", "parameter": [] }
                                                ]
                                            }
                                        ]
                                    }
                                }
                            },
                            { "blockid": "e1", "blocktype": "END", "blockconnections": {} }
                        ],
                        "children": [
                            {
                                "name": "who",
                                "comments": "who to greet",
                                "item": "PARAMETER",
                                "type": "TEXT",
                                "children": []
                            }
                        ]
                    }
                ]
            }
        ]
    })
}

#[test]
fn emits_the_package_tree_with_one_unit_per_function() {
    let project = load_tree(&greeter_document());
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let mut opts = options(dir.path(), "Prj.util.Greet");
    opts.parameters = vec![("who".to_owned(), "world".to_owned())];

    let diagnostics = generate(&project.tree, project.root, &project.broken_functions, &opts);
    assert!(!diagnostics.has_errors(), "{diagnostics}");

    assert_eq!(
        read(&dir.path().join("Prj/id.txt")),
        "3c2e2c5e-0000-0000-0000-00000000000a\n"
    );
    assert_eq!(read(&dir.path().join("Prj/comments.html")), "demo project");

    let unit = read(&dir.path().join("Prj/util/Greet.java"));
    assert!(unit.starts_with("package Prj.util;\n"), "{unit}");
    assert!(unit.contains("public class Greet {"), "{unit}");
    assert!(
        unit.contains("public static void Greet(String who) {"),
        "{unit}"
    );
    assert!(
        unit.contains(
            "System.out.println(String.valueOf(\"hello \") + String.valueOf(who));"
        ),
        "{unit}"
    );
    // The entry function gets a main method with the quoted TEXT argument.
    assert!(
        unit.contains("Greet.Greet(\"world\");"),
        "{unit}"
    );
    // Comments became Javadoc.
    assert!(unit.contains(" * prints a greeting"), "{unit}");
    assert!(unit.contains(" * @param who who to greet"), "{unit}");
}

#[test]
fn package_level_variable_becomes_a_static_wrapper_class() {
    let document = json!({
        "name": "Prj",
        "comments": "",
        "item": "PROJECT",
        "id": "3c2e2c5e-0000-0000-0000-00000000000b",
        "children": [
            {
                "name": "counter",
                "comments": "",
                "item": "VARIABLE",
                "type": "NUMBER",
                "children": []
            }
        ]
    });
    let project = load_tree(&document);
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let opts = options(dir.path(), "Prj.none");

    let diagnostics = generate(&project.tree, project.root, &project.broken_functions, &opts);
    assert!(!diagnostics.has_errors(), "{diagnostics}");

    let unit = read(&dir.path().join("Prj/counter.java"));
    assert!(unit.starts_with("package Prj;\n"), "{unit}");
    assert!(
        unit.contains("public static double counter = 0.0;"),
        "{unit}"
    );
}

#[test]
fn class_fields_and_methods_are_emitted_together() {
    let document = json!({
        "name": "Prj",
        "comments": "",
        "item": "PROJECT",
        "id": "3c2e2c5e-0000-0000-0000-00000000000c",
        "children": [
            {
                "name": "Point",
                "comments": "",
                "item": "CLASS",
                "children": [
                    {
                        "name": "x",
                        "comments": "",
                        "item": "VARIABLE",
                        "type": "NUMBER",
                        "children": []
                    },
                    {
                        "name": "reset",
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
                                    "statement": { "type": "NUMBER", "value": 0.0 },
                                    "variable": "Prj.Point.x"
                                }
                            },
                            { "blockid": "e1", "blocktype": "END", "blockconnections": {} }
                        ],
                        "children": []
                    }
                ]
            }
        ]
    });
    let project = load_tree(&document);
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let opts = options(dir.path(), "Prj.none");

    let diagnostics = generate(&project.tree, project.root, &project.broken_functions, &opts);
    assert!(!diagnostics.has_errors(), "{diagnostics}");

    let unit = read(&dir.path().join("Prj/Point.java"));
    assert!(unit.contains("public double x = 0.0;"), "{unit}");
    assert!(unit.contains("public void reset() {"), "{unit}");
    assert!(unit.contains("x = 0.0;"), "{unit}");
}

#[test]
fn broken_function_is_skipped_but_siblings_still_emit() {
    let document = json!({
        "name": "Prj",
        "comments": "",
        "item": "PROJECT",
        "id": "3c2e2c5e-0000-0000-0000-00000000000d",
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
                "blocks": [
                    {
                        "blockid": "s1",
                        "blocktype": "START",
                        "blockconnections": { "BOTTOM": { "e1": "TOP" } }
                    },
                    { "blockid": "e1", "blocktype": "END", "blockconnections": {} }
                ],
                "children": []
            }
        ]
    });
    let project = load_tree(&document);
    assert!(!project.broken_functions.is_empty());
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let opts = options(dir.path(), "Prj.none");

    let _ = generate(&project.tree, project.root, &project.broken_functions, &opts);
    assert!(!dir.path().join("Prj/broken.java").exists());
    assert!(dir.path().join("Prj/fine.java").exists());
}

#[test]
fn unreachable_block_fails_the_function_with_a_graph_diagnostic() {
    let document = json!({
        "name": "Prj",
        "comments": "",
        "item": "PROJECT",
        "id": "3c2e2c5e-0000-0000-0000-00000000000e",
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
                        "blockconnections": { "BOTTOM": { "e1": "TOP" } }
                    },
                    { "blockid": "e1", "blocktype": "END", "blockconnections": {} },
                    {
                        "blockid": "o1",
                        "blocktype": "OUTPUT",
                        "blockconnections": { "BOTTOM": { "e1": "TOP" } },
                        "blockcontent": {
                            "statement": { "type": "TEXT", "value": "stranded" }
                        }
                    }
                ],
                "children": []
            }
        ]
    });
    let project = load_tree(&document);
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let opts = options(dir.path(), "Prj.none");

    let diagnostics = generate(&project.tree, project.root, &project.broken_functions, &opts);
    assert!(diagnostics.has_errors());
    assert!(diagnostics.iter().any(|d| d.code == ErrorCode::C1004));
    assert!(!dir.path().join("Prj/main.java").exists());
}

#[test]
fn ignore_comments_suppresses_javadoc_and_html() {
    let project = load_tree(&greeter_document());
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("{e}"));
    let mut opts = options(dir.path(), "Prj.none");
    opts.ignore_comments = true;

    let diagnostics = generate(&project.tree, project.root, &project.broken_functions, &opts);
    assert!(!diagnostics.has_errors(), "{diagnostics}");
    assert!(!dir.path().join("Prj/comments.html").exists());
    let unit = read(&dir.path().join("Prj/util/Greet.java"));
    assert!(!unit.contains("/**"), "{unit}");
}
