//! Serialization back into the document format.
//!
//! `load(save(tree)) == tree` for any tree without dangling references;
//! editor-only coordinates are preserved when they were present on load.

use casey_ir::{Block, BlockGraph, Expr, ItemId, ItemKind, ItemTree, ValueKind};
use serde_json::{json, Map, Value};

/// Serialize an item subtree into a document value.
pub fn save(tree: &ItemTree, root: ItemId) -> Value {
    save_item(tree, root)
}

fn save_item(tree: &ItemTree, id: ItemId) -> Value {
    let item = &tree[id];
    let mut fields = Map::new();
    fields.insert("name".to_owned(), json!(item.name));
    fields.insert("comments".to_owned(), json!(item.comments));
    fields.insert("item".to_owned(), json!(item.kind.as_document_str()));

    match item.kind {
        ItemKind::Project => {
            if let Some(project_id) = &item.project_id {
                fields.insert("id".to_owned(), json!(project_id));
            }
        }
        ItemKind::Variable | ItemKind::Parameter => {
            if let Some(declared) = &item.declared_type {
                fields.insert("type".to_owned(), json!(declared.as_document_str()));
            }
        }
        ItemKind::Function => {
            if let Some(return_type) = &item.return_type {
                fields.insert("returntype".to_owned(), json!(return_type.as_document_str()));
            }
            if let Some(graph) = &item.blocks {
                let blocks: Vec<Value> = graph
                    .blocks()
                    .map(|(block_id, block)| save_block(tree, graph, block_id, block))
                    .collect();
                fields.insert("blocks".to_owned(), Value::Array(blocks));
            }
        }
        _ => {}
    }

    let children: Vec<Value> = item
        .children
        .iter()
        .map(|&child| save_item(tree, child))
        .collect();
    fields.insert("children".to_owned(), Value::Array(children));
    Value::Object(fields)
}

fn save_block(
    tree: &ItemTree,
    graph: &BlockGraph,
    id: casey_ir::BlockId,
    block: &Block,
) -> Value {
    let mut fields = Map::new();
    fields.insert("blockid".to_owned(), json!(block.uid));
    if let Some((x, y)) = block.editor_pos {
        fields.insert("blockX".to_owned(), json!(x));
        fields.insert("blockY".to_owned(), json!(y));
    }
    fields.insert("blocktype".to_owned(), json!(block.kind.as_document_str()));

    // Rebuild the side-keyed connection maps from the edge list, in
    // wiring order so the round-trip preserves the original layout.
    let mut connections = Map::new();
    for edge in graph.outgoing(id) {
        let targets = connections
            .entry(edge.from_side.as_document_str().to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(targets) = targets {
            targets.insert(
                graph[edge.to].uid.clone(),
                json!(edge.to_side.as_document_str()),
            );
        }
    }
    fields.insert("blockconnections".to_owned(), Value::Object(connections));

    if let Some(content) = &block.content {
        let mut content_fields = Map::new();
        if let Some(statement) = &content.statement {
            content_fields.insert("statement".to_owned(), save_statement(tree, statement));
        }
        if let Some(variable) = content.variable {
            content_fields.insert("variable".to_owned(), json!(tree.full_name(variable)));
        }
        fields.insert("blockcontent".to_owned(), Value::Object(content_fields));
    }
    Value::Object(fields)
}

fn save_statement(tree: &ItemTree, statement: &Expr) -> Value {
    match statement {
        Expr::Value(value) => {
            let literal = match value {
                ValueKind::Number(n) => json!(n),
                ValueKind::Boolean(b) => json!(b),
                ValueKind::Text(t) => json!(t),
                ValueKind::Object(path) => json!(path),
            };
            json!({ "type": value.as_document_str(), "value": literal })
        }
        Expr::Operator { op, operands } => {
            let operands: Vec<Value> = operands
                .iter()
                .map(|operand| save_statement(tree, operand))
                .collect();
            json!({ "type": op.as_document_str(), "parameter": operands })
        }
        Expr::Call { segments } => {
            let calls: Vec<Value> = segments
                .iter()
                .map(|segment| {
                    let arguments: Vec<Value> = segment
                        .arguments
                        .iter()
                        .map(|argument| save_statement(tree, argument))
                        .collect();
                    json!({
                        "type": tree.full_name(segment.item),
                        "parameter": arguments,
                    })
                })
                .collect();
            json!({ "type": "CALL", "calls": calls })
        }
    }
}
