//! The two-phase document loader.

use casey_diagnostic::{Diagnostic, DiagnosticList, ErrorCode, Origin};
use casey_ir::{
    BlockContent, BlockGraph, BlockKind, CallSegment, Expr, ItemId, ItemKind, ItemTree,
    OperatorKind, Side, TypeName, ValueKind,
};
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};

/// A successfully loaded document.
///
/// `diagnostics` may still carry warnings and function-local errors;
/// functions listed in `broken_functions` failed to load their bodies and
/// must be skipped by later stages, while their siblings proceed.
#[derive(Clone, Debug)]
pub struct LoadedProject {
    pub tree: ItemTree,
    pub root: ItemId,
    pub diagnostics: DiagnosticList,
    pub broken_functions: FxHashSet<ItemId>,
}

/// Load a document from its JSON text.
///
/// Document-level failures return every accumulated diagnostic; function
/// local failures are reported inside the `Ok` value instead.
pub fn load(text: &str) -> Result<LoadedProject, DiagnosticList> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(error) => {
            let mut diagnostics = DiagnosticList::new();
            diagnostics.push(
                Diagnostic::error(ErrorCode::C0001)
                    .with_message(format!("malformed document: {error}")),
            );
            return Err(diagnostics);
        }
    };

    let mut loader = Loader::default();
    let root = loader.instantiate(&value, None);
    match root {
        Some(root) if !loader.doc_failed => {
            loader.apply_phases();
            if loader.doc_failed {
                return Err(loader.diagnostics);
            }
            tracing::debug!(
                items = loader.tree.iter().count(),
                broken = loader.broken.len(),
                "document loaded"
            );
            Ok(LoadedProject {
                tree: loader.tree,
                root,
                diagnostics: loader.diagnostics,
                broken_functions: loader.broken,
            })
        }
        _ => Err(loader.diagnostics),
    }
}

#[derive(Default)]
struct Loader {
    tree: ItemTree,
    diagnostics: DiagnosticList,
    /// Uninterpreted extra fields per item, in document order.
    extras: Vec<(ItemId, Map<String, Value>)>,
    broken: FxHashSet<ItemId>,
    doc_failed: bool,
}

impl Loader {
    fn doc_error(&mut self, diagnostic: Diagnostic) {
        self.doc_failed = true;
        self.diagnostics.push(diagnostic);
    }

    fn function_error(&mut self, function: ItemId, diagnostic: Diagnostic) {
        self.broken.insert(function);
        self.diagnostics.push(diagnostic);
    }

    // ----- Phase 1: instantiate items ------------------------------------

    fn instantiate(&mut self, value: &Value, parent: Option<ItemId>) -> Option<ItemId> {
        let Value::Object(fields) = value else {
            self.doc_error(
                Diagnostic::error(ErrorCode::C0001).with_message("item node is not an object"),
            );
            return None;
        };

        let Some(name) = fields.get("name").and_then(Value::as_str) else {
            self.doc_error(
                Diagnostic::error(ErrorCode::C0003).with_message("item has no `name` field"),
            );
            return None;
        };
        let Some(kind_text) = fields.get("item").and_then(Value::as_str) else {
            self.doc_error(
                Diagnostic::error(ErrorCode::C0003)
                    .with_message(format!("item `{name}` has no `item` kind field")),
            );
            return None;
        };
        let Some(kind) = ItemKind::parse(kind_text) else {
            self.doc_error(
                Diagnostic::error(ErrorCode::C0002)
                    .with_message(format!("unknown item kind `{kind_text}`"))
                    .with_label(Origin::item(name), ""),
            );
            return None;
        };

        let id = match parent {
            None => self.tree.add_root(name, kind),
            Some(parent) => match self.tree.add_child(parent, name, kind) {
                Ok(id) => id,
                Err(error) => {
                    self.doc_error(
                        Diagnostic::error(ErrorCode::C0004).with_message(error.to_string()),
                    );
                    return None;
                }
            },
        };
        if let Some(comments) = fields.get("comments").and_then(Value::as_str) {
            self.tree[id].comments = comments.to_owned();
        }

        let mut extras = Map::new();
        for (key, field) in fields {
            if !matches!(key.as_str(), "name" | "comments" | "item" | "children") {
                extras.insert(key.clone(), field.clone());
            }
        }
        if !extras.is_empty() {
            self.extras.push((id, extras));
        }

        if let Some(children) = fields.get("children") {
            let Value::Array(children) = children else {
                self.doc_error(
                    Diagnostic::error(ErrorCode::C0001)
                        .with_message(format!("`children` of `{name}` is not an array")),
                );
                return None;
            };
            for child in children {
                self.instantiate(child, Some(id));
            }
        }
        Some(id)
    }

    // ----- Phase 2: apply extra fields, variables and parameters first ---

    fn apply_phases(&mut self) {
        let extras = std::mem::take(&mut self.extras);
        let (variables, others): (Vec<_>, Vec<_>) = extras.into_iter().partition(|(id, _)| {
            matches!(
                self.tree[*id].kind,
                ItemKind::Variable | ItemKind::Parameter
            )
        });
        for (id, fields) in &variables {
            self.apply_variable(*id, fields);
        }
        for (id, fields) in &others {
            self.apply_other(*id, fields);
        }
    }

    fn apply_variable(&mut self, id: ItemId, fields: &Map<String, Value>) {
        match fields.get("type").and_then(Value::as_str).map(TypeName::parse) {
            Some(Some(type_name)) => self.tree[id].declared_type = Some(type_name),
            _ => {
                let path = self.tree.full_name(id);
                self.doc_error(
                    Diagnostic::error(ErrorCode::C0005)
                        .with_message(format!(
                            "{} `{path}` has no type",
                            self.tree[id].kind
                        ))
                        .with_label(Origin::item(path.clone()), ""),
                );
            }
        }
    }

    fn apply_other(&mut self, id: ItemId, fields: &Map<String, Value>) {
        match self.tree[id].kind {
            ItemKind::Project => {
                if let Some(project_id) = fields.get("id").and_then(Value::as_str) {
                    self.tree[id].project_id = Some(project_id.to_owned());
                }
            }
            ItemKind::Function => {
                match fields.get("returntype").and_then(Value::as_str) {
                    Some(text) => match TypeName::parse(text) {
                        Some(type_name) => self.tree[id].return_type = Some(type_name),
                        None => {
                            let path = self.tree.full_name(id);
                            self.doc_error(
                                Diagnostic::error(ErrorCode::C0005)
                                    .with_message(format!(
                                        "function `{path}` has an empty return type"
                                    ))
                                    .with_label(Origin::item(path.clone()), ""),
                            );
                        }
                    },
                    None => {
                        // Tolerated: generation treats a missing return type
                        // as VOID, matching the original compiler.
                        self.diagnostics.push(
                            Diagnostic::warning(ErrorCode::C0003)
                                .with_message(format!(
                                    "function `{}` has no `returntype`, assuming VOID",
                                    self.tree.full_name(id)
                                )),
                        );
                    }
                }
                if let Some(blocks) = fields.get("blocks") {
                    self.apply_blocks(id, blocks);
                }
            }
            _ => {}
        }
    }

    // ----- Block graphs ---------------------------------------------------

    fn apply_blocks(&mut self, function: ItemId, blocks: &Value) {
        let path = self.tree.full_name(function);
        let Value::Array(blocks) = blocks else {
            self.function_error(
                function,
                Diagnostic::error(ErrorCode::C0001)
                    .with_message(format!("`blocks` of `{path}` is not an array")),
            );
            return;
        };

        let mut graph = BlockGraph::new();
        // Create all blocks first so connections can target any of them.
        for block in blocks {
            let Value::Object(fields) = block else {
                self.doc_error(
                    Diagnostic::error(ErrorCode::C0001)
                        .with_message(format!("block node of `{path}` is not an object")),
                );
                return;
            };
            let Some(uid) = fields.get("blockid").and_then(Value::as_str) else {
                self.doc_error(
                    Diagnostic::error(ErrorCode::C0003)
                        .with_message(format!("a block of `{path}` has no `blockid`"))
                        .with_label(Origin::item(path.clone()), ""),
                );
                return;
            };
            let Some(kind) = fields.get("blocktype").and_then(Value::as_str) else {
                self.doc_error(
                    Diagnostic::error(ErrorCode::C0003)
                        .with_message(format!("block `{uid}` of `{path}` has no `blocktype`"))
                        .with_label(Origin::block(path.clone(), uid), ""),
                );
                return;
            };
            let Some(kind) = BlockKind::parse(kind) else {
                self.doc_error(
                    Diagnostic::error(ErrorCode::C0002)
                        .with_message(format!("unknown block type `{kind}`"))
                        .with_label(Origin::block(path.clone(), uid), ""),
                );
                return;
            };
            let id = match graph.add_block(kind, uid) {
                Ok(id) => id,
                Err(error) => {
                    self.doc_error(
                        Diagnostic::error(ErrorCode::C0007)
                            .with_message(error.to_string())
                            .with_label(Origin::block(path.clone(), uid), ""),
                    );
                    return;
                }
            };
            if let (Some(x), Some(y)) = (
                fields.get("blockX").and_then(Value::as_f64),
                fields.get("blockY").and_then(Value::as_f64),
            ) {
                graph[id].editor_pos = Some((x, y));
            }
        }

        // Wire connections, then decode contents.
        for block in blocks {
            let Value::Object(fields) = block else { continue };
            let Some(uid) = fields.get("blockid").and_then(Value::as_str) else {
                continue;
            };
            let Some(from) = graph.by_uid(uid) else { continue };
            if let Some(connections) = fields.get("blockconnections") {
                self.apply_connections(function, &path, &mut graph, from, connections);
            }
            if let Some(content) = fields.get("blockcontent") {
                self.apply_content(function, &path, &mut graph, from, content);
            }
        }

        self.tree[function].blocks = Some(graph);
    }

    fn apply_connections(
        &mut self,
        function: ItemId,
        path: &str,
        graph: &mut BlockGraph,
        from: casey_ir::BlockId,
        connections: &Value,
    ) {
        let uid = graph[from].uid.clone();
        let Value::Object(sides) = connections else {
            self.function_error(
                function,
                Diagnostic::error(ErrorCode::C0007)
                    .with_message(format!("connections of block `{uid}` are not an object"))
                    .with_label(Origin::block(path, uid.clone()), ""),
            );
            return;
        };
        for (side_text, targets) in sides {
            let Some(from_side) = Side::parse(side_text) else {
                self.function_error(
                    function,
                    Diagnostic::error(ErrorCode::C0007)
                        .with_message(format!("unknown connection side `{side_text}`"))
                        .with_label(Origin::block(path, uid.clone()), ""),
                );
                continue;
            };
            let Value::Object(targets) = targets else {
                self.function_error(
                    function,
                    Diagnostic::error(ErrorCode::C0007)
                        .with_message(format!(
                            "targets of the {from_side} side of block `{uid}` are not an object"
                        ))
                        .with_label(Origin::block(path, uid.clone()), ""),
                );
                continue;
            };
            for (target_uid, target_side) in targets {
                let Some(to) = graph.by_uid(target_uid) else {
                    self.function_error(
                        function,
                        Diagnostic::error(ErrorCode::C0007)
                            .with_message(format!(
                                "connection targets unknown block `{target_uid}`"
                            ))
                            .with_label(Origin::block(path, uid.clone()), ""),
                    );
                    continue;
                };
                let Some(to_side) = target_side.as_str().and_then(Side::parse) else {
                    self.function_error(
                        function,
                        Diagnostic::error(ErrorCode::C0007)
                            .with_message(format!(
                                "connection to `{target_uid}` has an invalid target side"
                            ))
                            .with_label(Origin::block(path, uid.clone()), ""),
                    );
                    continue;
                };
                if let Err(error) = graph.connect(from, from_side, to, to_side) {
                    self.function_error(
                        function,
                        Diagnostic::error(ErrorCode::C1006)
                            .with_message(error.to_string())
                            .with_label(Origin::block(path, uid.clone()), ""),
                    );
                }
            }
        }
    }

    fn apply_content(
        &mut self,
        function: ItemId,
        path: &str,
        graph: &mut BlockGraph,
        id: casey_ir::BlockId,
        content: &Value,
    ) {
        let uid = graph[id].uid.clone();
        let Value::Object(fields) = content else {
            self.function_error(
                function,
                Diagnostic::error(ErrorCode::C0008)
                    .with_message(format!("content of block `{uid}` is not an object"))
                    .with_label(Origin::block(path, uid.clone()), ""),
            );
            return;
        };

        let variable = match fields.get("variable").and_then(Value::as_str) {
            Some(variable_path) => match self.resolve_binding(variable_path) {
                Some(item) => Some(item),
                None => {
                    self.function_error(
                        function,
                        Diagnostic::error(ErrorCode::C0006)
                            .with_message(format!(
                                "block variable `{variable_path}` is not a known variable or parameter"
                            ))
                            .with_label(Origin::block(path, uid.clone()), ""),
                    );
                    return;
                }
            },
            None => None,
        };

        let mut statement = match fields.get("statement") {
            Some(value) => {
                let origin = Origin::block(path, uid.clone());
                match self.parse_statement(value, &origin) {
                    Some(statement) => Some(statement),
                    None => {
                        self.broken.insert(function);
                        return;
                    }
                }
            }
            None => None,
        };

        // Assignment values are coerced against the variable's declared
        // type. The declared type comes from the variables-first apply
        // phase; seeing an unresolved type here means that order was
        // violated.
        if graph[id].kind == BlockKind::Assignment {
            if let (Some(variable), Some(Expr::Value(value))) = (variable, statement.as_mut()) {
                self.coerce_assignment(function, path, &uid, variable, value);
            }
        }

        if variable.is_some() || statement.is_some() {
            graph[id].content = Some(BlockContent { statement, variable });
        }
    }

    fn resolve_binding(&self, path: &str) -> Option<ItemId> {
        let id = self.tree.resolve(path)?;
        matches!(
            self.tree[id].kind,
            ItemKind::Variable | ItemKind::Parameter
        )
        .then_some(id)
    }

    fn coerce_assignment(
        &mut self,
        function: ItemId,
        path: &str,
        uid: &str,
        variable: ItemId,
        value: &mut ValueKind,
    ) {
        let variable_path = self.tree.full_name(variable);
        let declared = self.tree[variable].declared_type.clone();
        let (default, matches) = match &declared {
            Some(TypeName::Number) => (
                Some(ValueKind::Number(0.0)),
                matches!(value, ValueKind::Number(_)),
            ),
            Some(TypeName::Boolean) => (
                Some(ValueKind::Boolean(false)),
                matches!(value, ValueKind::Boolean(_)),
            ),
            Some(TypeName::Text) => (
                Some(ValueKind::Text(String::new())),
                matches!(value, ValueKind::Text(_)),
            ),
            Some(TypeName::Object(_)) => (None, matches!(value, ValueKind::Object(_))),
            Some(TypeName::Void) | Some(TypeName::Undefined) | None => {
                self.function_error(
                    function,
                    Diagnostic::error(ErrorCode::C0005)
                        .with_message(format!(
                            "type of `{variable_path}` is not resolved; cannot check the assigned value"
                        ))
                        .with_label(Origin::block(path, uid), ""),
                );
                return;
            }
        };
        if matches {
            return;
        }
        match default {
            Some(default) => {
                self.diagnostics.push(
                    Diagnostic::warning(ErrorCode::C0009)
                        .with_message(format!(
                            "assigned {} value does not fit `{variable_path}`; using the type default",
                            value.as_document_str()
                        ))
                        .with_label(Origin::block(path, uid), ""),
                );
                *value = default;
            }
            None => {
                // Object-typed variable with a primitive value: keep it,
                // the type checker reports the mismatch with full context.
            }
        }
    }

    // ----- Statements -----------------------------------------------------

    fn parse_statement(&mut self, value: &Value, origin: &Origin) -> Option<Expr> {
        let Value::Object(fields) = value else {
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::C0008)
                    .with_message("statement is not an object")
                    .with_label(origin.clone(), ""),
            );
            return None;
        };
        let Some(tag) = fields.get("type").and_then(Value::as_str) else {
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::C0008)
                    .with_message("statement has no `type` tag")
                    .with_label(origin.clone(), ""),
            );
            return None;
        };

        match tag {
            "NUMBER" | "BOOLEAN" | "TEXT" | "OBJECT" => {
                self.parse_value(tag, fields.get("value"), origin)
            }
            "CALL" => self.parse_call(fields.get("calls"), origin),
            _ => match OperatorKind::parse(tag) {
                Some(op) => self.parse_operator(op, fields.get("parameter"), origin),
                None => {
                    self.diagnostics.push(
                        Diagnostic::error(ErrorCode::C0008)
                            .with_message(format!("unknown statement type `{tag}`"))
                            .with_label(origin.clone(), ""),
                    );
                    None
                }
            },
        }
    }

    fn parse_value(&mut self, tag: &str, value: Option<&Value>, origin: &Origin) -> Option<Expr> {
        let kind = match (tag, value) {
            ("NUMBER", Some(Value::Number(n))) => n.as_f64().map(ValueKind::Number),
            ("BOOLEAN", Some(Value::Bool(b))) => Some(ValueKind::Boolean(*b)),
            ("TEXT", Some(Value::String(s))) => Some(ValueKind::Text(s.clone())),
            ("OBJECT", Some(Value::String(s))) => Some(ValueKind::Object(s.clone())),
            _ => None,
        };
        match kind {
            Some(kind) => Some(Expr::Value(kind)),
            None => {
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::C0008)
                        .with_message(format!("{tag} statement has a missing or invalid `value`"))
                        .with_label(origin.clone(), ""),
                );
                None
            }
        }
    }

    fn parse_operator(
        &mut self,
        op: OperatorKind,
        operands: Option<&Value>,
        origin: &Origin,
    ) -> Option<Expr> {
        let Some(Value::Array(operands)) = operands else {
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::C0008)
                    .with_message(format!("{op} statement has no `parameter` list"))
                    .with_label(origin.clone(), ""),
            );
            return None;
        };
        let operands = operands
            .iter()
            .map(|operand| self.parse_statement(operand, origin))
            .collect::<Option<Vec<_>>>()?;
        Some(Expr::Operator { op, operands })
    }

    fn parse_call(&mut self, calls: Option<&Value>, origin: &Origin) -> Option<Expr> {
        let Some(Value::Array(calls)) = calls else {
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::C0008)
                    .with_message("CALL statement has no `calls` list")
                    .with_label(origin.clone(), ""),
            );
            return None;
        };
        let mut segments = Vec::with_capacity(calls.len());
        for call in calls {
            let Value::Object(fields) = call else {
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::C0008)
                        .with_message("call segment is not an object")
                        .with_label(origin.clone(), ""),
                );
                return None;
            };
            let Some(target) = fields.get("type").and_then(Value::as_str) else {
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::C0008)
                        .with_message("call segment has no `type` reference")
                        .with_label(origin.clone(), ""),
                );
                return None;
            };
            let Some(item) = self.tree.resolve(target) else {
                self.diagnostics.push(
                    Diagnostic::error(ErrorCode::C0006)
                        .with_message(format!("call references unknown item `{target}`"))
                        .with_label(origin.clone(), ""),
                );
                return None;
            };
            let arguments = match fields.get("parameter") {
                Some(Value::Array(arguments)) => arguments
                    .iter()
                    .map(|argument| self.parse_statement(argument, origin))
                    .collect::<Option<Vec<_>>>()?,
                _ => Vec::new(),
            };
            segments.push(CallSegment { item, arguments });
        }
        if segments.is_empty() {
            self.diagnostics.push(
                Diagnostic::error(ErrorCode::C0008)
                    .with_message("CALL statement has no segments")
                    .with_label(origin.clone(), ""),
            );
            return None;
        }
        Some(Expr::Call { segments })
    }
}

#[cfg(test)]
mod tests;
