//! Graph-to-structured-control-flow reconstruction.

use std::fmt;

use casey_diagnostic::{Diagnostic, ErrorCode, Origin};
use casey_ir::{BlockGraph, BlockId, BlockKind, Expr, ItemId, OperatorKind};
use petgraph::algo::dominators::{simple_fast, Dominators};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeRef, Reversed};
use petgraph::Direction;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ir::{Action, Label, Stmt};

/// Error raised while structuring a function body.
///
/// Wiring problems are caught by `validate` beforehand; what remains here
/// is missing block *content* (a Decision without a condition, an
/// Assignment without a variable) and the defensive `BrokenGraph` case for
/// graphs that skipped validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructureError {
    MissingStart,
    MissingStatement { uid: String, kind: BlockKind },
    MissingVariable { uid: String, kind: BlockKind },
    BrokenGraph { uid: String },
}

impl StructureError {
    pub fn to_diagnostic(&self, function_path: &str) -> Diagnostic {
        let (code, origin) = match self {
            StructureError::MissingStart => (ErrorCode::C1001, Origin::item(function_path)),
            StructureError::MissingStatement { uid, .. }
            | StructureError::MissingVariable { uid, .. } => {
                (ErrorCode::C1007, Origin::block(function_path, uid.clone()))
            }
            StructureError::BrokenGraph { uid } => {
                (ErrorCode::C1005, Origin::block(function_path, uid.clone()))
            }
        };
        Diagnostic::error(code)
            .with_message(self.to_string())
            .with_label(origin, "")
    }
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureError::MissingStart => write!(f, "function graph has no start block"),
            StructureError::MissingStatement { uid, kind } => {
                write!(f, "{kind} block `{uid}` has no statement")
            }
            StructureError::MissingVariable { uid, kind } => {
                write!(f, "{kind} block `{uid}` has no variable")
            }
            StructureError::BrokenGraph { uid } => {
                write!(f, "block `{uid}` is wired inconsistently; graph was not validated")
            }
        }
    }
}

impl std::error::Error for StructureError {}

/// Structure a validated block graph into nested statements.
///
/// Always terminates and always produces *some* structured program:
/// regions the if/loop recognizers cannot capture fall back to
/// label/goto pairs.
pub fn structure(graph: &BlockGraph) -> Result<Stmt, StructureError> {
    let mut structurer = Structurer::new(graph)?;
    let body = structurer.run()?;
    if structurer.goto_targets.is_empty() {
        return Ok(Stmt::Seq(body));
    }
    // Irreducible region: rerun the identical walk, now wrapping every
    // goto target in a label. The walk is deterministic, so the second
    // pass discovers the same target set.
    tracing::warn!(
        targets = structurer.goto_targets.len(),
        "control flow not fully reducible, falling back to labels"
    );
    structurer.labels_enabled = true;
    let body = structurer.run()?;
    Ok(Stmt::Seq(body))
}

struct Structurer<'a> {
    graph: &'a BlockGraph,
    node_of: Vec<NodeIndex>,
    block_of: FxHashMap<NodeIndex, BlockId>,
    start: NodeIndex,
    exit: NodeIndex,
    postdoms: Dominators<NodeIndex>,
    loop_nodes: FxHashMap<NodeIndex, FxHashSet<NodeIndex>>,
    emitted: FxHashSet<NodeIndex>,
    goto_targets: FxHashSet<NodeIndex>,
    labels_enabled: bool,
}

impl<'a> Structurer<'a> {
    fn new(graph: &'a BlockGraph) -> Result<Self, StructureError> {
        let start_id = graph.start().ok_or(StructureError::MissingStart)?;

        let mut cfg = DiGraph::new();
        let mut node_of = Vec::with_capacity(graph.len());
        let mut block_of = FxHashMap::default();
        for id in graph.ids() {
            let node = cfg.add_node(());
            node_of.push(node);
            block_of.insert(node, id);
        }
        let exit = cfg.add_node(());
        for edge in graph.edges() {
            cfg.add_edge(node_of[edge.from.index()], node_of[edge.to.index()], ());
        }
        for (id, block) in graph.blocks() {
            if block.kind == BlockKind::End {
                cfg.add_edge(node_of[id.index()], exit, ());
            }
        }

        let start = node_of[start_id.index()];
        let doms = simple_fast(&cfg, start);
        let postdoms = simple_fast(Reversed(&cfg), exit);

        // Back-edges: the edge target dominates its source. Each target is
        // a loop header; its natural loop is every node that reaches the
        // back-edge source without passing through the header.
        let mut loop_nodes: FxHashMap<NodeIndex, FxHashSet<NodeIndex>> = FxHashMap::default();
        for edge in cfg.edge_references() {
            let (tail, header) = (edge.source(), edge.target());
            if header != exit && dominates(&doms, header, tail) {
                let members = loop_nodes.entry(header).or_default();
                members.insert(header);
                let mut stack = vec![tail];
                while let Some(node) = stack.pop() {
                    if members.insert(node) {
                        stack.extend(cfg.neighbors_directed(node, Direction::Incoming));
                    }
                }
            }
        }

        Ok(Structurer {
            graph,
            node_of,
            block_of,
            start,
            exit,
            postdoms,
            loop_nodes,
            emitted: FxHashSet::default(),
            goto_targets: FxHashSet::default(),
            labels_enabled: false,
        })
    }

    fn run(&mut self) -> Result<Vec<Stmt>, StructureError> {
        self.emitted.clear();
        let mut out = Vec::new();
        self.walk(self.start, None, &mut out)?;
        Ok(out)
    }

    /// Structure the region starting at `node` up to (exclusive) `stop`.
    fn walk(
        &mut self,
        mut node: NodeIndex,
        stop: Option<NodeIndex>,
        out: &mut Vec<Stmt>,
    ) -> Result<(), StructureError> {
        loop {
            if Some(node) == stop || node == self.exit {
                return Ok(());
            }
            if self.emitted.contains(&node) {
                // A second path into an already-structured node: the
                // region is not reducible here, degrade to a jump.
                self.goto_targets.insert(node);
                out.push(Stmt::Goto(self.label(node)));
                return Ok(());
            }
            self.emitted.insert(node);
            let id = self.block_of[&node];
            let kind = self.graph[id].kind;

            if kind == BlockKind::Decision && self.loop_nodes.contains_key(&node) {
                if let Some(next) = self.try_while(node, id, out)? {
                    node = next;
                    continue;
                }
            }

            match kind {
                BlockKind::Start => {
                    node = self.successor(id)?;
                }
                BlockKind::End => {
                    let stmt = Stmt::Return(self.statement_of(id).cloned());
                    self.push(node, stmt, out);
                    return Ok(());
                }
                BlockKind::Decision => {
                    let cond = self.required_statement(id)?.clone();
                    let (true_node, false_node) = self.branches(id)?;
                    let join = self.postdoms.immediate_dominator(node);
                    let arm_stop = join.or(stop);
                    let mut then_stmts = Vec::new();
                    self.walk(true_node, arm_stop, &mut then_stmts)?;
                    let mut else_stmts = Vec::new();
                    self.walk(false_node, arm_stop, &mut else_stmts)?;
                    let stmt = Stmt::If {
                        cond,
                        then: Box::new(Stmt::Seq(then_stmts)),
                        otherwise: Box::new(Stmt::Seq(else_stmts)),
                    };
                    self.push(node, stmt, out);
                    match join {
                        Some(j) if Some(j) != stop && j != self.exit => node = j,
                        _ => return Ok(()),
                    }
                }
                _ => {
                    let action = self.action_of(id)?;
                    self.push(node, Stmt::Action(action), out);
                    node = self.successor(id)?;
                }
            }
        }
    }

    /// Recognize `node` as a while-loop header: a Decision with exactly
    /// one successor inside its natural loop and one outside. Emits the
    /// loop and returns the continuation node.
    fn try_while(
        &mut self,
        node: NodeIndex,
        id: BlockId,
        out: &mut Vec<Stmt>,
    ) -> Result<Option<NodeIndex>, StructureError> {
        let (true_node, false_node) = self.branches(id)?;
        let (true_in, false_in) = {
            let members = &self.loop_nodes[&node];
            (members.contains(&true_node), members.contains(&false_node))
        };
        let (body_entry, continuation, negate) = match (true_in, false_in) {
            (true, false) => (true_node, false_node, false),
            (false, true) => (false_node, true_node, true),
            // Both successors inside (or outside) the loop: not a while
            // shape; let if-structuring and the goto fallback handle it.
            _ => return Ok(None),
        };

        let mut cond = self.required_statement(id)?.clone();
        if negate {
            cond = Expr::Operator {
                op: OperatorKind::Not,
                operands: vec![cond],
            };
        }
        let mut body = Vec::new();
        self.walk(body_entry, Some(node), &mut body)?;
        let stmt = Stmt::Loop {
            cond,
            body: Box::new(Stmt::Seq(body)),
        };
        self.push(node, stmt, out);
        Ok(Some(continuation))
    }

    fn action_of(&self, id: BlockId) -> Result<Action, StructureError> {
        let kind = self.graph[id].kind;
        Ok(match kind {
            BlockKind::Output => Action::Output(self.required_statement(id)?.clone()),
            BlockKind::Call => Action::Call(self.required_statement(id)?.clone()),
            BlockKind::Input => Action::Input(self.required_variable(id)?),
            BlockKind::Assignment => Action::Assign {
                target: self.required_variable(id)?,
                value: self.required_statement(id)?.clone(),
            },
            _ => {
                return Err(StructureError::BrokenGraph {
                    uid: self.graph[id].uid.clone(),
                })
            }
        })
    }

    fn statement_of(&self, id: BlockId) -> Option<&Expr> {
        self.graph[id]
            .content
            .as_ref()
            .and_then(|content| content.statement.as_ref())
    }

    fn required_statement(&self, id: BlockId) -> Result<&Expr, StructureError> {
        self.statement_of(id)
            .ok_or_else(|| StructureError::MissingStatement {
                uid: self.graph[id].uid.clone(),
                kind: self.graph[id].kind,
            })
    }

    fn required_variable(&self, id: BlockId) -> Result<ItemId, StructureError> {
        self.graph[id]
            .content
            .as_ref()
            .and_then(|content| content.variable)
            .ok_or_else(|| StructureError::MissingVariable {
                uid: self.graph[id].uid.clone(),
                kind: self.graph[id].kind,
            })
    }

    fn successor(&self, id: BlockId) -> Result<NodeIndex, StructureError> {
        self.graph
            .next_of(id)
            .map(|next| self.node_of[next.index()])
            .ok_or_else(|| StructureError::BrokenGraph {
                uid: self.graph[id].uid.clone(),
            })
    }

    fn branches(&self, id: BlockId) -> Result<(NodeIndex, NodeIndex), StructureError> {
        self.graph
            .decision_branches(id)
            .map(|(t, f)| (self.node_of[t.index()], self.node_of[f.index()]))
            .ok_or_else(|| StructureError::BrokenGraph {
                uid: self.graph[id].uid.clone(),
            })
    }

    fn push(&self, node: NodeIndex, stmt: Stmt, out: &mut Vec<Stmt>) {
        if self.labels_enabled && self.goto_targets.contains(&node) {
            out.push(Stmt::Labeled(self.label(node), Box::new(stmt)));
        } else {
            out.push(stmt);
        }
    }

    fn label(&self, node: NodeIndex) -> Label {
        format!("l{}", node.index())
    }
}

fn dominates(doms: &Dominators<NodeIndex>, a: NodeIndex, b: NodeIndex) -> bool {
    if a == b {
        return true;
    }
    let mut current = b;
    while let Some(idom) = doms.immediate_dominator(current) {
        if idom == a {
            return true;
        }
        current = idom;
    }
    false
}
