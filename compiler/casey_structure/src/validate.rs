//! Whole-graph validation of a function body.

use casey_diagnostic::{Diagnostic, ErrorCode, Origin};
use casey_ir::{BlockGraph, BlockKind, GraphError};
use rustc_hash::FxHashSet;

/// Check the whole-graph invariants of a block graph:
///
/// - exactly one Start block, with no incoming connections,
/// - every block reachable from Start,
/// - every block's outgoing-connection count matches its kind's arity.
///
/// All violations are accumulated and returned together.
pub fn validate(graph: &BlockGraph) -> Result<(), Vec<GraphError>> {
    let mut errors = Vec::new();

    let starts: Vec<_> = graph
        .blocks()
        .filter(|(_, b)| b.kind == BlockKind::Start)
        .map(|(id, _)| id)
        .collect();
    match starts.as_slice() {
        [] => errors.push(GraphError::MissingStart),
        [start] => {
            if !graph.incoming(*start).is_empty() {
                errors.push(GraphError::StartHasIncoming {
                    uid: graph[*start].uid.clone(),
                });
            }
        }
        multiple => errors.push(GraphError::MultipleStart {
            count: multiple.len(),
        }),
    }

    // Reachability only means something relative to a unique start.
    if let [start] = starts.as_slice() {
        let mut visited = FxHashSet::default();
        let mut queue = vec![*start];
        while let Some(id) = queue.pop() {
            if !visited.insert(id) {
                continue;
            }
            for edge in graph.outgoing(id) {
                queue.push(edge.to);
            }
        }
        for (id, block) in graph.blocks() {
            if !visited.contains(&id) {
                errors.push(GraphError::Unreachable {
                    uid: block.uid.clone(),
                });
            }
        }
    }

    for (id, block) in graph.blocks() {
        let found = graph.outgoing(id).len();
        if found != block.kind.required_outgoing() {
            errors.push(GraphError::MissingOutgoing {
                uid: block.uid.clone(),
                kind: block.kind,
                found,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Convert a graph error into a diagnostic anchored at the function.
pub fn graph_diagnostic(error: &GraphError, function_path: &str) -> Diagnostic {
    let (code, origin) = match error {
        GraphError::MissingStart => (ErrorCode::C1001, Origin::item(function_path)),
        GraphError::MultipleStart { .. } => (ErrorCode::C1002, Origin::item(function_path)),
        GraphError::StartHasIncoming { uid } => {
            (ErrorCode::C1003, Origin::block(function_path, uid.clone()))
        }
        GraphError::Unreachable { uid } => {
            (ErrorCode::C1004, Origin::block(function_path, uid.clone()))
        }
        GraphError::MissingOutgoing { uid, .. } => {
            (ErrorCode::C1005, Origin::block(function_path, uid.clone()))
        }
        GraphError::SideOccupied { uid, .. } | GraphError::TooManyOutgoing { uid, .. } => {
            (ErrorCode::C1006, Origin::block(function_path, uid.clone()))
        }
        GraphError::DuplicateBlockId { uid } | GraphError::UnknownBlock { uid } => {
            (ErrorCode::C0007, Origin::block(function_path, uid.clone()))
        }
    };
    Diagnostic::error(code)
        .with_message(error.to_string())
        .with_label(origin, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use casey_ir::Side;
    use pretty_assertions::assert_eq;

    fn block(graph: &mut BlockGraph, kind: BlockKind, uid: &str) -> casey_ir::BlockId {
        graph.add_block(kind, uid).unwrap_or_else(|e| panic!("{e}"))
    }

    fn wire(
        graph: &mut BlockGraph,
        from: casey_ir::BlockId,
        side: Side,
        to: casey_ir::BlockId,
    ) {
        graph
            .connect(from, side, to, Side::Top)
            .unwrap_or_else(|e| panic!("{e}"));
    }

    #[test]
    fn minimal_valid_graph() {
        let mut graph = BlockGraph::new();
        let start = block(&mut graph, BlockKind::Start, "s");
        let end = block(&mut graph, BlockKind::End, "e");
        wire(&mut graph, start, Side::Bottom, end);
        assert_eq!(validate(&graph), Ok(()));
    }

    #[test]
    fn empty_graph_is_missing_its_start() {
        let graph = BlockGraph::new();
        assert_eq!(validate(&graph), Err(vec![GraphError::MissingStart]));
    }

    #[test]
    fn two_starts_are_rejected() {
        let mut graph = BlockGraph::new();
        let a = block(&mut graph, BlockKind::Start, "a");
        let b = block(&mut graph, BlockKind::Start, "b");
        let end = block(&mut graph, BlockKind::End, "e");
        let end2 = block(&mut graph, BlockKind::End, "e2");
        wire(&mut graph, a, Side::Bottom, end);
        wire(&mut graph, b, Side::Bottom, end2);
        assert_eq!(
            validate(&graph),
            Err(vec![GraphError::MultipleStart { count: 2 }])
        );
    }

    #[test]
    fn start_with_incoming_edge_is_rejected() {
        let mut graph = BlockGraph::new();
        let start = block(&mut graph, BlockKind::Start, "s");
        let call = block(&mut graph, BlockKind::Call, "c");
        wire(&mut graph, start, Side::Bottom, call);
        wire(&mut graph, call, Side::Bottom, start);
        assert_eq!(
            validate(&graph),
            Err(vec![GraphError::StartHasIncoming { uid: "s".to_owned() }])
        );
    }

    #[test]
    fn unreachable_blocks_are_reported_individually() {
        let mut graph = BlockGraph::new();
        let start = block(&mut graph, BlockKind::Start, "s");
        let end = block(&mut graph, BlockKind::End, "e");
        wire(&mut graph, start, Side::Bottom, end);
        let stray = block(&mut graph, BlockKind::Output, "o");
        let stray_end = block(&mut graph, BlockKind::End, "oe");
        wire(&mut graph, stray, Side::Bottom, stray_end);
        assert_eq!(
            validate(&graph),
            Err(vec![
                GraphError::Unreachable { uid: "o".to_owned() },
                GraphError::Unreachable { uid: "oe".to_owned() },
            ])
        );
    }

    #[test]
    fn dangling_decision_side_is_reported() {
        let mut graph = BlockGraph::new();
        let start = block(&mut graph, BlockKind::Start, "s");
        let decision = block(&mut graph, BlockKind::Decision, "d");
        let end = block(&mut graph, BlockKind::End, "e");
        wire(&mut graph, start, Side::Bottom, decision);
        // Only the true side is wired.
        graph
            .connect(decision, Side::Right, end, Side::Top)
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            validate(&graph),
            Err(vec![GraphError::MissingOutgoing {
                uid: "d".to_owned(),
                kind: BlockKind::Decision,
                found: 1,
            }])
        );
    }

    #[test]
    fn errors_accumulate_rather_than_stopping_at_the_first() {
        let mut graph = BlockGraph::new();
        // No start at all, plus a dangling output block.
        let output = block(&mut graph, BlockKind::Output, "o");
        let _ = output;
        let errors = match validate(&graph) {
            Err(errors) => errors,
            Ok(()) => panic!("expected validation failure"),
        };
        assert!(errors.contains(&GraphError::MissingStart));
        assert!(errors.contains(&GraphError::MissingOutgoing {
            uid: "o".to_owned(),
            kind: BlockKind::Output,
            found: 0,
        }));
    }
}
