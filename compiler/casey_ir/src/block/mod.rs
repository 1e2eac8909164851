//! The per-function control-flow block graph.
//!
//! Blocks are stored in an arena; wiring is an explicit edge list
//! (`from`/`from_side` → `to`/`to_side`) instead of the side-keyed nested
//! maps of the document format, which keeps reachability and dominance
//! computations plain graph algorithms.
//!
//! Arity rules enforced at construction time:
//! - Start, Call, Assignment, Input, Output: at most one outgoing edge
//! - Decision: at most two outgoing edges, one per side
//! - End: no outgoing edges
//!
//! The remaining invariants (exactly one Start, reachability, *minimum*
//! outgoing counts) are whole-graph properties checked by
//! `casey_structure::validate`.

use std::fmt;
use std::ops::{Index, IndexMut};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::item::ItemId;
use crate::stmt::Expr;

/// Stable identifier of a block within one [`BlockGraph`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BlockId(u32);

impl BlockId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn from_index(index: usize) -> Self {
        BlockId(index as u32)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

/// The kind of a control-flow block.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BlockKind {
    Start,
    End,
    Decision,
    Call,
    Assignment,
    Input,
    Output,
}

impl BlockKind {
    /// Parse a document `blocktype` field.
    pub fn parse(text: &str) -> Option<BlockKind> {
        Some(match text.trim().to_ascii_uppercase().as_str() {
            "START" => BlockKind::Start,
            "END" => BlockKind::End,
            "DECISION" => BlockKind::Decision,
            "CALL" => BlockKind::Call,
            "ASSIGNMENT" => BlockKind::Assignment,
            "INPUT" => BlockKind::Input,
            "OUTPUT" => BlockKind::Output,
            _ => return None,
        })
    }

    pub fn as_document_str(self) -> &'static str {
        match self {
            BlockKind::Start => "START",
            BlockKind::End => "END",
            BlockKind::Decision => "DECISION",
            BlockKind::Call => "CALL",
            BlockKind::Assignment => "ASSIGNMENT",
            BlockKind::Input => "INPUT",
            BlockKind::Output => "OUTPUT",
        }
    }

    /// Exact number of outgoing edges this kind must end up with.
    pub fn required_outgoing(self) -> usize {
        match self {
            BlockKind::End => 0,
            BlockKind::Decision => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_document_str().to_ascii_lowercase())
    }
}

/// One of the four compass connection ports of a block.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub fn parse(text: &str) -> Option<Side> {
        Some(match text.trim().to_ascii_uppercase().as_str() {
            "TOP" => Side::Top,
            "BOTTOM" => Side::Bottom,
            "LEFT" => Side::Left,
            "RIGHT" => Side::Right,
            _ => return None,
        })
    }

    pub fn as_document_str(self) -> &'static str {
        match self {
            Side::Top => "TOP",
            Side::Bottom => "BOTTOM",
            Side::Left => "LEFT",
            Side::Right => "RIGHT",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_document_str().to_ascii_lowercase())
    }
}

/// A directed connection between two block ports.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub from: BlockId,
    pub from_side: Side,
    pub to: BlockId,
    pub to_side: Side,
}

/// Statement and variable binding carried by a block.
///
/// Which parts are present depends on the kind: Decision/Call/Output carry a
/// statement, Assignment a statement and a variable, Input a variable, End
/// an optional return statement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockContent {
    pub statement: Option<Expr>,
    pub variable: Option<ItemId>,
}

/// A control-flow block.
///
/// `uid` is the opaque stable identifier from the document (a UUID string);
/// it is kept verbatim for round-trips and error messages. `editor_pos` is
/// the editor-only coordinate pair, preserved but never interpreted.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub uid: String,
    pub kind: BlockKind,
    pub content: Option<BlockContent>,
    pub editor_pos: Option<(f64, f64)>,
}

/// Error raised while wiring or validating a block graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphError {
    DuplicateBlockId { uid: String },
    UnknownBlock { uid: String },
    SideOccupied { uid: String, side: Side },
    TooManyOutgoing { uid: String, kind: BlockKind },
    MissingStart,
    MultipleStart { count: usize },
    StartHasIncoming { uid: String },
    Unreachable { uid: String },
    MissingOutgoing { uid: String, kind: BlockKind, found: usize },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::DuplicateBlockId { uid } => {
                write!(f, "duplicate block id `{uid}`")
            }
            GraphError::UnknownBlock { uid } => {
                write!(f, "connection references unknown block `{uid}`")
            }
            GraphError::SideOccupied { uid, side } => {
                write!(f, "the {side} side of block `{uid}` is already connected")
            }
            GraphError::TooManyOutgoing { uid, kind } => {
                write!(f, "{kind} block `{uid}` allows at most {} outgoing connection(s)", kind.required_outgoing())
            }
            GraphError::MissingStart => write!(f, "function graph has no start block"),
            GraphError::MultipleStart { count } => {
                write!(f, "function graph has {count} start blocks, expected exactly one")
            }
            GraphError::StartHasIncoming { uid } => {
                write!(f, "start block `{uid}` has incoming connections")
            }
            GraphError::Unreachable { uid } => {
                write!(f, "block `{uid}` is not reachable from the start block")
            }
            GraphError::MissingOutgoing { uid, kind, found } => {
                write!(
                    f,
                    "{kind} block `{uid}` has {found} outgoing connection(s), expected {}",
                    kind.required_outgoing()
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// A function body: blocks plus an ordered edge list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BlockGraph {
    blocks: Vec<Block>,
    edges: Vec<Edge>,
    uid_index: FxHashMap<String, BlockId>,
}

impl BlockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block. Uids must be unique within the graph.
    pub fn add_block(&mut self, kind: BlockKind, uid: impl Into<String>) -> Result<BlockId, GraphError> {
        let uid = uid.into();
        if self.uid_index.contains_key(&uid) {
            return Err(GraphError::DuplicateBlockId { uid });
        }
        let id = BlockId::from_index(self.blocks.len());
        self.uid_index.insert(uid.clone(), id);
        self.blocks.push(Block {
            uid,
            kind,
            content: None,
            editor_pos: None,
        });
        Ok(id)
    }

    /// Wire an edge. Fails if the source side is taken or the source kind
    /// has no outgoing capacity left.
    pub fn connect(
        &mut self,
        from: BlockId,
        from_side: Side,
        to: BlockId,
        to_side: Side,
    ) -> Result<(), GraphError> {
        let block = &self[from];
        let outgoing = self.outgoing(from);
        let side_occupied = outgoing.iter().any(|e| e.from_side == from_side);
        let outgoing_len = outgoing.len();
        drop(outgoing);
        if side_occupied {
            return Err(GraphError::SideOccupied {
                uid: block.uid.clone(),
                side: from_side,
            });
        }
        if outgoing_len >= block.kind.required_outgoing() {
            return Err(GraphError::TooManyOutgoing {
                uid: block.uid.clone(),
                kind: block.kind,
            });
        }
        self.edges.push(Edge {
            from,
            from_side,
            to,
            to_side,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.blocks.len()).map(BlockId::from_index)
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (BlockId::from_index(index), block))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn by_uid(&self, uid: &str) -> Option<BlockId> {
        self.uid_index.get(uid).copied()
    }

    /// Outgoing edges of a block, in wiring order.
    pub fn outgoing(&self, id: BlockId) -> SmallVec<[&Edge; 2]> {
        self.edges.iter().filter(|e| e.from == id).collect()
    }

    /// Incoming edges of a block, in wiring order.
    pub fn incoming(&self, id: BlockId) -> SmallVec<[&Edge; 2]> {
        self.edges.iter().filter(|e| e.to == id).collect()
    }

    /// The single Start block, if exactly one exists.
    pub fn start(&self) -> Option<BlockId> {
        let mut starts = self
            .blocks()
            .filter(|(_, b)| b.kind == BlockKind::Start)
            .map(|(id, _)| id);
        let first = starts.next()?;
        if starts.next().is_some() {
            return None;
        }
        Some(first)
    }

    /// The unique successor of a single-exit block.
    pub fn next_of(&self, id: BlockId) -> Option<BlockId> {
        self.outgoing(id).first().map(|e| e.to)
    }

    /// The (true, false) successors of a Decision block.
    ///
    /// The edge leaving the Right side is the true branch and the Left side
    /// the false branch (the editor's convention). If a Decision uses
    /// neither Right nor Left, the first-wired edge is the true branch.
    /// Deterministic, so serialization round-trips preserve the choice.
    pub fn decision_branches(&self, id: BlockId) -> Option<(BlockId, BlockId)> {
        let outgoing = self.outgoing(id);
        if outgoing.len() != 2 {
            return None;
        }
        let right = outgoing.iter().find(|e| e.from_side == Side::Right);
        let left = outgoing.iter().find(|e| e.from_side == Side::Left);
        match (right, left) {
            (Some(t), Some(u)) => Some((t.to, u.to)),
            (Some(t), None) => {
                let other = outgoing.iter().find(|e| e.from_side != Side::Right)?;
                Some((t.to, other.to))
            }
            (None, Some(u)) => {
                let other = outgoing.iter().find(|e| e.from_side != Side::Left)?;
                Some((other.to, u.to))
            }
            (None, None) => Some((outgoing[0].to, outgoing[1].to)),
        }
    }
}

impl Index<BlockId> for BlockGraph {
    type Output = Block;

    fn index(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }
}

impl IndexMut<BlockId> for BlockGraph {
    fn index_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.index()]
    }
}
