//! The structured statement IR produced by the structurer.

use casey_ir::{Expr, ItemId};

/// Name of a goto target in the fallback path.
pub type Label = String;

/// A structured statement.
///
/// `Goto`/`Labeled` only appear for graphs the if/loop recognizers could
/// not fully capture; backends without a goto equivalent reject them.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Seq(Vec<Stmt>),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Box<Stmt>,
    },
    Loop {
        cond: Expr,
        body: Box<Stmt>,
    },
    Action(Action),
    Return(Option<Expr>),
    Goto(Label),
    Labeled(Label, Box<Stmt>),
}

/// The straight-line payload of a non-branching block.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Output(Expr),
    Input(ItemId),
    Assign { target: ItemId, value: Expr },
    Call(Expr),
}

impl Stmt {
    /// Number of `Return` nodes in the tree.
    ///
    /// For a structured graph this equals the number of End blocks
    /// reachable from Start: no block is lost or duplicated.
    pub fn count_returns(&self) -> usize {
        match self {
            Stmt::Seq(stmts) => stmts.iter().map(Stmt::count_returns).sum(),
            Stmt::If { then, otherwise, .. } => {
                then.count_returns() + otherwise.count_returns()
            }
            Stmt::Loop { body, .. } => body.count_returns(),
            Stmt::Labeled(_, inner) => inner.count_returns(),
            Stmt::Return(_) => 1,
            Stmt::Action(_) | Stmt::Goto(_) => 0,
        }
    }

    /// Whether the tree contains a `Goto` or `Labeled` node.
    pub fn contains_goto(&self) -> bool {
        match self {
            Stmt::Seq(stmts) => stmts.iter().any(Stmt::contains_goto),
            Stmt::If { then, otherwise, .. } => {
                then.contains_goto() || otherwise.contains_goto()
            }
            Stmt::Loop { body, .. } => body.contains_goto(),
            Stmt::Labeled(..) | Stmt::Goto(_) => true,
            Stmt::Return(_) | Stmt::Action(_) => false,
        }
    }

    pub fn is_empty_seq(&self) -> bool {
        matches!(self, Stmt::Seq(stmts) if stmts.is_empty())
    }
}
