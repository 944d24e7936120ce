//! The implication graph.
use partial_ref::{partial, PartialRef};

use hornet_formula::lit::LitIdx;
use hornet_formula::{Lit, Var};

use crate::clause::ClauseRef;
use crate::context::{ClauseAllocP, Context};

/// Cause of an assignment.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Reason {
    /// The assignment has no antecedent clause. Decisions and assignments forced by unit
    /// clauses are recorded this way.
    Unit,
    /// The assignment was forced by a stored clause. The propagated literal is in position 0
    /// of that clause.
    Clause(ClauseRef),
}

impl Reason {
    /// The literals that were false when the propagation happened.
    ///
    /// Empty for assignments without an antecedent clause.
    pub fn lits<'a>(&self, ctx: &'a partial!('a Context, ClauseAllocP)) -> &'a [Lit] {
        match self {
            Reason::Unit => &[],
            Reason::Clause(cref) => &ctx.part(ClauseAllocP).clause(*cref).lits()[1..],
        }
    }
}

/// Propagation that resulted in a conflict.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Conflict {
    /// The clause all of whose literals are false.
    pub cref: ClauseRef,
}

impl Conflict {
    /// The literals of the conflicting clause.
    pub fn lits<'a>(&self, ctx: &'a partial!('a Context, ClauseAllocP)) -> &'a [Lit] {
        ctx.part(ClauseAllocP).clause(self.cref).lits()
    }
}

/// Node and incoming edges of the implication graph.
#[derive(Copy, Clone)]
pub struct ImplNode {
    pub reason: Reason,
    pub level: LitIdx,
}

/// The implication graph.
///
/// This is a DAG having all assigned variables as nodes. Its sources are unit clauses and
/// decisions. For each propagated assignment it has incoming edges from the assignments that
/// caused the propagation to happen.
#[derive(Default)]
pub struct ImplGraph {
    /// Contains only valid data for indices of assigned variables.
    pub nodes: Vec<ImplNode>,
}

impl ImplGraph {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.nodes.resize(
            count,
            ImplNode {
                reason: Reason::Unit,
                level: 0,
            },
        );
    }

    /// The reason for an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn reason(&self, var: Var) -> &Reason {
        &self.nodes[var.index()].reason
    }

    /// The decision level of an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn level(&self, var: Var) -> usize {
        self.nodes[var.index()].level as usize
    }
}
