//! Partial assignment and assignment trail.
use partial_ref::{partial, PartialRef};

use hornet_formula::lit::LitIdx;
use hornet_formula::{Lit, Var};

use crate::context::{AssignmentP, Context, ImplGraphP, TrailP};

use super::Reason;

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Option<bool>>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, None);
    }

    /// Current assignment indexed by variable.
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    /// Value of a literal under the current assignment, if any.
    pub fn lit_value(&self, lit: Lit) -> Option<bool> {
        self.assignment[lit.index()].map(|b| b ^ lit.is_negative())
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_positive())
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.assignment[lit.index()] == Some(lit.is_negative())
    }

    pub fn lit_is_unk(&self, lit: Lit) -> bool {
        self.assignment[lit.index()].is_none()
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = lit.is_positive().into()
    }

    pub fn unassign_var(&mut self, var: Var) {
        self.assignment[var.index()] = None;
    }
}

/// Decision and propagation history.
#[derive(Default)]
pub struct Trail {
    /// Stack of all propagated and all enqueued assignments
    trail: Vec<Lit>,
    /// Next assignment in trail to propagate
    queue_head_pos: usize,
    /// Decision level boundaries as trail lengths.
    decisions: Vec<LitIdx>,
}

impl Trail {
    /// Return the next assigned literal to propagate and advance the queue.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        let head = self.trail.get(self.queue_head_pos).cloned();
        if head.is_some() {
            self.queue_head_pos += 1;
        }
        head
    }

    /// Whether every trail entry was handed to the propagator.
    pub fn fully_propagated(&self) -> bool {
        self.queue_head_pos == self.trail.len()
    }

    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Open up a new decision level.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len() as LitIdx)
    }

    /// Current decision level.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }

    /// Number of assignments at decision level 0.
    pub fn top_level_trail_length(&self) -> usize {
        self.decisions
            .first()
            .map(|&len| len as usize)
            .unwrap_or_else(|| self.trail.len())
    }
}

/// Enqueues the assignment of true to a literal.
///
/// This updates the assignment and trail, but does not perform any propagation. The literal
/// has to be unassigned when calling this.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP),
    lit: Lit,
    reason: Reason,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == None);

    assignment.assign_lit(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    trail.trail.push(lit);

    let node = &mut ctx.part_mut(ImplGraphP).nodes[lit.index()];
    node.reason = reason;
    node.level = trail.decisions.len() as LitIdx;
}

/// Undo all assignments in decision levels above the given level.
///
/// The propagation queue head is set to the remaining trail length, so no remaining
/// assignment is propagated again.
pub fn backtrack(mut ctx: partial!(Context, mut AssignmentP, mut TrailP), level: usize) {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let assignment = ctx.part_mut(AssignmentP);

    debug_assert!(level <= trail.decisions.len());

    if level == trail.decisions.len() {
        return;
    }

    let new_trail_len = trail.decisions[level] as usize;

    for &lit in trail.trail[new_trail_len..].iter() {
        assignment.unassign_var(lit.var());
    }

    trail.trail.truncate(new_trail_len);
    trail.decisions.truncate(level);
    trail.queue_head_pos = new_trail_len;
}
