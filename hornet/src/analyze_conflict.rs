//! Learns a new clause by analyzing a conflict.
use std::mem::swap;

use partial_ref::{partial, split_borrow, PartialRef};

use hornet_formula::{Lit, Var};

use crate::context::{AnalyzeConflictP, ClauseAllocP, Context, ImplGraphP, TrailP};
use crate::prop::Conflict;

/// Temporaries for conflict analysis
#[derive(Default)]
pub struct AnalyzeConflict {
    /// This is the learnt clause after analysis finishes.
    clause: Vec<Lit>,
    /// Number of literals in the current clause at the current decision level.
    current_level_count: usize,
    /// Variables in the current clause.
    var_flags: Vec<bool>,
    /// Entries to clean in `var_flags`.
    to_clean: Vec<Var>,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_flags.resize(count, false);
    }

    /// The learnt clause.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }
}

/// Learns a new clause by analyzing a conflict.
///
/// This computes the first unique implication point of the conflict and returns the lowest
/// decision level at which the learnt clause is asserting. The asserting literal is placed in
/// position 0 of the learnt clause, a literal of the returned level in position 1. A conflict
/// without any decisions produces the empty clause.
pub fn analyze_conflict(
    mut ctx: partial!(Context, mut AnalyzeConflictP, ClauseAllocP, ImplGraphP, TrailP),
    conflict: Conflict,
) -> usize {
    split_borrow!(lit_ctx = &(ClauseAllocP) ctx);

    let (analyze, rest) = ctx.split_part_mut(AnalyzeConflictP);

    analyze.clause.clear();
    analyze.current_level_count = 0;

    if rest.part(TrailP).current_level() == 0 {
        // Conflict with no decisions, generate an empty clause
        return 0;
    }

    // We start with all the literals of the conflicting clause
    for &lit in conflict.lits(&lit_ctx) {
        add_literal(ctx.borrow(), lit);
    }

    debug_assert!(ctx.part(AnalyzeConflictP).current_level_count > 0);

    // To get rid of all but one literal of the current level, we resolve the clause with the
    // reason for those literals. The correct order for this is reverse chronological.

    let trail: Vec<Lit> = ctx.part(TrailP).trail().iter().rev().cloned().collect();

    for lit in trail {
        let (analyze, rest) = ctx.split_part_mut(AnalyzeConflictP);
        let lit_present = &mut analyze.var_flags[lit.index()];
        // Is the lit present in the current clause?
        if *lit_present {
            *lit_present = false;
            analyze.current_level_count -= 1;
            if analyze.current_level_count == 0 {
                // lit is the last literal of the current level present in the current clause,
                // therefore the resulting clause will assert !lit so we put it in position 0
                analyze.clause.push(!lit);
                let end = analyze.clause.len() - 1;
                analyze.clause.swap(0, end);

                break;
            } else {
                // We removed the literal and now add its reason.
                let reason = *rest.part(ImplGraphP).reason(lit.var());

                for &reason_lit in reason.lits(&lit_ctx) {
                    add_literal(ctx.borrow(), reason_lit);
                }
            }
        }
    }

    let (analyze, rest) = ctx.split_part_mut(AnalyzeConflictP);

    for var in analyze.to_clean.drain(..) {
        analyze.var_flags[var.index()] = false;
    }

    // We find the highest level literal besides the asserted literal and move it into position
    // 1. This is important to ensure the watchlist constraints are not violated on
    // backtracking.
    let mut backtrack_to = 0;

    if analyze.clause.len() > 1 {
        let (prefix, tail) = analyze.clause.split_at_mut(2);
        let lit_1 = &mut prefix[1];
        backtrack_to = rest.part(ImplGraphP).level(lit_1.var());
        for lit in tail.iter_mut() {
            let lit_level = rest.part(ImplGraphP).level(lit.var());
            if lit_level > backtrack_to {
                backtrack_to = lit_level;
                swap(lit_1, lit);
            }
        }
    }

    backtrack_to
}

/// Add a literal to the current clause.
fn add_literal(mut ctx: partial!(Context, mut AnalyzeConflictP, ImplGraphP, TrailP), lit: Lit) {
    let (analyze, ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let lit_level = ctx.part(ImplGraphP).level(lit.var());
    // No need to add literals that are set by unit clauses or already present
    if lit_level > 0 && !analyze.var_flags[lit.index()] {
        analyze.var_flags[lit.index()] = true;
        if lit_level == ctx.part(TrailP).current_level() {
            analyze.current_level_count += 1;
        } else {
            analyze.clause.push(lit);
            analyze.to_clean.push(lit.var());
        }
    }
}
