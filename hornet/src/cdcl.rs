//! Conflict driven clause learning.

use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::{db, ClauseHeader};
use crate::context::{
    AnalyzeConflictP, AssignmentP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, SolverStateP,
    StatsP, TrailP, WatchlistsP,
};
use crate::decision::make_decision;
use crate::prop::{backtrack, enqueue_assignment, propagate, Conflict, Reason};
use crate::state::SatState;

/// Find a conflict, learn a clause and backtrack.
///
/// When no conflict can be found anymore the solver state is set to SAT, when a conflict
/// without decisions is found it is set to UNSAT.
pub fn conflict_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut StatsP,
        mut TrailP,
        mut WatchlistsP,
    ),
) {
    let conflict = find_conflict(ctx.borrow());

    let conflict = match conflict {
        Ok(()) => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
            return;
        }
        Err(conflict) => conflict,
    };

    ctx.part_mut(StatsP).conflicts += 1;

    let backtrack_to = analyze_conflict(ctx.borrow(), conflict);

    backtrack(ctx.borrow(), backtrack_to);

    let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);
    let clause = analyze.clause();

    let reason = match clause.len() {
        0 => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
            return;
        }
        1 => {
            ctx.part_mut(StatsP).learnt_units += 1;
            Reason::Unit
        }
        _ => {
            let mut header = ClauseHeader::new();
            header.set_learnt(true);

            let cref = db::add_clause(ctx.borrow(), header, clause);
            ctx.part_mut(StatsP).learnt_clauses += 1;
            Reason::Clause(cref)
        }
    };

    enqueue_assignment(ctx.borrow(), clause[0], reason);
}

/// Find a conflict.
///
/// Returns `Err` if a conflict was found and `Ok` if a satisfying assignment was found
/// instead.
pub fn find_conflict(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut StatsP,
        mut TrailP,
        mut WatchlistsP,
    ),
) -> Result<(), Conflict> {
    loop {
        propagate(ctx.borrow())?;

        if !make_decision(ctx.borrow()) {
            return Ok(());
        }
    }
}
