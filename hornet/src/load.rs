//! Loading a formula into the solver.
use partial_ref::{partial, PartialRef};

use hornet_formula::Lit;

use crate::clause::{db, ClauseHeader};
use crate::context::{
    AssignmentP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, SolverStateP, TmpDataP, TrailP,
    WatchlistsP,
};
use crate::prop::{backtrack, enqueue_assignment, Reason};
use crate::state::SatState;

/// Adds a clause to the current formula.
///
/// Removes duplicated literals, ignores tautological clauses (eg. x v -x v y), handles empty
/// clauses and dispatches between unit clauses and stored clauses.
///
/// Does not adjust the solver's variable count. If necessary that has to be done before
/// calling this.
pub fn load_clause(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lits: &[Lit],
) {
    match ctx.part(SolverStateP).sat_state {
        SatState::Unsat => return,
        SatState::Sat => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Unknown;
        }
        SatState::Unknown => {}
    }

    // Undo all decisions when the user adds new clauses. The simplifications below rely on the
    // remaining assignments being at level 0.
    if ctx.part(TrailP).current_level() > 0 {
        backtrack(ctx.borrow(), 0);
    }

    let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);

    tmp_data.lits.clear();
    tmp_data.lits.extend_from_slice(lits);
    let lits = &mut tmp_data.lits;
    let simplified_lits = &mut tmp_data.lits_2;

    lits.sort_unstable();
    lits.dedup();

    // Detect tautological clauses
    let mut last = None;

    for &lit in lits.iter() {
        if last == Some(!lit) {
            return;
        }
        last = Some(lit);
    }

    // Remove false literals and drop satisfied clauses
    simplified_lits.clear();

    for &lit in lits.iter() {
        match ctx.part(AssignmentP).lit_value(lit) {
            Some(true) => return,
            Some(false) => (),
            None => {
                simplified_lits.push(lit);
            }
        }
    }

    match simplified_lits[..] {
        [] => ctx.part_mut(SolverStateP).sat_state = SatState::Unsat,
        [lit] => enqueue_assignment(ctx.borrow(), lit, Reason::Unit),
        _ => {
            let header = ClauseHeader::new();

            db::add_clause(ctx.borrow(), header, simplified_lits);
        }
    }
}
