//! Unit propagation.
use std::mem::replace;

use partial_ref::{partial, PartialRef};

use vec_mut_scan::VecMutScan;

use hornet_formula::Lit;

use crate::context::{
    AssignmentP, ClauseAllocP, Context, ImplGraphP, StatsP, TrailP, WatchlistsP,
};

pub mod assignment;
pub mod graph;
pub mod watch;

pub use assignment::{backtrack, enqueue_assignment, Assignment, Trail};
pub use graph::{Conflict, ImplGraph, ImplNode, Reason};
pub use watch::{Watch, Watchlists};

/// Propagate enqueued assignments.
///
/// Returns when all enqueued assignments are propagated, including newly propagated
/// assignments, or when there is a conflict.
///
/// On conflict the clause that has all its literals assigned false is returned.
pub fn propagate(
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
    while let Some(lit) = ctx.part_mut(TrailP).pop_queue() {
        ctx.part_mut(StatsP).propagations += 1;
        propagate_watches(ctx.borrow(), lit)?;
    }
    Ok(())
}

/// Propagate all clauses watched by the given literal.
///
/// On conflict return the clause propagating the conflicting assignment.
///
/// See [`watch`](crate::prop::watch) for the invariants that this has to uphold.
#[inline(never)]
fn propagate_watches(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut TrailP,
        mut WatchlistsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    // Temporarily move the watches out of the watchlists struct, so we are free to add watches
    // to other lists during propagation.
    let mut watches = replace(ctx.part_mut(WatchlistsP).watched_by_mut(lit), vec![]);

    let mut scan = VecMutScan::new(&mut watches);

    let mut result = Ok(());

    'watches: while let Some(watch) = scan.next() {
        // If the blocking literal (which is part of the watched clause) is already true, the
        // watched clause is satisfied and we don't even have to look at it.
        if ctx.part(AssignmentP).lit_is_true(watch.blocking) {
            continue;
        }

        let cref = watch.cref;

        let (alloc, mut rest_ctx) = ctx.split_part_mut(ClauseAllocP);

        let clause = alloc.clause_mut(cref);

        let lits = clause.lits_mut();

        // First we ensure that the literal we're currently propagating is at index 1. This
        // prepares the literal order for further propagations, as the propagating literal has
        // to be at index 0. Doing this here also avoids a similar check later should the
        // clause be satisfied by a non-watched literal, as we can just move it to index 1.
        let mut first = lits[0];
        if first == !lit {
            lits.swap(0, 1);
            first = lits[0];
        }

        // We create a new watch with the other watched literal as blocking literal. This will
        // either replace the currently processed watch or be added to another literal's watch
        // list.
        let new_watch = Watch {
            cref,
            blocking: first,
        };

        // If the other watched literal (now the first) isn't the blocking literal, check
        // whether that one is true. If so nothing else needs to be done.
        if first != watch.blocking && rest_ctx.part(AssignmentP).lit_is_true(first) {
            watch.replace(new_watch);
            continue;
        }

        // At this point we try to find a non-false unwatched literal to replace our current
        // literal as the watched literal.
        let (initial, rest) = lits.split_at_mut(2);

        for rest_lit_ref in rest.iter_mut() {
            let rest_lit = *rest_lit_ref;
            if !rest_ctx.part(AssignmentP).lit_is_false(rest_lit) {
                // We found a non-false literal and make it a watched literal by reordering the
                // literals and adding the watch to the corresponding watchlist.
                initial[1] = rest_lit;
                *rest_lit_ref = !lit;
                rest_ctx.part_mut(WatchlistsP).add_watch(!rest_lit, new_watch);
                watch.remove();
                continue 'watches;
            }
        }

        // We didn't find a non-false unwatched literal, so either we're propagating or we have
        // a conflict.
        watch.replace(new_watch);

        // If the other watched literal is false we have a conflict.
        if rest_ctx.part(AssignmentP).lit_is_false(first) {
            result = Err(Conflict { cref });
            break;
        }

        // Otherwise we enqueue a new propagation.
        enqueue_assignment(rest_ctx.borrow(), first, Reason::Clause(cref));
    }

    // This keeps all unprocessed watches in the current watchlist.
    drop(scan);

    *ctx.part_mut(WatchlistsP).watched_by_mut(lit) = watches;

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use proptest::{prelude::*, *};

    use rand::{distributions::Bernoulli, seq::SliceRandom, Rng};

    use partial_ref::IntoPartialRefMut;

    use hornet_formula::{cnf::strategy::*, CnfFormula, Lit};

    use crate::clause::{db, ClauseRef};
    use crate::context::{set_var_count, ClauseDbP, Context, SolverStateP};
    use crate::load::load_clause;
    use crate::state::SatState;

    /// Generate a random formula and a list of literals implied by it.
    pub fn prop_formula(
        vars: impl Strategy<Value = usize>,
        extra_vars: impl Strategy<Value = usize>,
        extra_clauses: impl Strategy<Value = usize>,
        density: impl Strategy<Value = f64>,
    ) -> impl Strategy<Value = (Vec<Lit>, CnfFormula)> {
        (vars, extra_vars, extra_clauses, density).prop_flat_map(
            |(vars, extra_vars, extra_clauses, density)| {
                let polarities = collection::vec(bool::ANY, vars + extra_vars);

                let dist = Bernoulli::new(density);

                let lits = polarities
                    .prop_map(|polarities| {
                        polarities
                            .into_iter()
                            .enumerate()
                            .map(|(index, polarity)| Lit::from_index(index, polarity))
                            .collect::<Vec<_>>()
                    })
                    .prop_shuffle();

                lits.prop_perturb(move |mut lits, mut rng| {
                    let assigned_lits = &lits[..vars];

                    let mut clauses: Vec<Vec<Lit>> = vec![];
                    for (i, &lit) in assigned_lits.iter().enumerate() {
                        // Build a clause that implies lit
                        let mut clause = vec![lit];
                        for &reason_lit in assigned_lits[..i].iter() {
                            if rng.sample(dist) {
                                clause.push(!reason_lit);
                            }
                        }
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }

                    for _ in 0..extra_clauses {
                        // Build a clause that is satisfied
                        let &true_lit = assigned_lits.choose(&mut rng).unwrap();
                        let mut clause = vec![true_lit];
                        for &other_lit in lits.iter() {
                            if other_lit != true_lit && rng.sample(dist) {
                                clause.push(other_lit ^ rng.gen::<bool>());
                            }
                        }
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }

                    clauses.shuffle(&mut rng);

                    // Only return implied lits
                    lits.truncate(vars);

                    (lits, CnfFormula::from(clauses))
                })
            },
        )
    }

    /// Check that every stored clause is watched exactly at the negations of its first two
    /// literals and that every watch's blocking literal is another literal of its clause.
    pub fn check_watch_invariants(
        mut ctx: partial!(Context, AssignmentP, ClauseAllocP, ClauseDbP, WatchlistsP),
    ) {
        let crefs: Vec<_> = db::clauses_iter(&ctx.borrow()).collect();

        let alloc = ctx.part(ClauseAllocP);
        let watchlists = ctx.part(WatchlistsP);
        let var_count = ctx.part(AssignmentP).assignment().len();

        let mut watched_at: HashMap<ClauseRef, Vec<Lit>> = HashMap::new();

        for code in 0..var_count * 2 {
            let lit = Lit::from_code(code);
            for watch in watchlists.watched_by(lit).iter() {
                let lits = alloc.clause(watch.cref).lits();
                // The entry in lit's list watches for !lit becoming false.
                assert!(lits[..2].contains(&!lit));
                assert!(lits.contains(&watch.blocking));
                assert_ne!(watch.blocking, !lit);
                watched_at.entry(watch.cref).or_default().push(lit);
            }
        }

        for &cref in crefs.iter() {
            let lits = alloc.clause(cref).lits();
            let locations = watched_at.remove(&cref).unwrap_or_default();
            assert_eq!(locations.len(), 2);
            assert!(locations.contains(&!lits[0]));
            assert!(locations.contains(&!lits[1]));
        }

        assert!(watched_at.is_empty());
    }

    /// Check that no stored clause is unit or falsified under the current assignment.
    pub fn check_clauses_at_fixpoint(
        mut ctx: partial!(Context, AssignmentP, ClauseAllocP, ClauseDbP),
    ) {
        let crefs: Vec<_> = db::clauses_iter(&ctx.borrow()).collect();

        let alloc = ctx.part(ClauseAllocP);
        let assignment = ctx.part(AssignmentP);

        for cref in crefs {
            let lits = alloc.clause(cref).lits();
            if lits.iter().any(|&lit| assignment.lit_is_true(lit)) {
                continue;
            }
            let non_false = lits
                .iter()
                .filter(|&&lit| !assignment.lit_is_false(lit))
                .count();
            assert!(non_false >= 2);
        }
    }

    /// Check that every propagated literal is in position 0 of its reason clause and that the
    /// remaining literals of the reason are false and earlier on the trail.
    pub fn check_reasons(
        mut ctx: partial!(Context, AssignmentP, ClauseAllocP, ImplGraphP, TrailP),
    ) {
        let trail = ctx.part(TrailP).trail();
        let graph = ctx.part(ImplGraphP);
        let alloc = ctx.part(ClauseAllocP);
        let assignment = ctx.part(AssignmentP);

        let mut trail_position = HashMap::new();
        for (position, &lit) in trail.iter().enumerate() {
            trail_position.insert(lit.var(), position);
        }

        for (position, &lit) in trail.iter().enumerate() {
            if let Reason::Clause(cref) = *graph.reason(lit.var()) {
                let lits = alloc.clause(cref).lits();
                assert_eq!(lits[0], lit);
                for &other_lit in lits[1..].iter() {
                    assert!(assignment.lit_is_false(other_lit));
                    assert!(trail_position[&other_lit.var()] < position);
                }
            }
        }
    }

    proptest! {
        #[test]
        fn propagation_no_conflict(
            (mut lits, formula) in prop_formula(
                2..30usize,
                0..10usize,
                0..20usize,
                0.1..0.9
            ),
        ) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

            let prop_result = propagate(ctx.borrow());

            prop_assert_eq!(prop_result, Ok(()));

            lits.sort();

            let mut prop_lits = ctx.part(TrailP).trail().to_owned();

            prop_lits.sort();

            prop_assert_eq!(prop_lits, lits);

            check_watch_invariants(ctx.borrow());
            check_clauses_at_fixpoint(ctx.borrow());
            check_reasons(ctx.borrow());

            // A second propagation without new assignments is a no-op.
            let trail_len = ctx.part(TrailP).trail().len();

            prop_assert_eq!(propagate(ctx.borrow()), Ok(()));
            prop_assert_eq!(ctx.part(TrailP).trail().len(), trail_len);
        }

        #[test]
        fn propagation_conflict(
            (lits, formula) in prop_formula(
                2..30usize,
                0..10usize,
                0..20usize,
                0.1..0.9
            ),
            conflict_size in any::<sample::Index>(),
        ) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            // The conflict clause is added first, so it cannot be simplified away using
            // assignments enqueued while loading the rest of the formula.

            let conflict_size = conflict_size.index(lits.len() - 1) + 2;

            let conflict_clause: Vec<_> = lits[..conflict_size].iter().map(|&lit| !lit).collect();

            load_clause(ctx.borrow(), &conflict_clause);

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unknown);

            let prop_result = propagate(ctx.borrow());

            prop_assert!(prop_result.is_err());

            let conflict = prop_result.unwrap_err();

            let conflict_lits = conflict.lits(&ctx.borrow()).to_owned();

            for &lit in conflict_lits.iter() {
                prop_assert!(ctx.part(AssignmentP).lit_is_false(lit));
            }

            check_watch_invariants(ctx.borrow());
        }
    }
}
