//! Database for stored clauses.
use partial_ref::{partial, PartialRef};

use hornet_formula::Lit;

use super::{ClauseHeader, ClauseRef};

use crate::context::{ClauseAllocP, ClauseDbP, Context, WatchlistsP};

/// Database for all stored clauses.
///
/// Every stored clause has at least two literals and is registered in exactly two watchlists.
/// Unit clauses are asserted on the trail instead of being stored and empty clauses make the
/// formula unsatisfiable when they are loaded. Clauses stay in the database for the lifetime
/// of the solver.
#[derive(Default)]
pub struct ClauseDb {
    pub(super) clauses: Vec<ClauseRef>,
    pub(super) irred_count: usize,
    pub(super) learnt_count: usize,
}

impl ClauseDb {
    /// The number of stored clauses of the original formula.
    pub fn irred_count(&self) -> usize {
        self.irred_count
    }

    /// The number of stored learnt clauses.
    pub fn learnt_count(&self) -> usize {
        self.learnt_count
    }
}

/// Add a clause to the database and start watching it.
///
/// The watches are put on the first two literals of the clause.
pub fn add_clause(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, mut WatchlistsP),
    header: ClauseHeader,
    lits: &[Lit],
) -> ClauseRef {
    let learnt = header.learnt();

    let cref = ctx.part_mut(ClauseAllocP).add_clause(header, lits);

    ctx.part_mut(WatchlistsP)
        .watch_clause(cref, [lits[0], lits[1]]);

    let db = ctx.part_mut(ClauseDbP);

    db.clauses.push(cref);
    if learnt {
        db.learnt_count += 1;
    } else {
        db.irred_count += 1;
    }

    cref
}

/// Iterator over all stored clauses.
pub fn clauses_iter<'a>(
    ctx: &'a partial!('a Context, ClauseDbP),
) -> impl Iterator<Item = ClauseRef> + 'a {
    ctx.part(ClauseDbP).clauses.iter().cloned()
}
