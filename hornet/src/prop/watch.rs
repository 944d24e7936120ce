//! Watchlists to detect clauses that became unit or false.
//!
//! Each stored clause has two watches pointing to it, kept in the watchlists of the negations
//! of two different literals of the clause. Whenever the watches move to different literals
//! the literals of the clause are permuted so that the watched ones are in position 0 and 1.
//!
//! While a clause is not unit under the current assignment, its watched literals are two
//! non-false literals. When a clause is unit and thus propagating, the true literal is watched
//! and in position 0, the other watched literal is one with the largest decision level and is
//! kept in position 1. When a clause becomes satisfied before becoming unit the watches can
//! stay where they are.
//!
//! Assigning a literal to false can invalidate that invariant for the clauses watching it.
//! Scanning the watchlist of the assigned literal finds all affected clauses, and moving the
//! watches restores the invariant unless a clause has no two non-false literals left. Such a
//! clause is either unit, in which case its remaining literal is propagated, or a conflict.
//! Nothing has to be done on backtracking, as unassigning variables cannot invalidate the
//! invariant.
//!
//! See [Section 4.5.1 of the "Handbook of Satisfiability"][handbook-ch4] for more details and
//! references.
//!
//! Each watch also stores a blocking literal, i.e. some literal of the clause different from
//! the watched one. When the blocking literal is true the clause is satisfied and the watch
//! can be skipped without accessing the clause database. This variant was introduced by
//! [Niklas Sörensson and Niklas Eén in "MINISAT 2.1 and MINISAT++ 1.0 — SAT Race 2008
//! Editions"][minisat-2.1].
//!
//! [handbook-ch4]: https://www.satassociation.org/articles/FAIA185-0131.pdf
//! [minisat-2.1]: https://www.cril.univ-artois.fr/SAT09/solvers/booklet.pdf

use hornet_formula::Lit;

use crate::clause::ClauseRef;

/// A watch on a stored clause.
#[derive(Copy, Clone)]
pub struct Watch {
    /// Clause which has the referring lit in position 0 or 1.
    pub cref: ClauseRef,
    /// A lit of the clause, different from the referring lit.
    pub blocking: Lit,
}

/// Watchlists to detect clauses that became unit or false.
#[derive(Default)]
pub struct Watchlists {
    /// Watches indexed by the literal that invalidates them when it becomes true.
    watches: Vec<Vec<Watch>>,
}

impl Watchlists {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.watches.resize(count * 2, vec![]);
    }

    /// Start watching a clause.
    ///
    /// `lits` have to be the first two literals of the given clause.
    pub fn watch_clause(&mut self, cref: ClauseRef, lits: [Lit; 2]) {
        for i in 0..2 {
            let watch = Watch {
                cref,
                blocking: lits[i ^ 1],
            };
            self.watches[(!lits[i]).code()].push(watch);
        }
    }

    /// Return watches for a given literal.
    pub fn watched_by(&self, lit: Lit) -> &[Watch] {
        &self.watches[lit.code()]
    }

    /// Return mutable watches for a given literal.
    pub fn watched_by_mut(&mut self, lit: Lit) -> &mut Vec<Watch> {
        &mut self.watches[lit.code()]
    }

    /// Make a literal watch a clause.
    pub fn add_watch(&mut self, lit: Lit, watch: Watch) {
        self.watches[lit.code()].push(watch)
    }
}
