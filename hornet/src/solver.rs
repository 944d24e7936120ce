//! Boolean satisfiability solver.
use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use log::info;

use hornet_formula::{CnfFormula, ExtendFormula, Lit, Var};

use crate::cdcl::conflict_step;
use crate::context::{
    ensure_var_count, AssignmentP, ClauseDbP, Context, SolverStateP, StatsP, TrailP,
};
use crate::load::load_clause;
use crate::state::SatState;
use crate::stats::Stats;

/// A boolean satisfiability solver.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Create a new solver with slots for the given number of variables.
    ///
    /// Clauses over variables with larger indices can still be added and grow the variable
    /// count.
    pub fn with_var_count(count: usize) -> Solver {
        let mut solver = Solver::default();
        {
            let mut ctx = solver.ctx.into_partial_ref_mut();
            ensure_var_count(ctx.borrow(), count);
        }
        solver
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        ensure_var_count(ctx.borrow(), formula.var_count());
        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }
    }

    /// Check the satisfiability of the current formula.
    ///
    /// Returns `Some(true)` when the formula is satisfiable and `Some(false)` when it is not.
    /// `None` is reserved for configurations that bound the work performed, which the current
    /// solver has none of.
    pub fn solve(&mut self) -> Option<bool> {
        let mut ctx = self.ctx.into_partial_ref_mut();

        while ctx.part(SolverStateP).sat_state == SatState::Unknown {
            let stats = ctx.part(StatsP);
            if stats.conflicts > 0 && stats.conflicts % 5000 == 0 {
                let db = ctx.part(ClauseDbP);
                let units = ctx.part(TrailP).top_level_trail_length();
                info!(
                    "confl: {}k vars: {} irred: {} learnt: {}",
                    stats.conflicts / 1000,
                    ctx.part(AssignmentP).assignment().len() - units,
                    db.irred_count(),
                    db.learnt_count(),
                );
            }
            conflict_step(ctx.borrow());
        }

        let result = match ctx.part(SolverStateP).sat_state {
            SatState::Unknown => None,
            SatState::Sat => Some(true),
            SatState::Unsat => Some(false),
        };

        let stats = ctx.part(StatsP);
        info!(
            "{} after {} conflicts, {} decisions and {} propagations",
            match result {
                Some(true) => "SAT",
                Some(false) => "UNSAT",
                None => "UNKNOWN",
            },
            stats.conflicts,
            stats.decisions,
            stats.propagations,
        );

        result
    }

    /// Set of literals that satisfy the formula.
    ///
    /// Contains one literal for every variable of the solver. Variables the search never had
    /// to assign default to false.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        if ctx.part(SolverStateP).sat_state == SatState::Sat {
            Some(
                ctx.part(AssignmentP)
                    .assignment()
                    .iter()
                    .enumerate()
                    .map(|(index, value)| {
                        Lit::from_var(Var::from_index(index), value.unwrap_or(false))
                    })
                    .collect(),
            )
        } else {
            None
        }
    }

    /// Counters for the work performed so far.
    pub fn stats(&self) -> Stats {
        let ctx = self.ctx.into_partial_ref();
        *ctx.part(StatsP)
    }
}

impl ExtendFormula for Solver {
    fn add_clause(&mut self, literals: &[Lit]) {
        let mut ctx = self.ctx.into_partial_ref_mut();
        if let Some(index) = literals.iter().map(|&lit| lit.index()).max() {
            ensure_var_count(ctx.borrow(), index + 1);
        }
        load_clause(ctx.borrow(), literals);
    }
}
