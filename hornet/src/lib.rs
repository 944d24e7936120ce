//! A conflict driven clause learning SAT solver.
//!
//! The solver decides satisfiability of formulas in conjunctive normal form. It implements the
//! baseline CDCL loop: two-watched-literal unit propagation, first-UIP conflict analysis and
//! non-chronological backtracking. Clause input and satisfiability queries go through the
//! [`Solver`](crate::solver::Solver) type.
pub mod solver;

mod analyze_conflict;
mod cdcl;
mod clause;
mod context;
mod decision;
mod load;
mod prop;
mod state;
mod stats;
mod tmp;

pub use hornet_formula::{CnfFormula, ExtendFormula, Lit, Var};

pub use crate::solver::Solver;
pub use crate::stats::Stats;
