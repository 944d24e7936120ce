//! Solver statistics.

/// Counters for the work performed by the solver.
#[derive(Copy, Clone, Default, Debug)]
pub struct Stats {
    /// Number of decisions made.
    pub decisions: u64,
    /// Number of trail entries processed by the propagator.
    pub propagations: u64,
    /// Number of conflicts found.
    pub conflicts: u64,
    /// Number of learnt clauses added to the clause database.
    pub learnt_clauses: u64,
    /// Number of learnt clauses that were unit and directly asserted.
    pub learnt_units: u64,
}
