//! Central solver data structure.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};

use crate::analyze_conflict::AnalyzeConflict;
use crate::clause::{ClauseAlloc, ClauseDb};
use crate::prop::{Assignment, ImplGraph, Trail, Watchlists};
use crate::state::SolverState;
use crate::stats::Stats;
use crate::tmp::TmpData;

/// Part declarations for the [`Context`] struct.
mod parts {
    use super::*;

    part!(pub AnalyzeConflictP: AnalyzeConflict);
    part!(pub AssignmentP: Assignment);
    part!(pub ClauseAllocP: ClauseAlloc);
    part!(pub ClauseDbP: ClauseDb);
    part!(pub ImplGraphP: ImplGraph);
    part!(pub SolverStateP: SolverState);
    part!(pub StatsP: Stats);
    part!(pub TmpDataP: TmpData);
    part!(pub TrailP: Trail);
    part!(pub WatchlistsP: Watchlists);
}

pub use parts::*;

/// Central solver data structure.
///
/// This struct contains all data kept by the solver. Functions that operate on multiple fields
/// of the context take partial references provided by the `partial_ref` crate. This documents
/// the data dependencies of each function and satisfies the borrow checker without passing
/// many individual references around.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part = "AnalyzeConflictP"]
    analyze_conflict: AnalyzeConflict,
    #[part = "AssignmentP"]
    assignment: Assignment,
    #[part = "ClauseAllocP"]
    clause_alloc: ClauseAlloc,
    #[part = "ClauseDbP"]
    clause_db: ClauseDb,
    #[part = "ImplGraphP"]
    impl_graph: ImplGraph,
    #[part = "SolverStateP"]
    solver_state: SolverState,
    #[part = "StatsP"]
    stats: Stats,
    #[part = "TmpDataP"]
    tmp_data: TmpData,
    #[part = "TrailP"]
    trail: Trail,
    #[part = "WatchlistsP"]
    watchlists: Watchlists,
}

/// Update structures for a new variable count.
pub fn set_var_count(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ImplGraphP,
        mut WatchlistsP,
    ),
    count: usize,
) {
    ctx.part_mut(AnalyzeConflictP).set_var_count(count);
    ctx.part_mut(AssignmentP).set_var_count(count);
    ctx.part_mut(ImplGraphP).set_var_count(count);
    ctx.part_mut(WatchlistsP).set_var_count(count);
}

/// Increase the variable count to at least the given value.
pub fn ensure_var_count(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ImplGraphP,
        mut WatchlistsP,
    ),
    count: usize,
) {
    if count > ctx.part(AssignmentP).assignment().len() {
        set_var_count(ctx.borrow(), count)
    }
}
