//! Decision heuristics.

use partial_ref::{partial, PartialRef};

use hornet_formula::{Lit, Var};

use crate::context::{AssignmentP, Context, ImplGraphP, StatsP, TrailP};
use crate::prop::{enqueue_assignment, Reason};

/// Make a decision and enqueue it.
///
/// This scans for the first unassigned variable and decides its negative literal. Decisions
/// are only made when propagation is at a fixed point.
///
/// Returns `false` if no decision was made because all variables are assigned.
pub fn make_decision(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut StatsP, mut TrailP),
) -> bool {
    debug_assert!(ctx.part(TrailP).fully_propagated());

    if let Some(index) = ctx
        .part(AssignmentP)
        .assignment()
        .iter()
        .position(|value| value.is_none())
    {
        let decision_var = Var::from_index(index);

        let decision = Lit::negative(decision_var);

        ctx.part_mut(TrailP).new_decision_level();
        ctx.part_mut(StatsP).decisions += 1;

        enqueue_assignment(ctx.borrow(), decision, Reason::Unit);

        true
    } else {
        false
    }
}
