//! Decision Model (C3): compiles a [`SolveContext`] into a `cp_sat`
//! constraint-programming model — decision variables, hard constraints, and
//! a weighted soft-constraint objective.

pub mod hard;
pub mod soft;
mod variables;

pub use variables::Variables;

use cp_sat::builder::CpModelBuilder;
use tracing::info;

use crate::context::SolveContext;

/// A fully built model ready to hand to the search driver, plus the
/// variables needed to decode a solver response back into an [`crate::assignment::Assignment`].
pub struct BuiltModel {
    pub model: CpModelBuilder,
    pub vars: Variables,
}

/// Builds the complete model for `ctx`: one-hot assignment variables, every
/// hard constraint, and the weighted objective.
pub fn build(ctx: &SolveContext) -> BuiltModel {
    let mut model = CpModelBuilder::new();
    let mut vars = Variables::build(&mut model, ctx);

    let vacation_choices = hard::apply(&mut model, &vars, ctx);
    let objective = soft::objective(&mut model, &mut vars, ctx, &vacation_choices);
    model.minimize(objective);

    info!(residents = ctx.residents.len(), weeks = ctx.week_count, "decision model built");
    BuiltModel { model, vars }
}
