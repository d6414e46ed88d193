//! residency-scheduler — a constraint-based yearly residency master scheduling engine.
//!
//! Produces an assignment of every resident to exactly one rotation code for
//! each of 52 weeks, satisfying hard coverage, education, and wellness
//! constraints while optimising soft preferences. The engine is synchronous:
//! one solve per call, blocking until the underlying CP-SAT search
//! terminates (see [`search`]).
//!
//! Pipeline: [`context`] assembles a [`context::SolveContext`] from external
//! data, [`model`] declares the decision variables and constraints over it,
//! [`search`] runs the solver, [`validate`] independently re-checks the
//! result, and [`sync`] projects it back into category tallies.

pub mod assignment;
pub mod catalogue;
pub mod cohort;
pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod requirement;
pub mod resident;
pub mod rollover;
pub mod search;
pub mod sync;
pub mod vacation;
pub mod validate;

pub use error::EngineError;

/// Identifier type used for residents, cohorts, and other scheduling entities.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

/// Number of weeks in a scheduling year.
pub const WEEK_COUNT: u32 = 52;

/// The two designated holiday weeks.
pub const HOLIDAY_WEEKS: [u32; 2] = [26, 27];

/// Runs the full engine pipeline for one scheduling year: builds the context,
/// compiles the decision model, searches for a solution, independently
/// re-validates it, and projects it into per-resident category tallies.
///
/// This is the single external entry point (spec §6); everything else in
/// this crate is reachable from here but may also be driven directly by a
/// caller that wants to inspect an intermediate stage (e.g. a dry-run
/// feasibility check against [`context::SolveContext`] alone).
pub fn solve_year(
    inputs: context::ContextInputs,
    search_params: search::SearchParams,
) -> Result<(assignment::Assignment, std::collections::HashMap<Id, sync::Tally>), EngineError> {
    let ctx = context::build(inputs)?;
    let built = model::build(&ctx);
    let assignment = search::solve(built, &ctx, &search_params)?;

    let violations = validate::validate(&assignment, &ctx);
    if !violations.is_empty() {
        return Err(EngineError::PostValidationFailure { violations });
    }

    let tallies = sync::project(&assignment, &ctx);
    Ok((assignment, tallies))
}
