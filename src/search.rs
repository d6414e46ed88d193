//! Search Driver (C4): runs the CP-SAT search over a built model and decodes
//! its response into an [`Assignment`], or an [`EngineError`] describing why
//! none was produced.

use cp_sat::proto::{CpSolverStatus, SatParameters};
use tracing::{info, warn};

use crate::assignment::Assignment;
use crate::catalogue;
use crate::context::SolveContext;
use crate::model::BuiltModel;
use crate::EngineError;

/// Tunables for one search invocation, independent of the scheduling
/// domain (contrast with [`crate::config::SolverConfig`]).
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub num_search_workers: i32,
    pub max_time_in_seconds: f64,
    pub random_seed: Option<i64>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            num_search_workers: 4,
            max_time_in_seconds: 300.0,
            random_seed: None,
        }
    }
}

/// Resolves the configured time budget into the value CP-SAT expects: `0`
/// means "unbounded" (spec §4.4) and is left unset rather than passed
/// through as a literal zero-second budget.
fn resolve_time_limit(max_time_in_seconds: f64) -> Option<f64> {
    if max_time_in_seconds > 0.0 {
        Some(max_time_in_seconds)
    } else {
        None
    }
}

/// A hard-lock vacation window, surfaced on failure so a caller can explain
/// which residents' pinned requests made the problem infeasible.
fn hard_lock_conflicts(ctx: &SolveContext) -> Vec<String> {
    ctx.vacation_options
        .iter()
        .filter_map(|(resident_id, opts)| {
            opts.hard_lock.as_ref().map(|weeks| format!("{resident_id}: weeks {weeks:?}"))
        })
        .collect()
}

/// Runs the search and decodes the result.
pub fn solve(mut built: BuiltModel, ctx: &SolveContext, params: &SearchParams) -> Result<Assignment, EngineError> {
    let mut sat_params = SatParameters::default();
    sat_params.num_search_workers = Some(params.num_search_workers);
    sat_params.max_time_in_seconds = resolve_time_limit(params.max_time_in_seconds);
    if let Some(seed) = params.random_seed.or(ctx.random_seed) {
        sat_params.random_seed = Some(seed as i32);
    }

    info!(
        workers = params.num_search_workers,
        max_time_in_seconds = params.max_time_in_seconds,
        "starting search"
    );
    let response = built.model.solve_with_parameters(&sat_params);
    let status = response.status();

    match status {
        CpSolverStatus::Optimal | CpSolverStatus::Feasible => {
            let mut assignment = Assignment::new();
            for (r, resident) in ctx.residents.iter().enumerate() {
                for week in 1..=built.vars.weeks() {
                    let codes = catalogue::all();
                    let chosen = codes
                        .iter()
                        .enumerate()
                        .find(|(idx, _)| built.vars.var(r, week, catalogue::code_at(*idx)).solution_value(&response))
                        .map(|(idx, _)| catalogue::code_at(idx));
                    if let Some(code) = chosen {
                        assignment.set(resident.id.clone(), week, code);
                    }
                }
            }
            info!(status = ?status, "search completed with a solution");
            Ok(assignment)
        }
        CpSolverStatus::Infeasible => {
            warn!("search proved infeasibility");
            Err(EngineError::Infeasible {
                status: format!("{status:?}"),
                conflicts: hard_lock_conflicts(ctx),
            })
        }
        _ => {
            warn!(status = ?status, "search ended without a feasible solution");
            Err(EngineError::Timeout {
                conflicts: hard_lock_conflicts(ctx),
            })
        }
    }
}
