//! Context Builder (C2) — assembles the immutable [`SolveContext`] handed to
//! the decision model from external-store data.

mod error;
pub use error::ContextError;

use std::collections::HashMap;

use tracing::{info, warn};

use crate::cohort::{CohortDefinition, MAX_COHORT_SIZE};
use crate::config::SolverConfig;
use crate::requirement::{Completion, Requirement};
use crate::resident::Resident;
use crate::vacation::{BlockOption, VacationRequest};
use crate::{catalogue::Category, Id};

/// Key into `requirements_by_pgy_track`: PGY label (`"PGY1"`, `"TY"`, ...) and
/// an optional track name. The track-specific row overrides the un-tracked
/// default when both are present (spec §4.2).
pub type RequirementKey = (String, Option<String>);

/// Raw inputs to context building, mirroring the engine input boundary (spec §6).
#[derive(Debug, Clone, Default)]
pub struct ContextInputs {
    pub residents: Vec<Resident>,
    pub requirements_by_pgy_track: HashMap<RequirementKey, Vec<Requirement>>,
    pub completions: Vec<Completion>,
    pub vacation_requests: Vec<VacationRequest>,
    pub cohort_defs: Vec<CohortDefinition>,
    pub config: SolverConfig,
    pub random_seed: Option<i64>,
}

/// The filtered vacation-block options for one resident (H2): the A-option
/// and B-option candidate start weeks, already excluding holiday-adjacent starts.
#[derive(Debug, Clone, Default)]
pub struct VacationOptions {
    pub block_a: Vec<BlockOption>,
    pub block_b: Vec<BlockOption>,
    pub hard_lock: Option<Vec<u32>>,
}

/// The immutable solver input assembled by the context builder.
#[derive(Debug, Clone)]
pub struct SolveContext {
    pub residents: Vec<Resident>,
    /// Indices into `residents` for seniors (PGY2/PGY3).
    pub senior_idx: Vec<usize>,
    /// Indices into `residents` for interns (PGY1/TY).
    pub intern_idx: Vec<usize>,
    /// Indices into `residents` for TY residents (subset of `intern_idx`).
    pub ty_idx: Vec<usize>,
    /// For each cohort, intern indices paired two-by-two in sorted order.
    pub co_intern_pairs: Vec<(usize, usize)>,
    pub requirements_by_pgy_track: HashMap<RequirementKey, Vec<Requirement>>,
    pub completions_by_resident: HashMap<Id, HashMap<Category, u32>>,
    pub vacation_options: HashMap<Id, VacationOptions>,
    pub cohort_defs: HashMap<Id, CohortDefinition>,
    pub config: SolverConfig,
    pub week_count: u32,
    pub random_seed: Option<i64>,
}

impl SolveContext {
    /// Looks up the requirement list for a resident, preferring the
    /// track-specific row over the un-tracked default.
    pub fn requirements_for(&self, resident: &Resident) -> &[Requirement] {
        let pgy = resident.pgy_label().to_string();
        if let Some(track) = resident.track {
            let track_name = format!("{:?}", track).to_lowercase();
            if let Some(reqs) = self.requirements_by_pgy_track.get(&(pgy.clone(), Some(track_name))) {
                return reqs;
            }
        }
        self.requirements_by_pgy_track
            .get(&(pgy, None))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn resident_index(&self, id: &str) -> Option<usize> {
        self.residents.iter().position(|r| r.id == id)
    }
}

/// Builds an immutable [`SolveContext`] from raw inputs, per spec §4.2.
pub fn build(inputs: ContextInputs) -> Result<SolveContext, ContextError> {
    let ContextInputs {
        residents,
        requirements_by_pgy_track,
        completions,
        vacation_requests,
        cohort_defs,
        config,
        random_seed,
    } = inputs;

    let mut seen_ids = std::collections::HashSet::new();
    for r in &residents {
        if !seen_ids.insert(r.id.clone()) {
            return Err(ContextError::DuplicateResidentId(r.id.clone()));
        }
    }

    let cohort_ids: std::collections::HashSet<&Id> = cohort_defs.iter().map(|c| &c.cohort_id).collect();
    for r in &residents {
        if let Some(cid) = &r.cohort_id {
            if !cohort_ids.contains(cid) {
                return Err(ContextError::UnknownCohortReference {
                    resident_id: r.id.clone(),
                    cohort_id: cid.clone(),
                });
            }
        }
    }

    for r in &residents {
        let pgy = r.pgy_label().to_string();
        let track_name = r.track.map(|t| format!("{:?}", t).to_lowercase());
        let has_track_row = track_name
            .as_ref()
            .is_some_and(|t| requirements_by_pgy_track.contains_key(&(pgy.clone(), Some(t.clone()))));
        let has_default_row = requirements_by_pgy_track.contains_key(&(pgy.clone(), None));
        if !has_track_row && !has_default_row {
            return Err(ContextError::MissingRequirements {
                resident_id: r.id.clone(),
                pgy_label: pgy,
                track: track_name,
            });
        }
    }

    let mut senior_idx = Vec::new();
    let mut intern_idx = Vec::new();
    let mut ty_idx = Vec::new();
    for (i, r) in residents.iter().enumerate() {
        if r.is_senior() {
            senior_idx.push(i);
        } else {
            intern_idx.push(i);
        }
        if r.is_ty() {
            ty_idx.push(i);
        }
    }

    // Group interns by cohort, in roster order, and pair them two-by-two.
    let mut cohort_interns: HashMap<Id, Vec<usize>> = HashMap::new();
    for &i in &intern_idx {
        if let Some(cid) = &residents[i].cohort_id {
            cohort_interns.entry(cid.clone()).or_default().push(i);
        }
    }

    // Cohort size cap applies to every member (seniors + interns), not just interns.
    let mut cohort_sizes: HashMap<Id, usize> = HashMap::new();
    for r in &residents {
        if let Some(cid) = &r.cohort_id {
            *cohort_sizes.entry(cid.clone()).or_insert(0) += 1;
        }
    }
    for (cid, size) in &cohort_sizes {
        if *size > MAX_COHORT_SIZE {
            return Err(ContextError::CohortOversized {
                cohort_id: cid.clone(),
                size: *size,
                max: MAX_COHORT_SIZE,
            });
        }
    }

    let mut co_intern_pairs = Vec::new();
    for (cid, mut idxs) in cohort_interns {
        idxs.sort_unstable();
        if idxs.len() % 2 != 0 {
            return Err(ContextError::OddCohortInternCount {
                cohort_id: cid,
                count: idxs.len(),
            });
        }
        for chunk in idxs.chunks_exact(2) {
            co_intern_pairs.push((chunk[0], chunk[1]));
        }
    }
    co_intern_pairs.sort_unstable();

    let mut completions_by_resident: HashMap<Id, HashMap<Category, u32>> = HashMap::new();
    for c in completions {
        *completions_by_resident
            .entry(c.resident_id.clone())
            .or_default()
            .entry(c.category)
            .or_insert(0) += c.weeks_done;
    }

    let mut vacation_options: HashMap<Id, VacationOptions> = HashMap::new();
    for vreq in vacation_requests {
        let opts = VacationOptions {
            block_a: VacationRequest::valid_block_options(&vreq.block_a_options),
            block_b: VacationRequest::valid_block_options(&vreq.block_b_options),
            hard_lock: vreq.hard_lock.map(|weeks| {
                weeks
                    .into_iter()
                    .filter(|w| !config.holiday_weeks.contains(w))
                    .collect()
            }),
        };
        vacation_options.insert(vreq.resident_id, opts);
    }

    let cohort_defs_by_id: HashMap<Id, CohortDefinition> = cohort_defs
        .into_iter()
        .map(|mut c| {
            c.clinic_weeks.retain(|w| !config.holiday_weeks.contains(w));
            (c.cohort_id.clone(), c)
        })
        .collect();

    info!(
        residents = residents.len(),
        seniors = senior_idx.len(),
        interns = intern_idx.len(),
        tys = ty_idx.len(),
        co_intern_pairs = co_intern_pairs.len(),
        "context built"
    );
    if config.relax_vacation_blocks || config.relax_geriatrics_coverage {
        warn!(
            relax_vacation_blocks = config.relax_vacation_blocks,
            relax_geriatrics_coverage = config.relax_geriatrics_coverage,
            "operator relaxation flags active"
        );
    }

    Ok(SolveContext {
        residents,
        senior_idx,
        intern_idx,
        ty_idx,
        co_intern_pairs,
        requirements_by_pgy_track,
        completions_by_resident,
        vacation_options,
        cohort_defs: cohort_defs_by_id,
        config,
        week_count: crate::WEEK_COUNT,
        random_seed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resident::{Pgy, Resident};

    fn intern(id: &str, cohort: &str) -> Resident {
        let mut r = Resident::new(id, id, Pgy::Pgy1);
        r.cohort_id = Some(cohort.into());
        r
    }

    /// Minimal requirement rows for the given PGY labels, just enough to pass
    /// the `MissingRequirements` check without constraining anything else.
    fn requirement_rows(pgys: &[&str]) -> HashMap<RequirementKey, Vec<Requirement>> {
        pgys.iter()
            .map(|&pgy| {
                (
                    (pgy.to_string(), None),
                    vec![Requirement { category: Category::Floors, required_weeks: 1 }],
                )
            })
            .collect()
    }

    #[test]
    fn odd_intern_cohort_raises_context_error() {
        let residents = vec![intern("i1", "c1"), intern("i2", "c1"), intern("i3", "c1")];
        let inputs = ContextInputs {
            residents,
            requirements_by_pgy_track: requirement_rows(&["PGY1"]),
            cohort_defs: vec![CohortDefinition {
                cohort_id: "c1".into(),
                clinic_weeks: vec![],
                target_intern_count: 2,
            }],
            ..Default::default()
        };
        let err = build(inputs).unwrap_err();
        assert!(matches!(err, ContextError::OddCohortInternCount { .. }));
    }

    #[test]
    fn even_intern_cohort_pairs_in_sorted_order() {
        let residents = vec![intern("i1", "c1"), intern("i2", "c1"), intern("i3", "c1"), intern("i4", "c1")];
        let inputs = ContextInputs {
            residents,
            requirements_by_pgy_track: requirement_rows(&["PGY1"]),
            cohort_defs: vec![CohortDefinition {
                cohort_id: "c1".into(),
                clinic_weeks: vec![],
                target_intern_count: 2,
            }],
            ..Default::default()
        };
        let ctx = build(inputs).unwrap();
        assert_eq!(ctx.co_intern_pairs, vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn cohort_oversize_raises_context_error() {
        let residents: Vec<_> = (0..13).map(|i| intern(&format!("i{i}"), "c1")).collect();
        let inputs = ContextInputs {
            residents,
            requirements_by_pgy_track: requirement_rows(&["PGY1"]),
            cohort_defs: vec![CohortDefinition {
                cohort_id: "c1".into(),
                clinic_weeks: vec![],
                target_intern_count: 2,
            }],
            ..Default::default()
        };
        let err = build(inputs).unwrap_err();
        assert!(matches!(err, ContextError::CohortOversized { .. }));
    }

    #[test]
    fn unknown_cohort_reference_raises_context_error() {
        let residents = vec![intern("i1", "ghost")];
        let inputs = ContextInputs {
            residents,
            ..Default::default()
        };
        let err = build(inputs).unwrap_err();
        assert!(matches!(err, ContextError::UnknownCohortReference { .. }));
    }

    #[test]
    fn senior_and_intern_indices_are_disjoint_and_cover_all() {
        let mut residents = vec![intern("i1", "c1"), intern("i2", "c1")];
        residents.push(Resident::new("s1", "Senior", Pgy::Pgy2));
        let inputs = ContextInputs {
            residents,
            requirements_by_pgy_track: requirement_rows(&["PGY1", "PGY2"]),
            cohort_defs: vec![CohortDefinition {
                cohort_id: "c1".into(),
                clinic_weeks: vec![],
                target_intern_count: 2,
            }],
            ..Default::default()
        };
        let ctx = build(inputs).unwrap();
        assert_eq!(ctx.senior_idx.len() + ctx.intern_idx.len(), ctx.residents.len());
        let mut all: Vec<_> = ctx.senior_idx.iter().chain(ctx.intern_idx.iter()).collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), ctx.residents.len());
    }

    #[test]
    fn resident_with_no_matching_requirement_row_raises_context_error() {
        let residents = vec![Resident::new("r1", "R1", Pgy::Pgy1)];
        let inputs = ContextInputs {
            residents,
            requirements_by_pgy_track: HashMap::new(),
            ..Default::default()
        };
        let err = build(inputs).unwrap_err();
        assert!(matches!(err, ContextError::MissingRequirements { .. }));
    }

    #[test]
    fn vacation_block_options_exclude_holiday_adjacent_starts() {
        let residents = vec![Resident::new("r1", "R1", Pgy::Pgy1)];
        let inputs = ContextInputs {
            residents,
            requirements_by_pgy_track: requirement_rows(&["PGY1"]),
            vacation_requests: vec![VacationRequest {
                resident_id: "r1".into(),
                block_a_options: vec![
                    crate::vacation::BlockOption { start_week: 10, priority: 1 },
                    crate::vacation::BlockOption { start_week: 26, priority: 2 },
                ],
                block_b_options: vec![],
                hard_lock: None,
            }],
            ..Default::default()
        };
        let ctx = build(inputs).unwrap();
        let opts = ctx.vacation_options.get("r1").unwrap();
        assert_eq!(opts.block_a.len(), 1);
        assert_eq!(opts.block_a[0].start_week, 10);
    }
}
