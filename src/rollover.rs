//! Year Rollover (C7): promotes residents to next year's PGY level, retires
//! graduates, carries forward cumulative-category credit, and tops up each
//! cohort with placeholder interns to its planning target. Pure data
//! transformation — no I/O, no process-wide state.

use std::collections::HashMap;

use thiserror::Error;
use tracing::info;

use crate::catalogue::Category;
use crate::cohort::CohortDefinition;
use crate::requirement::Completion;
use crate::resident::{Pgy, Resident};
use crate::sync::Tally;
use crate::Id;

/// A cohort may hold at most this many residents (any PGY) at once (spec
/// §4.7, grounded on `MAX_COHORT_SIZE` in
/// `webapp/backend/routers/rollover.py`).
const MAX_COHORT_SIZE: usize = 12;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RolloverError {
    #[error("cohort {cohort_id} target intern count {target} is not even")]
    OddCohortTarget { cohort_id: Id, target: usize },
    #[error("cohort {cohort_id} would hold {total} residents, over the cap of {MAX_COHORT_SIZE}")]
    OversizeCohort { cohort_id: Id, total: usize },
}

/// Categories carried forward across years toward a graduation minimum
/// (spec §3); everything else resets at rollover.
const CUMULATIVE_CATEGORIES: [Category; 5] = [Category::Cardio, Category::Neuro, Category::Geriatrics, Category::Id, Category::Ed];

#[derive(Debug, Clone)]
pub struct RolloverInput {
    pub residents: Vec<Resident>,
    pub cohorts: Vec<CohortDefinition>,
    pub tallies: HashMap<Id, Tally>,
    pub prior_completions: HashMap<Id, HashMap<Category, u32>>,
    /// When true, a PGY3 may be retained as a chief resident instead of
    /// graduating. Off by default.
    pub include_pgy3_chief_coverage: bool,
    /// Placeholder TY residents to create, unattached to any cohort.
    pub incoming_ty_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RolloverOutput {
    pub residents: Vec<Resident>,
    pub completions: Vec<Completion>,
    pub graduated: Vec<Id>,
}

fn promote(pgy: Pgy) -> Option<Pgy> {
    match pgy {
        Pgy::Pgy1 => Some(Pgy::Pgy2),
        Pgy::Pgy2 => Some(Pgy::Pgy3),
        Pgy::Pgy3 => None,
        Pgy::Ty => None,
    }
}

/// Runs one year's rollover.
pub fn rollover(input: RolloverInput) -> Result<RolloverOutput, RolloverError> {
    for cohort in &input.cohorts {
        if cohort.target_intern_count % 2 != 0 {
            return Err(RolloverError::OddCohortTarget {
                cohort_id: cohort.cohort_id.clone(),
                target: cohort.target_intern_count,
            });
        }
    }

    let mut output = RolloverOutput::default();

    for resident in &input.residents {
        let carried: HashMap<Category, u32> = CUMULATIVE_CATEGORIES
            .into_iter()
            .map(|category| {
                let prior = input.prior_completions.get(&resident.id).and_then(|m| m.get(&category)).copied().unwrap_or(0);
                let this_year = input.tallies.get(&resident.id).and_then(|t| t.get(&category)).copied().unwrap_or(0);
                (category, prior + this_year)
            })
            .collect();

        let next_pgy = promote(resident.pgy);
        let retained_as_chief = resident.pgy == Pgy::Pgy3 && input.include_pgy3_chief_coverage;

        if next_pgy.is_none() && !retained_as_chief {
            output.graduated.push(resident.id.clone());
            continue;
        }

        let mut promoted = resident.clone();
        promoted.pgy = next_pgy.unwrap_or(Pgy::Pgy3);
        promoted.is_placeholder = false;
        output.residents.push(promoted);

        for (category, weeks_done) in carried {
            if weeks_done > 0 {
                output.completions.push(Completion {
                    resident_id: resident.id.clone(),
                    category,
                    weeks_done,
                });
            }
        }
    }

    // Every promoted resident keeps the cohort_id it carried in, regardless
    // of its new PGY level, so cohort occupancy is counted across all PGYs.
    let mut cohort_sizes: HashMap<Id, usize> = HashMap::new();
    for resident in &output.residents {
        if let Some(cid) = &resident.cohort_id {
            *cohort_sizes.entry(cid.clone()).or_insert(0) += 1;
        }
    }

    for cohort in &input.cohorts {
        let current = cohort_sizes.get(&cohort.cohort_id).copied().unwrap_or(0);
        let total = current + cohort.target_intern_count;
        if total > MAX_COHORT_SIZE {
            return Err(RolloverError::OversizeCohort { cohort_id: cohort.cohort_id.clone(), total });
        }
        for _ in current..cohort.target_intern_count {
            let placeholder = Resident {
                id: crate::generate_id(),
                name: String::new(),
                pgy: Pgy::Pgy1,
                track: None,
                cohort_id: Some(cohort.cohort_id.clone()),
                overrides: Default::default(),
                is_placeholder: true,
                prior_resident_id: None,
            };
            output.residents.push(placeholder);
        }
    }

    for _ in 0..input.incoming_ty_count {
        let placeholder = Resident {
            id: crate::generate_id(),
            name: String::new(),
            pgy: Pgy::Ty,
            track: None,
            cohort_id: None,
            overrides: Default::default(),
            is_placeholder: true,
            prior_resident_id: None,
        };
        output.residents.push(placeholder);
    }

    info!(
        graduated = output.graduated.len(),
        promoted = output.residents.iter().filter(|r| !r.is_placeholder).count(),
        placeholders = output.residents.iter().filter(|r| r.is_placeholder).count(),
        "rollover complete"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_cohort_target_is_rejected() {
        let input = RolloverInput {
            residents: vec![],
            cohorts: vec![CohortDefinition {
                cohort_id: "c1".into(),
                clinic_weeks: vec![],
                target_intern_count: 3,
            }],
            tallies: HashMap::new(),
            prior_completions: HashMap::new(),
            include_pgy3_chief_coverage: false,
            incoming_ty_count: 0,
        };
        assert!(matches!(rollover(input), Err(RolloverError::OddCohortTarget { .. })));
    }

    #[test]
    fn pgy3_graduates_by_default() {
        let r = Resident::new("r1", "Alice", Pgy::Pgy3);
        let input = RolloverInput {
            residents: vec![r],
            cohorts: vec![],
            tallies: HashMap::new(),
            prior_completions: HashMap::new(),
            include_pgy3_chief_coverage: false,
            incoming_ty_count: 0,
        };
        let out = rollover(input).unwrap();
        assert_eq!(out.graduated, vec!["r1".to_string()]);
        assert!(out.residents.is_empty());
    }

    #[test]
    fn ty_always_exits() {
        let r = Resident::new("t1", "Ty", Pgy::Ty);
        let input = RolloverInput {
            residents: vec![r],
            cohorts: vec![],
            tallies: HashMap::new(),
            prior_completions: HashMap::new(),
            include_pgy3_chief_coverage: false,
            incoming_ty_count: 0,
        };
        let out = rollover(input).unwrap();
        assert_eq!(out.graduated, vec!["t1".to_string()]);
    }

    #[test]
    fn pgy1_promotes_to_pgy2_and_carries_cumulative_credit() {
        let r = Resident::new("r1", "Bob", Pgy::Pgy1);
        let mut tallies = HashMap::new();
        let mut tally: Tally = HashMap::new();
        tally.insert(Category::Cardio, 3);
        tallies.insert("r1".to_string(), tally);

        let input = RolloverInput {
            residents: vec![r],
            cohorts: vec![],
            tallies,
            prior_completions: HashMap::new(),
            include_pgy3_chief_coverage: false,
            incoming_ty_count: 0,
        };
        let out = rollover(input).unwrap();
        assert_eq!(out.residents[0].pgy, Pgy::Pgy2);
        assert!(out.completions.iter().any(|c| c.category == Category::Cardio && c.weeks_done == 3));
    }

    #[test]
    fn cohort_topped_up_with_placeholders_to_even_target() {
        let input = RolloverInput {
            residents: vec![],
            cohorts: vec![CohortDefinition {
                cohort_id: "c1".into(),
                clinic_weeks: vec![],
                target_intern_count: 4,
            }],
            tallies: HashMap::new(),
            prior_completions: HashMap::new(),
            include_pgy3_chief_coverage: false,
            incoming_ty_count: 0,
        };
        let out = rollover(input).unwrap();
        assert_eq!(out.residents.len(), 4);
        assert!(out.residents.iter().all(|r| r.is_placeholder));
    }

    #[test]
    fn oversize_cohort_is_rejected() {
        let mut promoted = Resident::new("r1", "Carol", Pgy::Pgy2);
        promoted.cohort_id = Some("c1".into());
        let input = RolloverInput {
            residents: vec![promoted],
            cohorts: vec![CohortDefinition {
                cohort_id: "c1".into(),
                clinic_weeks: vec![],
                target_intern_count: 12,
            }],
            tallies: HashMap::new(),
            prior_completions: HashMap::new(),
            include_pgy3_chief_coverage: false,
            incoming_ty_count: 0,
        };
        assert!(matches!(rollover(input), Err(RolloverError::OversizeCohort { .. })));
    }

    #[test]
    fn incoming_ty_count_creates_uncohorted_placeholders() {
        let input = RolloverInput {
            residents: vec![],
            cohorts: vec![],
            tallies: HashMap::new(),
            prior_completions: HashMap::new(),
            include_pgy3_chief_coverage: false,
            incoming_ty_count: 3,
        };
        let out = rollover(input).unwrap();
        assert_eq!(out.residents.len(), 3);
        assert!(out.residents.iter().all(|r| r.is_placeholder && r.pgy == Pgy::Ty && r.cohort_id.is_none()));
    }
}
