//! End-to-end scenario tests (spec §8): drive the full pipeline through
//! `solve_year` against realistic rosters and check the universal
//! invariants on the assignment that comes back.

use std::collections::HashMap;

use residency_scheduler::catalogue::{Category, RotationCode};
use residency_scheduler::cohort::CohortDefinition;
use residency_scheduler::context::ContextInputs;
use residency_scheduler::requirement::Requirement;
use residency_scheduler::resident::{Pgy, Resident, Track};
use residency_scheduler::search::SearchParams;
use residency_scheduler::vacation::{BlockOption, VacationRequest};
use residency_scheduler::{solve_year, HOLIDAY_WEEKS, WEEK_COUNT};

/// Standard annual requirement rows shared by every scenario below: modest
/// enough that they never compete with the exact weekly coverage counts for
/// the same residents.
fn standard_requirements() -> HashMap<(String, Option<String>), Vec<Requirement>> {
    let mut reqs = HashMap::new();
    reqs.insert(
        ("PGY1".to_string(), None),
        vec![
            Requirement { category: Category::Floors, required_weeks: 20 },
            Requirement { category: Category::Icu, required_weeks: 4 },
            Requirement { category: Category::Clinic, required_weeks: 11 },
        ],
    );
    reqs.insert(
        ("PGY2".to_string(), None),
        vec![
            Requirement { category: Category::Floors, required_weeks: 16 },
            Requirement { category: Category::Icu, required_weeks: 8 },
            Requirement { category: Category::Clinic, required_weeks: 4 },
        ],
    );
    reqs.insert(
        ("PGY3".to_string(), None),
        vec![
            Requirement { category: Category::Floors, required_weeks: 8 },
            Requirement { category: Category::Cardio, required_weeks: 4 },
            Requirement { category: Category::Neuro, required_weeks: 2 },
            Requirement { category: Category::Id, required_weeks: 4 },
            Requirement { category: Category::Geriatrics, required_weeks: 2 },
            Requirement { category: Category::Ed, required_weeks: 4 },
        ],
    );
    reqs.insert(
        ("TY".to_string(), None),
        vec![
            Requirement { category: Category::Floors, required_weeks: 24 },
            Requirement { category: Category::Icu, required_weeks: 4 },
        ],
    );
    reqs
}

/// Builds a roster with exactly enough seniors and interns to staff every
/// hard weekly coverage slot (9 seniors, 13 interns) plus spare interns for
/// clinic, distributed across cohorts with even intern counts; the
/// remainder (if any) is left uncohorted, per the "optional cohort" design
/// note (spec §4.2 boundary case (b)).
fn minimal_feasible_roster() -> (Vec<Resident>, Vec<CohortDefinition>) {
    let mut residents = Vec::new();
    for i in 0..9 {
        residents.push(Resident::new(format!("sr{i}"), format!("Senior {i}"), Pgy::Pgy2));
    }

    let cohort_sizes = [6, 6, 6, 6, 4];
    let mut cohort_defs = Vec::new();
    let mut intern_counter = 0;
    for (c, &size) in cohort_sizes.iter().enumerate() {
        let cohort_id = format!("cohort{c}");
        for _ in 0..size {
            let mut r = Resident::new(format!("in{intern_counter}"), format!("Intern {intern_counter}"), Pgy::Pgy1);
            r.cohort_id = Some(cohort_id.clone());
            residents.push(r);
            intern_counter += 1;
        }
        cohort_defs.push(CohortDefinition {
            cohort_id,
            clinic_weeks: vec![],
            target_intern_count: size,
        });
    }
    // One uncohorted intern rounds the roster to 29 interns total.
    residents.push(Resident::new(format!("in{intern_counter}"), format!("Intern {intern_counter}"), Pgy::Pgy1));

    (residents, cohort_defs)
}

#[test]
fn scenario_minimal_feasible_roster_solves_and_respects_universal_invariants() {
    let (residents, cohort_defs) = minimal_feasible_roster();
    assert_eq!(residents.iter().filter(|r| r.is_senior()).count(), 9);
    assert_eq!(residents.iter().filter(|r| r.is_intern()).count(), 29);

    let inputs = ContextInputs {
        residents,
        requirements_by_pgy_track: standard_requirements(),
        completions: vec![],
        vacation_requests: vec![],
        cohort_defs,
        config: Default::default(),
        random_seed: Some(42),
    };

    let search_params = SearchParams {
        random_seed: Some(42),
        ..Default::default()
    };

    let (assignment, _tallies) = solve_year(inputs, search_params).expect("minimal roster must solve");

    for resident_id in assignment.resident_ids() {
        let vacation_weeks = assignment.count_weeks_in(resident_id, &[RotationCode::Vacation]);
        assert_eq!(vacation_weeks, 4, "{resident_id} must have exactly 4 vacation weeks");
        for &hw in &HOLIDAY_WEEKS {
            assert_ne!(
                assignment.get(resident_id, hw),
                Some(RotationCode::Vacation),
                "{resident_id} must not be on vacation during holiday week {hw}"
            );
        }
        for week in 1..=WEEK_COUNT {
            if !HOLIDAY_WEEKS.contains(&week) {
                assert_ne!(
                    assignment.get(resident_id, week),
                    Some(RotationCode::IcuH),
                    "ICU_H must appear only in holiday weeks"
                );
            }
        }
    }
}

#[test]
fn scenario_vacation_preferences_honoured() {
    let (residents, cohort_defs) = minimal_feasible_roster();
    let resident_id = residents[9].id.clone();

    let inputs = ContextInputs {
        residents,
        requirements_by_pgy_track: standard_requirements(),
        completions: vec![],
        vacation_requests: vec![VacationRequest {
            resident_id: resident_id.clone(),
            block_a_options: vec![
                BlockOption { start_week: 10, priority: 1 },
                BlockOption { start_week: 12, priority: 2 },
            ],
            block_b_options: vec![
                BlockOption { start_week: 35, priority: 1 },
                BlockOption { start_week: 37, priority: 2 },
            ],
            hard_lock: None,
        }],
        cohort_defs,
        config: Default::default(),
        random_seed: Some(3),
    };
    let search_params = SearchParams { random_seed: Some(3), ..Default::default() };

    let (assignment, _) = solve_year(inputs, search_params).expect("roster with vacation preferences must still solve");

    for week in [10, 11, 35, 36] {
        assert_eq!(
            assignment.get(&resident_id, week),
            Some(RotationCode::Vacation),
            "{resident_id} must be on vacation in week {week}, the priority-1 pick"
        );
    }
}

#[test]
fn scenario_holiday_reciprocity() {
    let (residents, cohort_defs) = minimal_feasible_roster();

    let inputs = ContextInputs {
        residents,
        requirements_by_pgy_track: standard_requirements(),
        completions: vec![],
        vacation_requests: vec![],
        cohort_defs,
        config: Default::default(),
        random_seed: Some(5),
    };
    let search_params = SearchParams { random_seed: Some(5), ..Default::default() };

    let (assignment, _) = solve_year(inputs, search_params).expect("roster must solve for holiday reciprocity check");

    for resident_id in assignment.resident_ids() {
        let icu_h_count = HOLIDAY_WEEKS
            .iter()
            .filter(|&&w| assignment.get(resident_id, w) == Some(RotationCode::IcuH))
            .count();
        assert_eq!(icu_h_count, 1, "{resident_id} (non-PGY3) must have exactly one of weeks 26/27 as ICU_H");
    }
}

#[test]
fn scenario_co_intern_lockstep() {
    let (residents, cohort_defs) = minimal_feasible_roster();

    let inputs = ContextInputs {
        residents,
        requirements_by_pgy_track: standard_requirements(),
        completions: vec![],
        vacation_requests: vec![],
        cohort_defs,
        config: Default::default(),
        random_seed: Some(9),
    };
    let search_params = SearchParams { random_seed: Some(9), ..Default::default() };

    let (assignment, _) = solve_year(inputs, search_params).expect("roster must solve for co-intern lockstep check");

    let floor_codes = [RotationCode::A, RotationCode::B, RotationCode::C, RotationCode::D];
    for (a, b) in [("in0", "in1"), ("in2", "in3"), ("in4", "in5")] {
        for week in 1..=WEEK_COUNT {
            let code_a = assignment.get(a, week);
            let code_b = assignment.get(b, week);
            if code_a.is_some_and(|c| floor_codes.contains(&c)) || code_b.is_some_and(|c| floor_codes.contains(&c)) {
                assert_eq!(code_a, code_b, "{a} and {b} must ride the same floor team in week {week}");
            }
        }
    }
}

#[test]
fn scenario_pgy1_ramirez_override_blocks_cardio_before_threshold() {
    let (mut residents, cohort_defs) = minimal_feasible_roster();
    residents[9].overrides.no_cardio_before_week = Some(8);
    let resident_id = residents[9].id.clone();

    let inputs = ContextInputs {
        residents,
        requirements_by_pgy_track: standard_requirements(),
        completions: vec![],
        vacation_requests: vec![],
        cohort_defs,
        config: Default::default(),
        random_seed: Some(7),
    };
    let search_params = SearchParams { random_seed: Some(7), ..Default::default() };

    let (assignment, _) = solve_year(inputs, search_params).expect("roster with a Ramirez override must still solve");

    for week in 1..8 {
        let code = assignment.get(&resident_id, week);
        assert!(
            !matches!(code, Some(RotationCode::Cardio | RotationCode::CardioRam | RotationCode::CardioHca)),
            "{resident_id} must not be on cardiology in week {week}, before the Ramirez threshold"
        );
    }
}

#[test]
fn scenario_anesthesia_ty_terminal_block_and_clinic_exclusion() {
    let (mut residents, cohort_defs) = minimal_feasible_roster();
    let mut ty = Resident::new("ty-anes", "Anesthesia TY", Pgy::Ty);
    ty.track = Some(Track::Anesthesia);
    let ty_id = ty.id.clone();
    residents.push(ty);

    let inputs = ContextInputs {
        residents,
        requirements_by_pgy_track: standard_requirements(),
        completions: vec![],
        vacation_requests: vec![],
        cohort_defs,
        config: Default::default(),
        random_seed: Some(11),
    };
    let search_params = SearchParams { random_seed: Some(11), ..Default::default() };

    let (assignment, _) = solve_year(inputs, search_params).expect("roster with an anesthesia TY must still solve");

    for week in 49..=52 {
        assert_eq!(
            assignment.get(&ty_id, week),
            Some(RotationCode::Elective),
            "anesthesia TY must hold the terminal elective block in week {week}"
        );
    }
    for week in 1..=WEEK_COUNT {
        let code = assignment.get(&ty_id, week);
        assert!(
            !matches!(code, Some(RotationCode::Clinic | RotationCode::ClinicStar)),
            "TY resident must never hold standard clinic (week {week})"
        );
    }
}
