//! Post-Solution Validator (C5): independently replays the hard constraints
//! against a produced [`Assignment`], without trusting that the model that
//! produced it was built correctly.

use crate::assignment::Assignment;
use crate::catalogue::{self, EligibilityFence, RolePermission, RotationCode};
use crate::context::SolveContext;
use crate::resident::Pgy;

/// Returns every violation found; an empty vector means the assignment
/// passes independent replay.
pub fn validate(assignment: &Assignment, ctx: &SolveContext) -> Vec<String> {
    let mut violations = Vec::new();

    for resident in &ctx.residents {
        let weeks = assignment.weeks_for(&resident.id);
        if weeks.len() as u32 != ctx.week_count {
            violations.push(format!("{} has {} assigned weeks, expected {}", resident.id, weeks.len(), ctx.week_count));
        }

        for &(week, code) in &weeks {
            let meta = catalogue::all().iter().find(|m| m.code == code).expect("catalogue covers every code");
            let role_ok = match meta.role {
                RolePermission::SeniorOnly => resident.is_senior(),
                RolePermission::InternOnly => resident.is_intern(),
                RolePermission::Either => true,
            };
            if !role_ok {
                violations.push(format!("{} (week {week}): {code:?} not permitted for {}", resident.id, resident.pgy_label()));
            }
            let fence_ok = match meta.fence {
                EligibilityFence::None => true,
                EligibilityFence::TyOnly => resident.is_ty(),
                EligibilityFence::TyAnesthesiaOnly => resident.is_ty_anesthesia(),
                EligibilityFence::NonTyOnly => !resident.is_ty(),
                EligibilityFence::NeurologyTyExcludesOthers => !resident.is_ty() || resident.is_ty_neurology(),
            };
            if !fence_ok {
                violations.push(format!("{} (week {week}): {code:?} violates an eligibility fence", resident.id));
            }
            if meta.holiday_only && !ctx.config.holiday_weeks.contains(&week) {
                violations.push(format!("{} (week {week}): {code:?} is holiday-only", resident.id));
            }
        }

        let vacation_weeks = assignment.count_weeks_in(&resident.id, &[RotationCode::Vacation]);
        if vacation_weeks != ctx.config.vacation_weeks_per_resident {
            violations.push(format!(
                "{} has {vacation_weeks} vacation weeks, expected {}",
                resident.id, ctx.config.vacation_weeks_per_resident
            ));
        }
        for &hw in &ctx.config.holiday_weeks {
            if assignment.get(&resident.id, hw) == Some(RotationCode::Vacation) {
                violations.push(format!("{} is on vacation during holiday week {hw}", resident.id));
            }
        }

        if resident.pgy == Pgy::Pgy1 {
            let threshold = resident.overrides.no_cardio_before_week.unwrap_or(ctx.config.no_cardio_before_week);
            for &(week, code) in &weeks {
                if week < threshold && matches!(code, RotationCode::Cardio | RotationCode::CardioRam | RotationCode::CardioHca) {
                    violations.push(format!("{} assigned {code:?} at week {week}, before the Ramirez threshold {threshold}", resident.id));
                }
            }
            for &july_week in &ctx.config.july_weeks {
                if assignment.get(&resident.id, july_week) == Some(RotationCode::Ed) {
                    violations.push(format!("{} assigned ED during July (week {july_week})", resident.id));
                }
            }
        }

        if resident.pgy == Pgy::Pgy2 {
            if let Some(week1) = assignment.get(&resident.id, 1) {
                let banned = matches!(
                    week1,
                    RotationCode::A
                        | RotationCode::B
                        | RotationCode::C
                        | RotationCode::D
                        | RotationCode::G
                        | RotationCode::Nf
                        | RotationCode::Swing
                        | RotationCode::Icu
                        | RotationCode::IcuE
                        | RotationCode::IcuN
                );
                if banned {
                    violations.push(format!("{} (PGY2) assigned {week1:?} in week 1, before the delayed-start rule allows", resident.id));
                }
            }
        }

        let night_weeks = assignment.count_weeks_in(&resident.id, &[RotationCode::Nf, RotationCode::IcuN]);
        if night_weeks > ctx.config.max_nights_per_year {
            violations.push(format!("{} has {night_weeks} night weeks, over the annual cap of {}", resident.id, ctx.config.max_nights_per_year));
        }
        let mut consecutive = 0u32;
        for &(_, code) in &weeks {
            if matches!(code, RotationCode::Nf | RotationCode::IcuN) {
                consecutive += 1;
                if consecutive > ctx.config.max_consecutive_nights {
                    violations.push(format!("{} exceeds {} consecutive night weeks", resident.id, ctx.config.max_consecutive_nights));
                    break;
                }
            } else {
                consecutive = 0;
            }
        }
    }

    for week in 1..=ctx.week_count {
        let ed_count = ctx.residents.iter().filter(|r| assignment.get(&r.id, week) == Some(RotationCode::Ed)).count() as u32;
        if ed_count > ctx.config.ed_cap_per_week {
            violations.push(format!("week {week}: ED staffed by {ed_count}, over the cap of {}", ctx.config.ed_cap_per_week));
        }

        if !ctx.config.holiday_weeks.contains(&week) {
            let floor_count = ctx
                .residents
                .iter()
                .filter(|r| matches!(assignment.get(&r.id, week), Some(RotationCode::A | RotationCode::B | RotationCode::C | RotationCode::D)))
                .count();
            if floor_count < 12 {
                violations.push(format!("week {week}: only {floor_count} residents on floor teams, expected at least 12"));
            }
        }
    }

    for &(i, j) in &ctx.co_intern_pairs {
        let resident_i = &ctx.residents[i].id;
        let resident_j = &ctx.residents[j].id;
        for week in 1..=ctx.week_count {
            let ci = assignment.get(resident_i, week);
            let cj = assignment.get(resident_j, week);
            let lockstep = matches!(ci, Some(RotationCode::A | RotationCode::B | RotationCode::C | RotationCode::D | RotationCode::Icu | RotationCode::IcuE));
            if lockstep && ci != cj {
                violations.push(format!("week {week}: co-interns {resident_i}/{resident_j} split off their shared rotation"));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{build, ContextInputs};
    use crate::resident::Resident;

    #[test]
    fn empty_assignment_flags_missing_weeks() {
        let inputs = ContextInputs {
            residents: vec![Resident::new("r1", "R1", Pgy::Pgy1)],
            ..Default::default()
        };
        let ctx = build(inputs).unwrap();
        let assignment = Assignment::new();
        let violations = validate(&assignment, &ctx);
        assert!(violations.iter().any(|v| v.contains("assigned weeks")));
    }

    #[test]
    fn pgy2_on_floor_team_week_one_is_flagged() {
        let inputs = ContextInputs {
            residents: vec![Resident::new("r1", "R1", Pgy::Pgy2)],
            ..Default::default()
        };
        let ctx = build(inputs).unwrap();
        let mut assignment = Assignment::new();
        assignment.set("r1".into(), 1, RotationCode::A);
        let violations = validate(&assignment, &ctx);
        assert!(violations.iter().any(|v| v.contains("delayed-start")));
    }

    #[test]
    fn pgy2_on_floor_team_week_two_is_not_flagged_by_delayed_start() {
        let inputs = ContextInputs {
            residents: vec![Resident::new("r1", "R1", Pgy::Pgy2)],
            ..Default::default()
        };
        let ctx = build(inputs).unwrap();
        let mut assignment = Assignment::new();
        assignment.set("r1".into(), 2, RotationCode::A);
        let violations = validate(&assignment, &ctx);
        assert!(!violations.iter().any(|v| v.contains("delayed-start")));
    }
}
