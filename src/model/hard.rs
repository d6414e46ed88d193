//! Hard constraints over the decision variables: anything that must hold in
//! every returned assignment, expressed directly against the CP-SAT model
//! rather than as a penalised objective term.

use cp_sat::builder::{CpModelBuilder, LinearExpr};
use tracing::debug;

use crate::catalogue::{self, Category, EligibilityFence, RolePermission, RotationCode};
use crate::context::SolveContext;
use crate::resident::Pgy;

use super::variables::Variables;

fn sum_over<'a>(vars: &Variables, residents: impl Iterator<Item = &'a usize>, week: u32, code: RotationCode) -> LinearExpr {
    residents.map(|&r| (1i64, vars.var(r, week, code))).collect()
}

/// Role and eligibility-fence permissions: a resident may only be assigned a
/// code their PGY/track is permitted to hold.
fn role_and_fence(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    for meta in catalogue::all() {
        for (r, resident) in ctx.residents.iter().enumerate() {
            let allowed = match meta.role {
                RolePermission::SeniorOnly => resident.is_senior(),
                RolePermission::InternOnly => resident.is_intern(),
                RolePermission::Either => true,
            } && match meta.fence {
                EligibilityFence::None => true,
                EligibilityFence::TyOnly => resident.is_ty(),
                EligibilityFence::TyAnesthesiaOnly => resident.is_ty_anesthesia(),
                EligibilityFence::NonTyOnly => !resident.is_ty(),
                EligibilityFence::NeurologyTyExcludesOthers => !resident.is_ty() || resident.is_ty_neurology(),
            };
            if allowed {
                continue;
            }
            for week in 1..=vars.weeks() {
                model.add_eq(vars.var(r, week, meta.code), 0);
            }
        }
    }

    // IcuH is reserved for holiday weeks; every other code is unavailable then
    // unless explicitly permitted by the holiday-week restriction below.
    for week in 1..=vars.weeks() {
        let is_holiday = ctx.config.holiday_weeks.contains(&week);
        for meta in catalogue::all() {
            if meta.holiday_only && !is_holiday {
                for r in 0..ctx.residents.len() {
                    model.add_eq(vars.var(r, week, meta.code), 0);
                }
            }
        }
    }
}

/// Restricts holiday weeks to a reduced set of codes (essential coverage,
/// clinic, vacation, or the `IcuH` marker) and enforces holiday reciprocity
/// for non-PGY3 residents: exactly one of the two holiday weeks off.
fn holiday_partition(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    let banned: Vec<RotationCode> = catalogue::all()
        .iter()
        .map(|m| m.code)
        .filter(|c| {
            !matches!(
                c,
                RotationCode::Vacation
                    | RotationCode::IcuH
                    | RotationCode::Clinic
                    | RotationCode::ClinicStar
                    | RotationCode::TyClinic
                    | RotationCode::A
                    | RotationCode::B
                    | RotationCode::C
                    | RotationCode::D
                    | RotationCode::Icu
                    | RotationCode::IcuE
                    | RotationCode::IcuN
                    | RotationCode::Nf
                    | RotationCode::Swing
            )
        })
        .collect();

    for &week in &ctx.config.holiday_weeks {
        if week < 1 || week > vars.weeks() {
            continue;
        }
        for r in 0..ctx.residents.len() {
            for &code in &banned {
                model.add_eq(vars.var(r, week, code), 0);
            }
        }
    }

    let mut holiday_weeks: Vec<u32> = ctx.config.holiday_weeks.iter().copied().collect();
    holiday_weeks.sort_unstable();
    if holiday_weeks.len() != 2 {
        return;
    }
    for (r, resident) in ctx.residents.iter().enumerate() {
        if resident.pgy == Pgy::Pgy3 {
            continue; // graded via a soft penalty instead (model::soft).
        }
        let off_sum: LinearExpr = holiday_weeks
            .iter()
            .flat_map(|&w| {
                [
                    (1i64, vars.var(r, w, RotationCode::Vacation)),
                    (1i64, vars.var(r, w, RotationCode::IcuH)),
                ]
            })
            .collect();
        model.add_eq(off_sum, 1);
    }
}

/// Vacation placement (shape, holiday exclusion, hard-lock, option selection).
///
/// Returns, for each non-hard-locked block option, the `(weight, chosen)`
/// pair the caller folds into the objective as a bonus (`weight = 6 -
/// priority`, priority 1 = highest) when that option is the one selected —
/// see spec §4.3.3's "Vacation priority" soft term.
fn vacation(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) -> Vec<(i64, cp_sat::builder::BoolVar)> {
    let mut priority_choices = Vec::new();
    if ctx.config.relax_vacation_blocks {
        debug!("vacation shape relaxed to soft; skipping hard placement constraints");
        return priority_choices;
    }

    let weeks = vars.weeks();
    for (r, resident) in ctx.residents.iter().enumerate() {
        let total: LinearExpr = (1..=weeks).map(|w| (1i64, vars.var(r, w, RotationCode::Vacation))).collect();
        model.add_eq(total, ctx.config.vacation_weeks_per_resident as i64);

        for &w in &ctx.config.holiday_weeks {
            model.add_eq(vars.var(r, w, RotationCode::Vacation), 0);
        }

        // No isolated 1-week vacation blocks.
        for w in 2..weeks {
            let mid = vars.var(r, w, RotationCode::Vacation);
            let prev = vars.var(r, w - 1, RotationCode::Vacation);
            let next = vars.var(r, w + 1, RotationCode::Vacation);
            let rhs: LinearExpr = [(1i64, prev), (1i64, next)].into_iter().collect();
            model.add_le(LinearExpr::from(mid), rhs);
        }
        // Boundary weeks have no "prev"/"next" on one side, so the interior
        // rule above never examines them as a midpoint; without a dedicated
        // check, a single vacation week at week 1 or week `weeks` could slip
        // through as an unflagged length-1 run (spec H1's "boundary
        // conditions (edge weeks extended-runs)").
        if weeks >= 2 {
            model.add_le(LinearExpr::from(vars.var(r, 1, RotationCode::Vacation)), LinearExpr::from(vars.var(r, 2, RotationCode::Vacation)));
            model.add_le(
                LinearExpr::from(vars.var(r, weeks, RotationCode::Vacation)),
                LinearExpr::from(vars.var(r, weeks - 1, RotationCode::Vacation)),
            );
        }

        // No block longer than 2 weeks: any 3 consecutive weeks sum to at most 2.
        for w in 1..=weeks.saturating_sub(2) {
            let window: LinearExpr = (w..w + 3).map(|ww| (1i64, vars.var(r, ww, RotationCode::Vacation))).collect();
            model.add_le(window, 2);
        }

        // Minimum gap between vacation blocks.
        let gap = ctx.config.min_interblock_gap_weeks;
        if gap > 0 && weeks > gap {
            for w in 1..=weeks - gap {
                let window: LinearExpr = (w..w + gap + 1)
                    .filter(|&ww| ww <= weeks)
                    .map(|ww| (1i64, vars.var(r, ww, RotationCode::Vacation)))
                    .collect();
                model.add_le(window, 2);
            }
        }

        let opts = ctx.vacation_options.get(&resident.id);
        if let Some(opts) = opts {
            if let Some(locked) = &opts.hard_lock {
                for &w in locked {
                    model.add_eq(vars.var(r, w, RotationCode::Vacation), 1);
                }
                continue;
            }
            for block in [&opts.block_a, &opts.block_b] {
                if block.is_empty() {
                    continue;
                }
                let chosen: Vec<_> = block.iter().map(|_| model.new_bool_var()).collect();
                let chosen_sum: LinearExpr = chosen.iter().map(|c| (1i64, c.clone())).collect();
                model.add_eq(chosen_sum, 1);
                for (opt, choice) in block.iter().zip(chosen.iter()) {
                    for ww in [opt.start_week, opt.start_week + 1] {
                        if ww >= 1 && ww <= weeks {
                            model.add_eq(vars.var(r, ww, RotationCode::Vacation), 1).only_enforce_if(choice.clone());
                        }
                    }
                    let weight = 6i64 - opt.priority as i64;
                    priority_choices.push((weight, choice.clone()));
                }
            }
        }
    }
    priority_choices
}

/// Emergency-department weekly cap and the blanket July ED blackout.
fn ed_cap_and_july(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    for week in 1..=vars.weeks() {
        let sum: LinearExpr = (0..ctx.residents.len()).map(|r| (1i64, vars.var(r, week, RotationCode::Ed))).collect();
        model.add_le(sum, ctx.config.ed_cap_per_week as i64);
    }
    for &week in &ctx.config.july_weeks {
        for r in 0..ctx.residents.len() {
            model.add_eq(vars.var(r, week, RotationCode::Ed), 0);
        }
    }
}

/// PGY1 cardiology blackout before the Ramirez threshold week.
fn ramirez(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    for (r, resident) in ctx.residents.iter().enumerate() {
        if resident.pgy != Pgy::Pgy1 {
            continue;
        }
        let threshold = resident.overrides.no_cardio_before_week.unwrap_or(ctx.config.no_cardio_before_week);
        for week in 1..threshold.min(vars.weeks() + 1) {
            for code in [RotationCode::Cardio, RotationCode::CardioRam, RotationCode::CardioHca] {
                model.add_eq(vars.var(r, week, code), 0);
            }
        }
    }
}

/// PGY2 delayed start: no floor team, Team G, ICU day, or night/swing
/// assignment in week 1.
fn pgy2_delayed_start(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    if vars.weeks() < 1 {
        return;
    }
    let banned = [
        RotationCode::A,
        RotationCode::B,
        RotationCode::C,
        RotationCode::D,
        RotationCode::G,
        RotationCode::Nf,
        RotationCode::Swing,
        RotationCode::Icu,
        RotationCode::IcuE,
        RotationCode::IcuN,
    ];
    for (r, resident) in ctx.residents.iter().enumerate() {
        if resident.pgy != Pgy::Pgy2 {
            continue;
        }
        for &code in &banned {
            model.add_eq(vars.var(r, 1, code), 0);
        }
    }
}

/// Night caps: per-year, cumulative-with-prior-credit, and consecutive.
fn nights(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    let weeks = vars.weeks();
    let night_codes = [RotationCode::Nf, RotationCode::IcuN];
    for (r, resident) in ctx.residents.iter().enumerate() {
        let total: LinearExpr = (1..=weeks)
            .flat_map(|w| night_codes.iter().map(move |&c| (1i64, vars.var(r, w, c))))
            .collect();
        model.add_le(total, ctx.config.max_nights_per_year as i64);

        let prior: i64 = ctx
            .completions_by_resident
            .get(&resident.id)
            .map(|m| m.get(&Category::Nf).copied().unwrap_or(0) + m.get(&Category::IcuNight).copied().unwrap_or(0))
            .unwrap_or(0) as i64;
        let total2: LinearExpr = (1..=weeks)
            .flat_map(|w| night_codes.iter().map(move |&c| (1i64, vars.var(r, w, c))))
            .collect();
        model.add_le(total2, ctx.config.max_nights_cumulative as i64 - prior);

        let span = ctx.config.max_consecutive_nights + 1;
        if weeks > span {
            for w in 1..=weeks - span {
                let window: LinearExpr = (w..w + span)
                    .flat_map(|ww| night_codes.iter().map(move |&c| (1i64, vars.var(r, ww, c))))
                    .collect();
                model.add_le(window, ctx.config.max_consecutive_nights as i64);
            }
        }
    }
}

/// ICU block (H10): no 3 of any 3 consecutive weeks are ICU day or night.
fn icu_block(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    let weeks = vars.weeks();
    let codes: Vec<RotationCode> = catalogue::icu_day_or_night_indices().into_iter().map(catalogue::code_at).collect();
    for r in 0..ctx.residents.len() {
        for w in 1..=weeks.saturating_sub(2) {
            let window: LinearExpr = (w..w + 3).flat_map(|ww| codes.iter().map(move |&c| (1i64, vars.var(r, ww, c)))).collect();
            model.add_le(window, 2);
        }
    }
}

/// Floor block (H11): no 5 of any 5 consecutive weeks are in the floor+night
/// supergroup {A, B, C, D, G, NF, SWING}.
fn floor_block(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    let weeks = vars.weeks();
    let codes: Vec<RotationCode> = catalogue::floor_supergroup_indices().into_iter().map(catalogue::code_at).collect();
    for r in 0..ctx.residents.len() {
        for w in 1..=weeks.saturating_sub(4) {
            let window: LinearExpr = (w..w + 5).flat_map(|ww| codes.iter().map(move |&c| (1i64, vars.var(r, ww, c)))).collect();
            model.add_le(window, 4);
        }
    }
}

/// Per-team stagnation cap (H12): no `limit + 1` of any consecutive `limit +
/// 1` weeks are on the same specific floor team, `limit = 2` for seniors and
/// `4` for interns. Team G carries only a soft analogue (model::soft).
fn team_overrun(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    let weeks = vars.weeks();
    let codes: Vec<RotationCode> = catalogue::floor_abcd_indices().into_iter().map(catalogue::code_at).collect();
    for (r, resident) in ctx.residents.iter().enumerate() {
        let limit = if resident.is_senior() { 2 } else { 4 };
        if weeks <= limit {
            continue;
        }
        for &code in &codes {
            for w in 1..=weeks - limit {
                let window: LinearExpr = (w..=w + limit).map(|ww| (1i64, vars.var(r, ww, code))).collect();
                model.add_le(window, limit as i64);
            }
        }
    }
}

/// Anesthesia-track TYs: the final 4 weeks of the year are the terminal
/// anesthesia elective block.
fn anesthesia_terminal_block(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    let weeks = vars.weeks();
    for (r, resident) in ctx.residents.iter().enumerate() {
        if !resident.is_ty_anesthesia() {
            continue;
        }
        for week in 49..=52u32 {
            if week > weeks {
                continue;
            }
            model.add_eq(vars.var(r, week, RotationCode::Elective), 1);
        }
    }
}

/// Weekly essential-service coverage: floor teams A-D, the ICU day pool, and
/// the night/swing pool, with reduced aggregate staffing on holiday weeks.
/// Also caps Team G (senior-only, H3's soft-toggle team) to at most one
/// senior per non-holiday week — the 0-vs-1 choice itself is a soft nudge
/// (`model::soft::team_g`), but the ceiling of 1 is hard.
fn coverage(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    let seniors = &ctx.senior_idx;
    let interns = &ctx.intern_idx;

    for week in 1..=vars.weeks() {
        let holiday = ctx.config.holiday_weeks.contains(&week);

        if !holiday {
            for code in [RotationCode::A, RotationCode::B, RotationCode::C, RotationCode::D] {
                model.add_eq(sum_over(vars, seniors.iter(), week, code), 1);
                model.add_eq(sum_over(vars, interns.iter(), week, code), 2);
            }

            let g_senior = sum_over(vars, seniors.iter(), week, RotationCode::G);
            model.add_le(g_senior, 1);

            let icu_senior: LinearExpr = seniors
                .iter()
                .flat_map(|&r| [RotationCode::Icu, RotationCode::IcuE].map(|c| (1i64, vars.var(r, week, c))))
                .collect();
            model.add_eq(icu_senior, 2);
            let icu_intern: LinearExpr = interns
                .iter()
                .flat_map(|&r| [RotationCode::Icu, RotationCode::IcuE].map(|c| (1i64, vars.var(r, week, c))))
                .collect();
            model.add_eq(icu_intern, 2);

            let night_senior: LinearExpr = seniors
                .iter()
                .flat_map(|&r| [RotationCode::Nf, RotationCode::IcuN, RotationCode::Swing].map(|c| (1i64, vars.var(r, week, c))))
                .collect();
            model.add_eq(night_senior, 1);
            let night_intern: LinearExpr = interns
                .iter()
                .flat_map(|&r| [RotationCode::Nf, RotationCode::IcuN, RotationCode::Swing].map(|c| (1i64, vars.var(r, week, c))))
                .collect();
            model.add_eq(night_intern, 1);
        } else {
            for code in [RotationCode::A, RotationCode::B, RotationCode::C, RotationCode::D] {
                let team_total: LinearExpr = (0..ctx.residents.len()).map(|r| (1i64, vars.var(r, week, code))).collect();
                model.add_eq(team_total, 3);
                model.add_ge(sum_over(vars, seniors.iter(), week, code), 1);
            }

            let icu_total: LinearExpr = (0..ctx.residents.len())
                .flat_map(|r| [RotationCode::Icu, RotationCode::IcuE].map(|c| (1i64, vars.var(r, week, c))))
                .collect();
            model.add_eq(icu_total, 4);
            let icu_senior: LinearExpr = seniors
                .iter()
                .flat_map(|&r| [RotationCode::Icu, RotationCode::IcuE].map(|c| (1i64, vars.var(r, week, c))))
                .collect();
            model.add_ge(icu_senior, 1);

            for code in [RotationCode::Nf, RotationCode::IcuN, RotationCode::Swing] {
                let code_total: LinearExpr = (0..ctx.residents.len()).map(|r| (1i64, vars.var(r, week, code))).collect();
                model.add_eq(code_total, 2);
            }
        }
    }
}

/// Caps electives a resident may take beyond their required minimum (spec'd
/// categories only): CARDIO, NEURO, GERIATRICS, ID, ED. Scoped to non-TY
/// residents only (H15); TY core-elective exposure is governed by the soft
/// TY targets in `model::soft`, not this ceiling.
fn elective_ceilings(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    let capped = [Category::Cardio, Category::Neuro, Category::Geriatrics, Category::Id, Category::Ed];
    for (r, resident) in ctx.residents.iter().enumerate() {
        if resident.is_ty() {
            continue;
        }
        let reqs = ctx.requirements_for(resident);
        for &category in &capped {
            let Some(req) = reqs.iter().find(|q| q.category == category) else {
                continue;
            };
            let codes: Vec<RotationCode> = catalogue::core_elective_indices(category).into_iter().map(catalogue::code_at).collect();
            let total: LinearExpr = (1..=vars.weeks())
                .flat_map(|w| codes.iter().map(move |&c| (1i64, vars.var(r, w, c))))
                .collect();
            model.add_le(total, req.required_weeks as i64);
        }
    }
}

/// Co-intern lockstep: paired interns sharing a cohort ride the same floor
/// team / ICU day assignment whenever either one is on it.
fn co_intern_pairing(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    let lockstep_codes = [
        RotationCode::A,
        RotationCode::B,
        RotationCode::C,
        RotationCode::D,
        RotationCode::Icu,
        RotationCode::IcuE,
    ];
    for &(i, j) in &ctx.co_intern_pairs {
        for week in 1..=vars.weeks() {
            for &code in &lockstep_codes {
                model.add_eq(LinearExpr::from(vars.var(i, week, code)), LinearExpr::from(vars.var(j, week, code)));
            }
        }
    }
}

/// Cohort-forced clinic weeks, plus the weekly clinic occupancy band
/// (excludes TY residents and holiday weeks).
fn clinic(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) {
    for (r, resident) in ctx.residents.iter().enumerate() {
        let Some(cohort_id) = &resident.cohort_id else { continue };
        let Some(def) = ctx.cohort_defs.get(cohort_id) else { continue };
        let code = if resident.is_ty() { RotationCode::TyClinic } else { RotationCode::Clinic };
        for &week in &def.clinic_weeks {
            model.add_eq(vars.var(r, week, code), 1);
        }
    }

    for week in 1..=vars.weeks() {
        if ctx.config.holiday_weeks.contains(&week) {
            let sum: LinearExpr = (0..ctx.residents.len())
                .flat_map(|r| [RotationCode::Clinic, RotationCode::ClinicStar, RotationCode::TyClinic].map(|c| (1i64, vars.var(r, week, c))))
                .collect();
            model.add_le(sum, 5);
            continue;
        }
        let non_ty: Vec<usize> = (0..ctx.residents.len()).filter(|&r| !ctx.residents[r].is_ty()).collect();
        let sum: LinearExpr = non_ty
            .iter()
            .flat_map(|&r| [RotationCode::Clinic, RotationCode::ClinicStar].map(|c| (1i64, vars.var(r, week, c))))
            .collect();
        model.add_ge(sum.clone(), ctx.config.clinic_min_per_week as i64);
        model.add_le(sum, ctx.config.clinic_max_per_week as i64);
    }
}

/// Applies every hard constraint to `model`. Returns the vacation-option
/// priority-weighted choice booleans so the objective can reward whichever
/// option the solver actually selects (spec §4.3.3 "Vacation priority").
pub fn apply(model: &mut CpModelBuilder, vars: &Variables, ctx: &SolveContext) -> Vec<(i64, cp_sat::builder::BoolVar)> {
    role_and_fence(model, vars, ctx);
    holiday_partition(model, vars, ctx);
    let vacation_priority_choices = vacation(model, vars, ctx);
    ed_cap_and_july(model, vars, ctx);
    ramirez(model, vars, ctx);
    pgy2_delayed_start(model, vars, ctx);
    nights(model, vars, ctx);
    icu_block(model, vars, ctx);
    floor_block(model, vars, ctx);
    team_overrun(model, vars, ctx);
    anesthesia_terminal_block(model, vars, ctx);
    coverage(model, vars, ctx);
    elective_ceilings(model, vars, ctx);
    co_intern_pairing(model, vars, ctx);
    clinic(model, vars, ctx);
    debug!("hard constraints applied");
    vacation_priority_choices
}
