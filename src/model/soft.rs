//! Soft constraints: weighted penalty (and bonus) terms folded into a single
//! objective, tiered the way the original scoring sheet tiers them — missing
//! a graduation requirement costs orders of magnitude more than an uneven
//! rotation burst, which in turn costs more than a missed vacation preference.

use cp_sat::builder::{CpModelBuilder, LinearExpr};

use crate::catalogue::{self, Category, RotationCode};
use crate::context::SolveContext;
use crate::resident::Pgy;

use super::variables::Variables;

mod weight {
    pub const REQUIREMENT_DEFICIT: i64 = 10_000_000;
    pub const GRADUATION_DEFICIT: i64 = 20_000_000;
    pub const FLOOR_SURPLUS: i64 = 1_000_000;
    pub const TY_SOFT_REQUIREMENT: i64 = 500_000;
    pub const TY_SOFT_REQUIREMENT_HEAVY: i64 = 2_000_000;
    pub const TEAM_G_ACTIVE_BONUS: i64 = 300_000;
    pub const TEAM_G_OVERRUN: i64 = 1_000_000;
    pub const SENIOR_COVERAGE_MISSING: i64 = 1_000_000;
    pub const ELECTIVE_BURST_3: i64 = 500_000;
    pub const ELECTIVE_BURST_4: i64 = 2_000_000;
    pub const CLINIC_BURST_3: i64 = 500_000;
    pub const GLOBAL_STAGGER_6: i64 = 5_000_000;
    pub const PGY3_HOLIDAY_BASE: i64 = 10_000_000;
    pub const PGY3_HOLIDAY_PER_CORE_WEEK: i64 = 200_000;
    pub const PGY3_FRONT_LOAD_LATE_WEEK: i64 = 500;
}

/// A non-negative integer variable bounded `[0, max]`, tied to `>= expr` so
/// the solver is free to set it to the true deficit (it will, since every
/// unit costs objective value).
fn deficit_var(model: &mut CpModelBuilder, max: i64, expr: LinearExpr) -> cp_sat::builder::IntVar {
    let v = model.new_int_var(vec![(0, max.max(0))]);
    model.add_ge(LinearExpr::from(v.clone()), expr);
    v
}

/// Annual/cumulative requirement deficits and the FLOORS surplus penalty.
fn requirement_terms(model: &mut CpModelBuilder, vars: &mut Variables, ctx: &SolveContext, terms: &mut Vec<(i64, LinearExpr)>) {
    let weeks = vars.weeks();
    for r in 0..ctx.residents.len() {
        let resident = ctx.residents[r].clone();
        for req in ctx.requirements_for(&resident).to_vec() {
            let codes: Vec<RotationCode> = catalogue::core_elective_indices(req.category).into_iter().map(catalogue::code_at).collect();
            if codes.is_empty() {
                continue;
            }
            let actual: LinearExpr = (1..=weeks)
                .map(|w| {
                    let ind = vars.indicator_in(model, r, w, &codes);
                    (1i64, ind)
                })
                .collect();
            let deficit_expr = LinearExpr::from(req.required_weeks as i64) - actual.clone();
            let deficit = deficit_var(model, req.required_weeks as i64, deficit_expr);
            terms.push((weight::REQUIREMENT_DEFICIT, LinearExpr::from(deficit)));

            if req.category == Category::Floors {
                let surplus_expr = actual - LinearExpr::from(req.required_weeks as i64);
                let surplus = deficit_var(model, weeks as i64, surplus_expr);
                terms.push((weight::FLOOR_SURPLUS, LinearExpr::from(surplus)));
            }
        }
    }
}

/// TY-specific soft minima that are never hard-enforced (spec's rollover and
/// graduation requirements only bind non-TY residents directly).
fn ty_soft_requirements(model: &mut CpModelBuilder, vars: &mut Variables, ctx: &SolveContext, terms: &mut Vec<(i64, LinearExpr)>) {
    let weeks = vars.weeks();
    let targets: [(Category, u32, i64); 5] = [
        (Category::Floors, 24, weight::TY_SOFT_REQUIREMENT_HEAVY),
        (Category::Icu, 4, weight::TY_SOFT_REQUIREMENT),
        (Category::Ed, 4, weight::TY_SOFT_REQUIREMENT),
        (Category::TyClinic, 4, weight::TY_SOFT_REQUIREMENT),
        (Category::Elective, 8, weight::TY_SOFT_REQUIREMENT),
    ];
    for r in 0..ctx.residents.len() {
        if !ctx.residents[r].is_ty() {
            continue;
        }
        for &(category, min_weeks, w) in &targets {
            let codes: Vec<RotationCode> = catalogue::indices_in_category(category).into_iter().map(catalogue::code_at).collect();
            let actual: LinearExpr = (1..=weeks).map(|wk| (1i64, vars.indicator_in(model, r, wk, &codes))).collect();
            let deficit = deficit_var(model, min_weeks as i64, LinearExpr::from(min_weeks as i64) - actual);
            terms.push((w, LinearExpr::from(deficit)));
        }
        if ctx.residents[r].is_ty_anesthesia() {
            let codes = [RotationCode::GenSurg];
            let actual: LinearExpr = (1..=weeks).map(|wk| (1i64, vars.indicator_in(model, r, wk, &codes))).collect();
            let deficit = deficit_var(model, 4, LinearExpr::from(4i64) - actual);
            terms.push((weight::TY_SOFT_REQUIREMENT, LinearExpr::from(deficit)));
        }
    }
}

/// PGY3 cumulative graduation minima: prior-year credit plus this year must
/// clear the named floors, weighted far above an ordinary annual deficit.
fn graduation_minima(model: &mut CpModelBuilder, vars: &mut Variables, ctx: &SolveContext, terms: &mut Vec<(i64, LinearExpr)>) {
    let weeks = vars.weeks();
    let minima = [(Category::Cardio, 4), (Category::Neuro, 2), (Category::Geriatrics, 2), (Category::Id, 4), (Category::Ed, 4)];
    for r in 0..ctx.residents.len() {
        if ctx.residents[r].pgy != Pgy::Pgy3 {
            continue;
        }
        let resident_id = ctx.residents[r].id.clone();
        for (category, min_total) in minima {
            let codes: Vec<RotationCode> = catalogue::core_elective_indices(category).into_iter().map(catalogue::code_at).collect();
            let prior: i64 = ctx
                .completions_by_resident
                .get(&resident_id)
                .and_then(|m| m.get(&category).copied())
                .unwrap_or(0) as i64;
            let actual: LinearExpr = (1..=weeks).map(|wk| (1i64, vars.indicator_in(model, r, wk, &codes))).collect();
            let deficit = deficit_var(model, min_total, LinearExpr::from(min_total) - prior - actual);
            terms.push((weight::GRADUATION_DEFICIT, LinearExpr::from(deficit)));
        }
    }
}

/// Team-G activation bonus and its own >2-consecutive-week penalty. Team G's
/// 0-or-1-senior ceiling is hard (model::hard's `coverage`, H3's soft-toggle
/// team); this only grades which of the two the solver picks, plus the
/// senior/intern ABCD stagnation cap equivalent for G (model::hard's
/// `team_overrun`, H12, has no Team-G counterpart).
fn team_g(model: &mut CpModelBuilder, vars: &mut Variables, ctx: &SolveContext, terms: &mut Vec<(i64, LinearExpr)>) {
    let weeks = vars.weeks();
    for week in 1..=weeks {
        if ctx.config.holiday_weeks.contains(&week) {
            continue;
        }
        let active: LinearExpr = (0..ctx.residents.len()).map(|r| (1i64, vars.var(r, week, RotationCode::G))).collect();
        // Reward (negative penalty) when the one permitted senior is actively on G this week.
        terms.push((-weight::TEAM_G_ACTIVE_BONUS, active));
    }

    for r in 0..ctx.residents.len() {
        // A senior riding Team G for more than 2 consecutive weeks.
        for w in 1..=weeks.saturating_sub(2) {
            let window: LinearExpr = (w..w + 3).map(|ww| (1i64, vars.var(r, ww, RotationCode::G))).collect();
            let overrun = deficit_var(model, 1, window - 2);
            terms.push((weight::TEAM_G_OVERRUN, LinearExpr::from(overrun)));
        }
    }
}

/// Penalises, per week, having no senior at all on GERIATRICS and
/// separately none on NEURO — these categories have no hard weekly staffing
/// rule (unlike the floor/ICU/night teams in H3), so coverage is encouraged
/// rather than required. Dropped entirely under `relax_geriatrics_coverage`.
fn senior_coverage(model: &mut CpModelBuilder, vars: &mut Variables, ctx: &SolveContext, terms: &mut Vec<(i64, LinearExpr)>) {
    if ctx.config.relax_geriatrics_coverage {
        return;
    }
    for &category in &[Category::Geriatrics, Category::Neuro] {
        let codes: Vec<RotationCode> = catalogue::indices_in_category(category).into_iter().map(catalogue::code_at).collect();
        for week in 1..=vars.weeks() {
            let present: LinearExpr = ctx
                .senior_idx
                .iter()
                .map(|&r| (1i64, vars.indicator_in(model, r, week, &codes)))
                .collect();
            // `has_senior` = 1 iff at least one senior is on this category this week.
            let has_senior = model.new_bool_var();
            model.add_ge(present.clone(), LinearExpr::from(has_senior.clone()));
            let bound = ctx.senior_idx.len() as i64;
            model.add_le(present, LinearExpr::from(has_senior.clone()) * bound);
            terms.push((weight::SENIOR_COVERAGE_MISSING, LinearExpr::from(1i64) - LinearExpr::from(has_senior)));
        }
    }
}

/// Elective and clinic burst penalties for non-PGY3 residents, plus a global
/// floor/night staggering penalty applied to everyone.
fn bursts(model: &mut CpModelBuilder, vars: &mut Variables, ctx: &SolveContext, terms: &mut Vec<(i64, LinearExpr)>) {
    let weeks = vars.weeks();
    let elective_codes: Vec<RotationCode> = catalogue::indices_in_category(Category::Elective).into_iter().map(catalogue::code_at).collect();
    let clinic_codes: Vec<RotationCode> = catalogue::clinic_indices().into_iter().map(catalogue::code_at).collect();
    let floor_night_codes: Vec<RotationCode> = catalogue::floor_supergroup_indices().into_iter().map(catalogue::code_at).collect();

    for r in 0..ctx.residents.len() {
        let non_pgy3 = ctx.residents[r].pgy != Pgy::Pgy3;

        if non_pgy3 && weeks >= 3 {
            for w in 1..=weeks - 2 {
                let window: LinearExpr = (w..w + 3).map(|ww| (1i64, vars.indicator_in(model, r, ww, &elective_codes))).collect();
                let burst3 = deficit_var(model, 1, window - 2);
                terms.push((weight::ELECTIVE_BURST_3, LinearExpr::from(burst3)));
            }
        }
        if non_pgy3 && weeks >= 4 {
            for w in 1..=weeks - 3 {
                let window: LinearExpr = (w..w + 4).map(|ww| (1i64, vars.indicator_in(model, r, ww, &elective_codes))).collect();
                let burst4 = deficit_var(model, 1, window - 3);
                terms.push((weight::ELECTIVE_BURST_4, LinearExpr::from(burst4)));
            }
        }
        if non_pgy3 && weeks >= 3 {
            for w in 1..=weeks - 2 {
                let window: LinearExpr = (w..w + 3).map(|ww| (1i64, vars.indicator_in(model, r, ww, &clinic_codes))).collect();
                let burst = deficit_var(model, 1, window - 2);
                terms.push((weight::CLINIC_BURST_3, LinearExpr::from(burst)));
            }
        }
        if weeks >= 6 {
            for w in 1..=weeks - 5 {
                let window: LinearExpr = (w..w + 6).map(|ww| (1i64, vars.indicator_in(model, r, ww, &floor_night_codes))).collect();
                let stagger = deficit_var(model, 1, window - 5);
                terms.push((weight::GLOBAL_STAGGER_6, LinearExpr::from(stagger)));
            }
        }
    }
}

/// PGY3 holiday-week leniency: working both holiday weeks is penalised, but
/// less so the more core-rotation weeks (experience) that resident has
/// already banked this year.
fn pgy3_holiday(model: &mut CpModelBuilder, vars: &mut Variables, ctx: &SolveContext, terms: &mut Vec<(i64, LinearExpr)>) {
    let weeks = vars.weeks();
    let mut holiday: Vec<u32> = ctx.config.holiday_weeks.iter().copied().collect();
    holiday.sort_unstable();
    if holiday.len() != 2 {
        return;
    }
    let core_codes: Vec<RotationCode> = [Category::Cardio, Category::Neuro, Category::Geriatrics, Category::Id, Category::Ed]
        .into_iter()
        .flat_map(catalogue::indices_in_category)
        .map(catalogue::code_at)
        .collect();

    for r in 0..ctx.residents.len() {
        if ctx.residents[r].pgy != Pgy::Pgy3 {
            continue;
        }
        let off: LinearExpr = holiday
            .iter()
            .flat_map(|&w| [RotationCode::Vacation, RotationCode::IcuH].map(|c| (1i64, vars.var(r, w, c))))
            .collect();
        // `worked` = number of the two holiday weeks actually worked (0..2).
        let worked = deficit_var(model, 2, LinearExpr::from(2i64) - off);
        let core_weeks: LinearExpr = (1..=weeks).map(|wk| (1i64, vars.indicator_in(model, r, wk, &core_codes))).collect();
        // Linear in `worked` so a resident who works neither holiday week pays
        // nothing; experience credit tapers the per-week rate down from the base.
        let raw = LinearExpr::from(worked) * weight::PGY3_HOLIDAY_BASE - core_weeks * weight::PGY3_HOLIDAY_PER_CORE_WEEK;
        let penalty = deficit_var(model, weight::PGY3_HOLIDAY_BASE * 2, raw);
        terms.push((1, LinearExpr::from(penalty)));
    }
}

/// Late core-elective placement penalty for PGY3s (front-loading preference).
fn pgy3_front_loading(model: &mut CpModelBuilder, vars: &mut Variables, ctx: &SolveContext, terms: &mut Vec<(i64, LinearExpr)>) {
    let weeks = vars.weeks();
    let core_codes: Vec<RotationCode> = [Category::Cardio, Category::Neuro, Category::Geriatrics, Category::Id]
        .into_iter()
        .flat_map(catalogue::indices_in_category)
        .map(catalogue::code_at)
        .collect();
    for r in 0..ctx.residents.len() {
        if ctx.residents[r].pgy != Pgy::Pgy3 {
            continue;
        }
        for w in 31..=weeks {
            let ind = vars.indicator_in(model, r, w, &core_codes);
            terms.push((weight::PGY3_FRONT_LOAD_LATE_WEEK, LinearExpr::from(ind)));
        }
    }
}

/// Rewards honouring a resident's higher-priority vacation option: each
/// `(weight, chosen)` pair comes from `model::hard::vacation`'s block-option
/// selector booleans, weighted `6 - priority` and entered with a negative
/// coefficient so the objective favours whichever option gets chosen.
fn vacation_priority(terms: &mut Vec<(i64, LinearExpr)>, vacation_choices: &[(i64, cp_sat::builder::BoolVar)]) {
    for (weight, choice) in vacation_choices {
        terms.push((-3 * weight, LinearExpr::from(choice.clone())));
    }
}

/// Number of consecutive-week transitions (`A[r,w] != A[r,w+1]`), penalised
/// at the lowest tier so it only breaks ties among otherwise-equal
/// schedules, favouring multi-week blocks over one-week flickers.
fn transitions(model: &mut CpModelBuilder, vars: &mut Variables, ctx: &SolveContext, terms: &mut Vec<(i64, LinearExpr)>) {
    let weeks = vars.weeks();
    let num_codes = catalogue::all().len();
    for r in 0..ctx.residents.len() {
        for w in 1..weeks {
            // `same_code[code]` = 1 iff resident r holds `code` in both w and
            // w+1; at most one code can do so since assignment is one-hot, so
            // their sum is exactly the "unchanged" indicator for the pair.
            let same: LinearExpr = (0..num_codes)
                .map(|code_idx| {
                    let code = catalogue::code_at(code_idx);
                    let a = vars.var(r, w, code);
                    let b = vars.var(r, w + 1, code);
                    let both = model.new_bool_var();
                    model.add_le(LinearExpr::from(both.clone()), LinearExpr::from(a.clone()));
                    model.add_le(LinearExpr::from(both.clone()), LinearExpr::from(b.clone()));
                    let lower: LinearExpr = [(1i64, a), (1i64, b)].into_iter().collect();
                    model.add_le(lower - LinearExpr::from(both.clone()), 1);
                    (1i64, both)
                })
                .collect();
            let differs = deficit_var(model, 1, LinearExpr::from(1i64) - same);
            terms.push((1, LinearExpr::from(differs)));
        }
    }
}

/// Builds the full weighted objective expression.
pub fn objective(
    model: &mut CpModelBuilder,
    vars: &mut Variables,
    ctx: &SolveContext,
    vacation_choices: &[(i64, cp_sat::builder::BoolVar)],
) -> LinearExpr {
    let mut terms: Vec<(i64, LinearExpr)> = Vec::new();

    requirement_terms(model, vars, ctx, &mut terms);
    ty_soft_requirements(model, vars, ctx, &mut terms);
    graduation_minima(model, vars, ctx, &mut terms);
    team_g(model, vars, ctx, &mut terms);
    senior_coverage(model, vars, ctx, &mut terms);
    bursts(model, vars, ctx, &mut terms);
    pgy3_holiday(model, vars, ctx, &mut terms);
    pgy3_front_loading(model, vars, ctx, &mut terms);
    vacation_priority(&mut terms, vacation_choices);
    transitions(model, vars, ctx, &mut terms);

    terms.into_iter().fold(LinearExpr::from(0), |acc, (weight, expr)| acc + expr * weight)
}
