//! Decision variables (spec §4.3.1): one rotation-code selector per
//! resident-week, materialised as a one-hot boolean vector, plus a memoized
//! cache of derived "resident is in code-set S during week w" indicators —
//! this mirrors the original engine's `_indicator`/`_indicator_in` helpers.

use std::collections::HashMap;

use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};

use crate::catalogue::{self, RotationCode};
use crate::context::SolveContext;

pub struct Variables {
    /// `assign[resident][week - 1][code_index]`.
    pub assign: Vec<Vec<Vec<BoolVar>>>,
    indicator_cache: HashMap<(usize, u32, Vec<usize>), BoolVar>,
}

impl Variables {
    pub fn build(model: &mut CpModelBuilder, ctx: &SolveContext) -> Self {
        let num_codes = catalogue::all().len();
        let weeks = ctx.week_count as usize;

        let mut assign = Vec::with_capacity(ctx.residents.len());
        for _r in 0..ctx.residents.len() {
            let mut per_week = Vec::with_capacity(weeks);
            for _w in 0..weeks {
                let per_code: Vec<BoolVar> = (0..num_codes).map(|_| model.new_bool_var()).collect();
                let sum: LinearExpr = per_code.iter().map(|v| (1i64, v.clone())).collect();
                model.add_eq(sum, 1);
                per_week.push(per_code);
            }
            assign.push(per_week);
        }

        Self {
            assign,
            indicator_cache: HashMap::new(),
        }
    }

    pub fn weeks(&self) -> u32 {
        self.assign.first().map(|w| w.len() as u32).unwrap_or(0)
    }

    /// The raw one-hot boolean for `resident` being assigned `code` in `week`.
    pub fn var(&self, resident: usize, week: u32, code: RotationCode) -> BoolVar {
        self.assign[resident][week as usize - 1][catalogue::index_of(code)].clone()
    }

    /// A boolean equal to 1 iff `resident` is assigned, during `week`, to any
    /// code among `codes`. For a singleton set this is the raw one-hot
    /// variable; for larger sets a memoized derived boolean is introduced,
    /// tied to the sum of the underlying one-hots (at most one of which can
    /// be true, since assignment is one-hot per resident-week).
    pub fn indicator_in(&mut self, model: &mut CpModelBuilder, resident: usize, week: u32, codes: &[RotationCode]) -> BoolVar {
        let mut idxs: Vec<usize> = codes.iter().map(|c| catalogue::index_of(*c)).collect();
        idxs.sort_unstable();
        idxs.dedup();
        if idxs.len() == 1 {
            return self.assign[resident][week as usize - 1][idxs[0]].clone();
        }

        let key = (resident, week, idxs.clone());
        if let Some(v) = self.indicator_cache.get(&key) {
            return v.clone();
        }

        let ind = model.new_bool_var();
        let sum: LinearExpr = idxs
            .iter()
            .map(|&i| (1i64, self.assign[resident][week as usize - 1][i].clone()))
            .collect();
        model.add_eq(LinearExpr::from(ind.clone()), sum);
        self.indicator_cache.insert(key, ind.clone());
        ind
    }

    /// Convenience over [`Self::indicator_in`] for an entire category, reading
    /// its member codes from the catalogue.
    pub fn indicator_in_category(
        &mut self,
        model: &mut CpModelBuilder,
        resident: usize,
        week: u32,
        category: catalogue::Category,
    ) -> BoolVar {
        let codes: Vec<RotationCode> = catalogue::indices_in_category(category)
            .into_iter()
            .map(catalogue::code_at)
            .collect();
        self.indicator_in(model, resident, week, &codes)
    }
}
