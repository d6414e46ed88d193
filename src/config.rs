//! Global solver tunables (spec §3 `SolverConfig`).

use std::collections::HashSet;

/// Global, caller-supplied tunables for a solve. The engine reads no files
/// and no environment variables; a caller deserialises this (e.g. via the
/// `serde` feature) from whatever configuration source it uses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    pub max_nights_per_year: u32,
    /// Hard cap on consecutive night weeks (H9).
    pub max_consecutive_nights: u32,
    pub ed_cap_per_week: u32,
    /// Ramirez rule: PGY1s may not be on CARDIO before this week, unless overridden per-resident.
    pub no_cardio_before_week: u32,
    pub july_weeks: HashSet<u32>,
    pub vacation_weeks_per_resident: u32,
    pub clinic_min_per_week: u32,
    pub clinic_max_per_week: u32,
    pub holiday_weeks: HashSet<u32>,
    pub min_interblock_gap_weeks: u32,
    /// Cumulative (prior-year carried NF + ICU_NIGHT) + this-year cap.
    pub max_nights_cumulative: u32,
    /// Demotes H1 (vacation block shape/placement) from hard to heavily
    /// penalised soft. Operator-only escape hatch; never the default path.
    pub relax_vacation_blocks: bool,
    /// Demotes the senior geriatrics/neuro weekly-coverage term from hard to soft.
    pub relax_geriatrics_coverage: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_nights_per_year: 8,
            max_consecutive_nights: 2,
            ed_cap_per_week: 3,
            no_cardio_before_week: 7,
            july_weeks: [1, 2, 3, 4].into_iter().collect(),
            vacation_weeks_per_resident: 4,
            clinic_min_per_week: 11,
            clinic_max_per_week: 12,
            holiday_weeks: [26, 27].into_iter().collect(),
            min_interblock_gap_weeks: 12,
            max_nights_cumulative: 16,
            relax_vacation_blocks: false,
            relax_geriatrics_coverage: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = SolverConfig::default();
        assert_eq!(c.max_nights_per_year, 8);
        assert_eq!(c.max_consecutive_nights, 2);
        assert_eq!(c.ed_cap_per_week, 3);
        assert_eq!(c.no_cardio_before_week, 7);
        assert!(c.july_weeks.contains(&1) && c.july_weeks.contains(&4));
        assert_eq!(c.vacation_weeks_per_resident, 4);
        assert_eq!(c.clinic_min_per_week, 11);
        assert_eq!(c.clinic_max_per_week, 12);
        assert!(c.holiday_weeks.contains(&26) && c.holiday_weeks.contains(&27));
        assert_eq!(c.min_interblock_gap_weeks, 12);
        assert!(!c.relax_vacation_blocks);
        assert!(!c.relax_geriatrics_coverage);
    }
}
