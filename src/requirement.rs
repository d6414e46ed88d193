//! Requirement and completion data — per-PGY/track minima and prior-year credit.

use crate::catalogue::Category;
use crate::Id;

/// Whether a requirement resets every year or accumulates to graduation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequirementKind {
    /// Reset each year: FLOORS, ICU, CLINIC, VACATION.
    Annual,
    /// Carried across years toward a graduation minimum: CARDIO, NEURO, ID, ED, GERIATRICS.
    CumulativeToGraduation,
}

impl Category {
    /// Classifies a category as annual or cumulative-to-graduation, per spec §3.
    pub fn requirement_kind(self) -> RequirementKind {
        match self {
            Category::Floors | Category::Icu | Category::Clinic | Category::Vacation => {
                RequirementKind::Annual
            }
            _ => RequirementKind::CumulativeToGraduation,
        }
    }
}

/// The minimum weeks of `category` a resident of a given PGY (and, optionally,
/// track) must accumulate in one year.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Requirement {
    pub category: Category,
    pub required_weeks: u32,
}

/// Historical credit toward cumulative requirements from prior years.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Completion {
    pub resident_id: Id,
    pub category: Category,
    pub weeks_done: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floors_is_annual() {
        assert_eq!(Category::Floors.requirement_kind(), RequirementKind::Annual);
    }

    #[test]
    fn cardio_is_cumulative() {
        assert_eq!(
            Category::Cardio.requirement_kind(),
            RequirementKind::CumulativeToGraduation
        );
    }
}
