//! Context-build errors (spec §7 class 1): malformed roster input.

use thiserror::Error;

use crate::Id;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("cohort {cohort_id} has an odd intern count ({count}); interns must pair up")]
    OddCohortInternCount { cohort_id: Id, count: usize },

    #[error("cohort {cohort_id} has {size} residents, exceeding the cap of {max}")]
    CohortOversized {
        cohort_id: Id,
        size: usize,
        max: usize,
    },

    #[error("resident {resident_id} references unknown cohort {cohort_id}")]
    UnknownCohortReference { resident_id: Id, cohort_id: Id },

    #[error("resident {resident_id} (PGY {pgy_label}, track {track:?}) matches no requirement row")]
    MissingRequirements {
        resident_id: Id,
        pgy_label: String,
        track: Option<String>,
    },

    #[error("duplicate resident id: {0}")]
    DuplicateResidentId(Id),
}
