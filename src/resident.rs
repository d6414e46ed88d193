//! Resident identity and derived classification.

use crate::Id;

/// Post-graduate year level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pgy {
    Pgy1,
    Pgy2,
    Pgy3,
    Ty,
}

/// Track a resident may carry, affecting elective fences (H13).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Track {
    Anesthesia,
    Neurology,
}

/// A per-resident override of a global rule, e.g. a personalised Ramirez
/// threshold (H7).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResidentOverrides {
    /// Overrides `SolverConfig::no_cardio_before_week` for this resident.
    pub no_cardio_before_week: Option<u32>,
}

/// A resident to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resident {
    pub id: Id,
    pub name: String,
    pub pgy: Pgy,
    pub track: Option<Track>,
    pub cohort_id: Option<Id>,
    pub overrides: ResidentOverrides,
    /// True for an incoming resident created by rollover before a name is assigned.
    pub is_placeholder: bool,
    /// Identifier of the resident this one was rolled over from, if any.
    pub prior_resident_id: Option<Id>,
}

impl Resident {
    pub fn new(id: impl Into<Id>, name: impl Into<String>, pgy: Pgy) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pgy,
            track: None,
            cohort_id: None,
            overrides: ResidentOverrides::default(),
            is_placeholder: false,
            prior_resident_id: None,
        }
    }

    /// `PGY ∈ {PGY2, PGY3}`.
    pub fn is_senior(&self) -> bool {
        matches!(self.pgy, Pgy::Pgy2 | Pgy::Pgy3)
    }

    /// `PGY ∈ {PGY1, TY}`.
    pub fn is_intern(&self) -> bool {
        matches!(self.pgy, Pgy::Pgy1 | Pgy::Ty)
    }

    pub fn is_ty(&self) -> bool {
        matches!(self.pgy, Pgy::Ty)
    }

    pub fn is_ty_anesthesia(&self) -> bool {
        self.is_ty() && self.track == Some(Track::Anesthesia)
    }

    pub fn is_ty_neurology(&self) -> bool {
        self.is_ty() && self.track == Some(Track::Neurology)
    }

    /// Requirement-table label: `"TY"` or `"PGY1"`/`"PGY2"`/`"PGY3"`.
    pub fn pgy_label(&self) -> &'static str {
        match self.pgy {
            Pgy::Pgy1 => "PGY1",
            Pgy::Pgy2 => "PGY2",
            Pgy::Pgy3 => "PGY3",
            Pgy::Ty => "TY",
        }
    }

    /// Walks the `prior_resident_id` chain, looking up each ancestor in
    /// `by_id`. Defends against a malformed (cyclic) chain with a visited
    /// set, per the "cyclic references" design note — in practice the chain
    /// is a directed path, never a cycle, but corrupt input must not hang.
    pub fn history_chain<'a>(&'a self, by_id: &'a std::collections::HashMap<Id, Resident>) -> Vec<&'a Resident> {
        let mut chain = Vec::new();
        let mut visited = std::collections::HashSet::new();
        let mut cursor = self.prior_resident_id.as_ref();
        while let Some(id) = cursor {
            if !visited.insert(id.clone()) {
                break;
            }
            match by_id.get(id) {
                Some(prior) => {
                    chain.push(prior);
                    cursor = prior.prior_resident_id.as_ref();
                }
                None => break,
            }
        }
        chain
    }
}
