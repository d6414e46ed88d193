//! The engine's output type: a resident/week grid of rotation codes.

use std::collections::HashMap;

use crate::catalogue::RotationCode;
use crate::Id;

/// A complete assignment of every resident to a rotation code for every week
/// of the scheduling year.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    /// `grid[resident_id][week] == code`, `week` 1-based.
    grid: HashMap<Id, HashMap<u32, RotationCode>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self { grid: HashMap::new() }
    }

    pub fn set(&mut self, resident_id: Id, week: u32, code: RotationCode) {
        self.grid.entry(resident_id).or_default().insert(week, code);
    }

    pub fn get(&self, resident_id: &str, week: u32) -> Option<RotationCode> {
        self.grid.get(resident_id).and_then(|weeks| weeks.get(&week)).copied()
    }

    /// All weeks assigned to `resident_id`, in week order.
    pub fn weeks_for(&self, resident_id: &str) -> Vec<(u32, RotationCode)> {
        let mut weeks: Vec<_> = self.grid.get(resident_id).map(|m| m.iter().map(|(&w, &c)| (w, c)).collect()).unwrap_or_default();
        weeks.sort_by_key(|(w, _)| *w);
        weeks
    }

    pub fn resident_ids(&self) -> impl Iterator<Item = &Id> {
        self.grid.keys()
    }

    pub fn count_weeks_in(&self, resident_id: &str, codes: &[RotationCode]) -> u32 {
        self.grid
            .get(resident_id)
            .map(|weeks| weeks.values().filter(|c| codes.contains(c)).count() as u32)
            .unwrap_or(0)
    }
}

impl Default for Assignment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut a = Assignment::new();
        a.set("r1".into(), 3, RotationCode::Vacation);
        assert_eq!(a.get("r1", 3), Some(RotationCode::Vacation));
        assert_eq!(a.get("r1", 4), None);
    }

    #[test]
    fn count_weeks_in_matches_inserted_codes() {
        let mut a = Assignment::new();
        a.set("r1".into(), 1, RotationCode::Nf);
        a.set("r1".into(), 2, RotationCode::IcuN);
        a.set("r1".into(), 3, RotationCode::A);
        assert_eq!(a.count_weeks_in("r1", &[RotationCode::Nf, RotationCode::IcuN]), 2);
    }
}
