//! Vacation request modelling — two blocks, each with up to two start-week options.

use crate::Id;

/// Weeks whose start would overlap a holiday week (26 or 27) once the
/// 2-week block is laid down; filtered out by the context builder (H2).
pub const INVALID_BLOCK_STARTS: [u32; 3] = [25, 26, 27];

/// One candidate placement for a vacation block: a start week and a priority
/// (1 = highest, used by the vacation-priority soft term).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockOption {
    pub start_week: u32,
    pub priority: u32,
}

/// A resident's preferred vacation placement: two blocks (A, B), each with
/// up to two candidate start weeks, plus an optional legacy hard-lock window.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VacationRequest {
    pub resident_id: Id,
    pub block_a_options: Vec<BlockOption>,
    pub block_b_options: Vec<BlockOption>,
    /// Legacy pinned weeks (each a 2-week-aligned start); when present this
    /// request's blocks are forced rather than chosen from the options.
    pub hard_lock: Option<Vec<u32>>,
}

impl VacationRequest {
    /// Returns `block_a_options`/`block_b_options` filtered to exclude starts
    /// that would overlap a holiday week, per H2.
    pub fn valid_block_options(options: &[BlockOption]) -> Vec<BlockOption> {
        options
            .iter()
            .copied()
            .filter(|o| !INVALID_BLOCK_STARTS.contains(&o.start_week))
            .collect()
    }
}
