//! Top-level error taxonomy (spec §7): context error, infeasibility,
//! timeout-with-no-feasible, and post-validation failure.

use thiserror::Error;

use crate::context::ContextError;

/// Everything that can keep a solve from producing assignments, or that
/// should make a caller distrust a solve that did produce them.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Context-build failed before any solving was attempted.
    #[error("context error: {0}")]
    Context(#[from] ContextError),

    /// The search proved no assignment exists.
    #[error("infeasible ({status}); hard-lock vacation windows: {conflicts:?}")]
    Infeasible {
        status: String,
        conflicts: Vec<String>,
    },

    /// The search budget elapsed before any feasible solution was found.
    /// Treated identically to infeasibility by the caller (spec §7.3).
    #[error("timeout with no feasible solution; hard-lock vacation windows: {conflicts:?}")]
    Timeout { conflicts: Vec<String> },

    /// A successful solve that the independent validator flagged — a bug in
    /// the model, reported loudly rather than silently accepted.
    #[error("post-validation failure: {violations:?}")]
    PostValidationFailure { violations: Vec<String> },
}

impl EngineError {
    /// The hard-lock vacation windows accompanying this failure, if any —
    /// spec §7 requires these on every user-visible failure.
    pub fn conflicts(&self) -> &[String] {
        match self {
            EngineError::Infeasible { conflicts, .. } | EngineError::Timeout { conflicts } => conflicts,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_display_includes_status_and_conflicts() {
        let e = EngineError::Infeasible {
            status: "INFEASIBLE".into(),
            conflicts: vec!["Hard lock: r1 weeks 10-11".into()],
        };
        let s = e.to_string();
        assert!(s.contains("INFEASIBLE"));
        assert!(s.contains("r1 weeks 10-11"));
    }

    #[test]
    fn conflicts_accessor_empty_for_non_conflict_variants() {
        let e = EngineError::PostValidationFailure { violations: vec!["x".into()] };
        assert!(e.conflicts().is_empty());
    }
}
