//! Status lifecycle for essays under correction.
//!
//! The transition graph is a straight line, `PENDING -> GRADING -> GRADED ->
//! SENT`, plus idempotent self-transitions for every state. `SENT` has no
//! outgoing edges, which is what allows resending a corrected essay (a
//! `SENT -> SENT` no-op) while forbidding everything else.

use super::domain::{Essay, EssayStatus};

/// Pure transition predicate. Self-transitions are always allowed.
pub fn can_transition(from: EssayStatus, to: EssayStatus) -> bool {
    if from == to {
        return true;
    }

    matches!(
        (from, to),
        (EssayStatus::Pending, EssayStatus::Grading)
            | (EssayStatus::Grading, EssayStatus::Graded)
            | (EssayStatus::Graded, EssayStatus::Sent)
    )
}

/// Apply a transition or fail with [`StatusError::InvalidTransition`]. The
/// self-transition no-op still succeeds. Only the in-memory record is
/// mutated; persisting the essay afterwards is the caller's job.
pub fn assert_transition(essay: &mut Essay, to: EssayStatus) -> Result<(), StatusError> {
    if !can_transition(essay.status, to) {
        return Err(StatusError::InvalidTransition {
            from: essay.status.label().to_string(),
            to: to.label().to_string(),
        });
    }

    essay.status = to;
    Ok(())
}

/// Resolve a caller-supplied target status string. Absent or empty input is
/// a missing argument; an unrecognized label is never in the transition
/// table, so it is reported as an invalid transition from the current state.
pub fn resolve_target(
    current: EssayStatus,
    raw: Option<&str>,
) -> Result<EssayStatus, StatusError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(StatusError::MissingArgument("status"))?;

    EssayStatus::parse(raw).ok_or_else(|| StatusError::InvalidTransition {
        from: current.label().to_string(),
        to: raw.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
