use super::ScoringError;
use crate::workflows::grading::domain::{AnnotationSet, PasScore};

/// Resolve the effective error count: an explicit NE wins, otherwise grammar
/// highlights from the annotation store are counted, defaulting to zero when
/// no set exists.
pub(crate) fn resolve_error_count(
    provided: Option<f64>,
    annotations: Option<&AnnotationSet>,
) -> f64 {
    match provided {
        Some(ne) => ne,
        None => annotations
            .map(|set| set.grammar_errors() as f64)
            .unwrap_or(0.0),
    }
}

/// `raw = max(0, NC - 2*NE/NL)`. The raw score is floored at zero but not
/// capped here; only the bimester normalization applies the ceiling clamp.
pub(crate) fn score(nc: f64, ne: f64, nl: f64) -> Result<PasScore, ScoringError> {
    if !nc.is_finite() || nc < 0.0 {
        return Err(ScoringError::InvalidScoreValue {
            field: "NC",
            value: nc.to_string(),
        });
    }
    if !ne.is_finite() || ne < 0.0 {
        return Err(ScoringError::InvalidScoreValue {
            field: "NE",
            value: ne.to_string(),
        });
    }
    if !nl.is_finite() || nl <= 0.0 {
        return Err(ScoringError::InvalidScoreValue {
            field: "NL",
            value: nl.to_string(),
        });
    }

    let raw_score = (nc - 2.0 * ne / nl).max(0.0);
    Ok(PasScore {
        nc,
        ne,
        nl,
        raw_score,
    })
}
