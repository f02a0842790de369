mod config;
mod enem;
mod pas;

pub use config::ScoringConfig;

use crate::workflows::grading::domain::{
    AnnotationSet, Annulment, Essay, GradingPayload, ScoreSheet,
};
use tracing::debug;

/// Stateless evaluator turning rubric inputs into raw and bimester scores.
/// It never touches storage; the caller supplies the annotation set when a
/// PAS payload leaves the error count to be auto-counted.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Validate the payload and rewrite the essay's score sub-structure and
    /// annulment flag. All-or-nothing: a validation failure leaves the essay
    /// untouched. Each call recomputes from scratch; grading is not
    /// incremental.
    pub fn apply_scoring(
        &self,
        essay: &mut Essay,
        payload: &GradingPayload,
        annotations: Option<&AnnotationSet>,
    ) -> Result<(), ScoringError> {
        let sheet = match payload {
            GradingPayload::Enem {
                c1,
                c2,
                c3,
                c4,
                c5,
                ..
            } => ScoreSheet::Enem(enem::score([*c1, *c2, *c3, *c4, *c5])?),
            GradingPayload::Pas { nc, ne, nl, .. } => {
                let ne = pas::resolve_error_count(*ne, annotations);
                ScoreSheet::Pas(pas::score(*nc, ne, *nl)?)
            }
        };

        if let Some(requested) = payload.annulment() {
            essay.annulment = self.clamp_reasons(requested.clone());
        }

        // Override ordering is deliberate: the would-be score is computed
        // first so a zeroed sheet still reflects the grader's inputs.
        let sheet = if essay.annulment.active {
            match sheet {
                ScoreSheet::Enem(mut enem) => {
                    debug!(would_be = enem.raw_score, "annulment zeroes ENEM raw score");
                    enem.raw_score = 0;
                    ScoreSheet::Enem(enem)
                }
                ScoreSheet::Pas(mut pas) => {
                    debug!(would_be = pas.raw_score, "annulment zeroes PAS raw score");
                    pas.raw_score = 0.0;
                    ScoreSheet::Pas(pas)
                }
            }
        } else {
            sheet
        };

        essay.score = Some(sheet);
        Ok(())
    }

    /// Derive the normalized bimester contribution. Pure and idempotent;
    /// essays excluded from the bimester end up with no value at all rather
    /// than zero.
    pub fn compute_bimester_score(&self, essay: &mut Essay) {
        if !essay.count_in_bimester {
            essay.bimester_score = None;
            return;
        }

        if essay.annulment.active {
            essay.bimester_score = Some(0.0);
            return;
        }

        let scale = self.config.bimester_scale;
        essay.bimester_score = match &essay.score {
            Some(ScoreSheet::Enem(enem)) => {
                Some(round2(f64::from(enem.raw_score) / 1000.0 * scale))
            }
            Some(ScoreSheet::Pas(pas)) => Some(round2(pas.raw_score.clamp(0.0, scale))),
            None => None,
        };
    }

    fn clamp_reasons(&self, mut annulment: Annulment) -> Annulment {
        annulment.reasons.truncate(self.config.max_annulment_reasons);
        annulment
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The single error the engine raises: a rubric input outside its domain.
/// Surfaced directly to the requester, never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("invalid value for {field}: {value}")]
    InvalidScoreValue { field: &'static str, value: String },
}
