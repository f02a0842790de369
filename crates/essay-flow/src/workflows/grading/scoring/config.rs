use serde::{Deserialize, Serialize};

/// Normalization knobs for the scoring engine. The scale is the ceiling of
/// the bimester contribution (ENEM's 0-1000 raw range maps onto it, PAS raw
/// scores clamp to it); the reason cap bounds stored annulment reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub bimester_scale: f64,
    pub max_annulment_reasons: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            bimester_scale: 10.0,
            max_annulment_reasons: 5,
        }
    }
}
