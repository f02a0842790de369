use super::ScoringError;
use crate::workflows::grading::domain::EnemScore;

/// ENEM competencies are scored in six discrete bands of 40 points.
const BAND_STEP: u16 = 40;
const BAND_CEILING: u16 = 200;

const COMPETENCY_NAMES: [&str; 5] = ["c1", "c2", "c3", "c4", "c5"];

pub(crate) fn score(competencies: [u16; 5]) -> Result<EnemScore, ScoringError> {
    for (name, value) in COMPETENCY_NAMES.into_iter().zip(competencies) {
        if value > BAND_CEILING || value % BAND_STEP != 0 {
            return Err(ScoringError::InvalidScoreValue {
                field: name,
                value: value.to_string(),
            });
        }
    }

    let [c1, c2, c3, c4, c5] = competencies;
    Ok(EnemScore {
        c1,
        c2,
        c3,
        c4,
        c5,
        raw_score: c1 + c2 + c3 + c4 + c5,
    })
}
