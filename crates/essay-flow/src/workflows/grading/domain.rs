use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for essay records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EssayId(pub String);

/// The two rubric systems the platform grades against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RubricSystem {
    #[serde(rename = "ENEM")]
    Enem,
    #[serde(rename = "PAS")]
    Pas,
}

impl RubricSystem {
    pub const fn label(self) -> &'static str {
        match self {
            RubricSystem::Enem => "ENEM",
            RubricSystem::Pas => "PAS",
        }
    }
}

/// Lifecycle stage of an essay under correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EssayStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "GRADING")]
    Grading,
    #[serde(rename = "GRADED")]
    Graded,
    #[serde(rename = "SENT")]
    Sent,
}

impl EssayStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EssayStatus::Pending => "PENDING",
            EssayStatus::Grading => "GRADING",
            EssayStatus::Graded => "GRADED",
            EssayStatus::Sent => "SENT",
        }
    }

    /// Parse a status label; unrecognized strings yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        [Self::Pending, Self::Grading, Self::Graded, Self::Sent]
            .into_iter()
            .find(|status| raw.eq_ignore_ascii_case(status.label()))
    }
}

/// Administrative override zeroing an essay's score regardless of rubric
/// inputs, with the recorded reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annulment {
    pub active: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
}

/// ENEM competency bands and their 0-1000 sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemScore {
    pub c1: u16,
    pub c2: u16,
    pub c3: u16,
    pub c4: u16,
    pub c5: u16,
    pub raw_score: u16,
}

/// PAS/UnB rubric inputs and the derived raw score. NC, NE, and NL are kept
/// alongside the result for audit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PasScore {
    pub nc: f64,
    pub ne: f64,
    pub nl: f64,
    pub raw_score: f64,
}

/// The score sub-structure of an essay, keyed on the rubric system so the
/// two variants stay mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "system")]
pub enum ScoreSheet {
    #[serde(rename = "ENEM")]
    Enem(EnemScore),
    #[serde(rename = "PAS")]
    Pas(PasScore),
}

/// Essay record as the grading core sees it. Created externally by the
/// upload flow in `PENDING`; scoring and status transitions mutate it here,
/// persistence happens through [`super::repository::EssayRepository`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Essay {
    pub essay_id: EssayId,
    pub student_name: String,
    pub student_email: String,
    pub theme: String,
    pub system: RubricSystem,
    pub status: EssayStatus,
    pub bimester: u8,
    pub count_in_bimester: bool,
    #[serde(default)]
    pub annulment: Annulment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreSheet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bimester_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general_comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_last_sent_at: Option<DateTime<Utc>>,
}

impl Essay {
    /// One-line human rendering of the grading state, used by status views
    /// and the delivery subject line.
    pub fn grade_summary(&self) -> String {
        if self.annulment.active {
            return if self.annulment.reasons.is_empty() {
                "annulled".to_string()
            } else {
                format!("annulled: {}", self.annulment.reasons.join("; "))
            };
        }

        match &self.score {
            None => "awaiting grading".to_string(),
            Some(ScoreSheet::Enem(enem)) => match self.bimester_score {
                Some(bimester) => format!(
                    "ENEM raw score {} (bimester {:.2})",
                    enem.raw_score, bimester
                ),
                None => format!("ENEM raw score {}", enem.raw_score),
            },
            Some(ScoreSheet::Pas(pas)) => match self.bimester_score {
                Some(bimester) => format!(
                    "PAS raw score {:.2} (bimester {:.2})",
                    pas.raw_score, bimester
                ),
                None => format!("PAS raw score {:.2}", pas.raw_score),
            },
        }
    }

    pub fn status_view(&self) -> EssayStatusView {
        EssayStatusView {
            essay_id: self.essay_id.clone(),
            status: self.status.label(),
            grade_summary: self.grade_summary(),
            bimester_score: self.bimester_score,
        }
    }
}

/// Creation payload handed in by the upload flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssaySubmission {
    pub student_name: String,
    pub student_email: String,
    pub theme: String,
    pub system: RubricSystem,
    pub bimester: u8,
    #[serde(default)]
    pub count_in_bimester: bool,
}

/// Grading request, tagged on the rubric system it carries inputs for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GradingPayload {
    #[serde(rename = "ENEM")]
    Enem {
        c1: u16,
        c2: u16,
        c3: u16,
        c4: u16,
        c5: u16,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        annulment: Option<Annulment>,
    },
    #[serde(rename = "PAS")]
    Pas {
        #[serde(rename = "NC")]
        nc: f64,
        #[serde(rename = "NE", default, skip_serializing_if = "Option::is_none")]
        ne: Option<f64>,
        #[serde(rename = "NL")]
        nl: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        annulment: Option<Annulment>,
    },
}

impl GradingPayload {
    pub const fn system(&self) -> RubricSystem {
        match self {
            GradingPayload::Enem { .. } => RubricSystem::Enem,
            GradingPayload::Pas { .. } => RubricSystem::Pas,
        }
    }

    pub fn annulment(&self) -> Option<&Annulment> {
        match self {
            GradingPayload::Enem { annulment, .. } | GradingPayload::Pas { annulment, .. } => {
                annulment.as_ref()
            }
        }
    }

    /// Whether grading this payload needs the annotation store (PAS with the
    /// error count left for auto-counting).
    pub const fn wants_annotations(&self) -> bool {
        matches!(self, GradingPayload::Pas { ne: None, .. })
    }
}

/// Highlight categories used by the correction tooling; only `Grammar`
/// participates in the PAS error auto-count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightCategory {
    Grammar,
    Argumentation,
    Cohesion,
    General,
}

/// A single marked region on the corrected PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub page: u32,
    pub category: HighlightCategory,
    #[serde(default)]
    pub comment: String,
}

/// Stored annotations for one essay, as returned by the annotation store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    pub essay_id: EssayId,
    pub highlights: Vec<Highlight>,
}

impl AnnotationSet {
    pub fn grammar_errors(&self) -> usize {
        self.highlights
            .iter()
            .filter(|highlight| highlight.category == HighlightCategory::Grammar)
            .count()
    }
}

/// Sanitized representation of an essay's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct EssayStatusView {
    pub essay_id: EssayId,
    pub status: &'static str,
    pub grade_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bimester_score: Option<f64>,
}
